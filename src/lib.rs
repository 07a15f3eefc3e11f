//! kv-fifo: a single-threaded FIFO queue of key/value pairs with ordered
//! key lookup and copy-on-write sharing between queue values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build KvFifo in safe, verifiable layers so each piece can be
//!   reasoned about independently.
//! - Layers:
//!   - EntryList<K, V>: structural FIFO layer; a doubly-linked list whose
//!     nodes live in a slotmap, so entry ids are stable and generational
//!     (removing one entry never invalidates ids of others).
//!   - KeyIndex<K>: ordered index from key to that key's entry ids,
//!     oldest-first; keys iterate in ascending order.
//!   - QueueStorage<K, V>: the shared storage block pairing the two and
//!     keeping them mutually consistent in every operation; its `Clone`
//!     is the O(n log n) copy-on-write materialization.
//!   - KvFifo<K, V>: public handle; `Rc` to the block plus an
//!     *unshareable* flag implementing the sharing discipline.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by construction (`Rc`, no atomics).
//! - `K: Ord + Clone` (total order for the index, key stored in both
//!   structures), `V: Clone` (materialization copies values).
//! - Cloning a queue is O(1); the first mutation through a sharing handle
//!   pays one O(n log n) materialization.
//! - Failing operations check preconditions before any mutation or
//!   materialization, so an `Err` never has side effects.
//!
//! Why this split?
//! - Localize invariants: the list knows nothing about keys repeating;
//!   the index knows nothing about links; only the block ties them.
//! - Sharing is confined to the handle: the lower layers are plain owned
//!   data and never observe the `Rc` or the unshareable flag.
//! - Key traversal (`keys()`) is a thin view over the index's own
//!   ordering and can never mutate the queue.
//!
//! Sharing discipline
//! - A mutation on a handle whose block is shared first materializes a
//!   private clone; the clone is installed only after the mutation
//!   succeeds, so a panic mid-operation leaves the handle on its old
//!   block.
//! - An accessor returning `&mut V` marks the handle unshareable: its
//!   next clone copies the block eagerly instead of sharing, because the
//!   handle has already handed mutable access to its internals. Any
//!   successful mutating call clears the flag.

mod entry_list;
mod error;
mod key_index;
mod queue;
mod storage;
mod storage_proptest;

// Public surface
pub use error::{Error, Result};
pub use queue::{Iter, Keys, KvFifo};
