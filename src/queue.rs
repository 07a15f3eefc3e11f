//! KvFifo: the public copy-on-write handle over a shared storage block.

use std::collections::btree_map;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

use crate::entry_list::{EntryId, Iter as ListIter};
use crate::error::{Error, Result};
use crate::storage::QueueStorage;

/// A FIFO queue of key/value pairs with ordered key lookup and
/// copy-on-write sharing.
///
/// Keys may repeat. Entries keep their global insertion order; an ordered
/// index additionally resolves each key to its entries oldest-first, so
/// key-addressed lookup and removal run in O(log n).
///
/// Cloning the queue is O(1): clones share one storage block behind an
/// `Rc` until a mutation or a mutable accessor requires private
/// ownership, at which point the mutating handle materializes its own
/// copy (O(n log n)) and the siblings are unaffected. A handle that has
/// returned a mutable borrow into its block is marked *unshareable*:
/// its next clone copies the block eagerly instead of sharing it.
///
/// Single-threaded by construction: the handle is `!Send`/`!Sync`.
///
/// # Examples
///
/// ```
/// use kv_fifo::KvFifo;
///
/// let mut q = KvFifo::new();
/// q.push(1, "a");
/// q.push(2, "b");
/// q.push(1, "c");
///
/// assert_eq!(q.len(), 3);
/// assert_eq!(q.count(&1), 2);
/// assert_eq!(q.front(), Ok((&1, &"a")));
/// assert_eq!(q.last(&1), Ok((&1, &"c")));
///
/// let snapshot = q.clone(); // O(1), shared
/// q.pop()?;                 // materializes q's own copy
/// assert_eq!(q.len(), 2);
/// assert_eq!(snapshot.len(), 3);
/// # Ok::<(), kv_fifo::Error>(())
/// ```
pub struct KvFifo<K, V> {
    data: Rc<QueueStorage<K, V>>,
    unshareable: bool,
}

impl<K: Ord + Clone, V: Clone> KvFifo<K, V> {
    /// Create an empty queue with a privately owned storage block.
    pub fn new() -> Self {
        Self {
            data: Rc::new(QueueStorage::new()),
            unshareable: false,
        }
    }

    /// Total number of entries. O(1).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the queue holds no entries. O(1).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of entries carrying `key`; 0 when absent. O(log n).
    pub fn count(&self, key: &K) -> usize {
        self.data.count(key)
    }

    /// Append `(key, value)` at the back of the queue. O(log n), plus the
    /// cost of materialization when the block is shared.
    pub fn push(&mut self, key: K, value: V) {
        self.with_private(|storage| storage.push(key, value));
    }

    /// Remove the front (oldest) entry. O(log n).
    pub fn pop(&mut self) -> Result<()> {
        if self.data.is_empty() {
            return Err(Error::EmptyQueue);
        }
        self.with_private(|storage| {
            storage.pop_front().expect("emptiness was checked above");
        });
        Ok(())
    }

    /// Remove the oldest entry carrying `key`. O(log n).
    pub fn pop_key(&mut self, key: &K) -> Result<()> {
        if self.data.count(key) == 0 {
            return Err(Error::NoSuchKey);
        }
        self.with_private(|storage| {
            storage.pop_key(key).expect("key presence was checked above");
        });
        Ok(())
    }

    /// Relocate every entry carrying `key` to the back of the queue,
    /// preserving their order among themselves and their values.
    /// O(m + log n) where m is the number of moved entries.
    pub fn move_to_back(&mut self, key: &K) -> Result<()> {
        if self.data.count(key) == 0 {
            return Err(Error::NoSuchKey);
        }
        self.with_private(|storage| {
            storage
                .move_to_back(key)
                .expect("key presence was checked above");
        });
        Ok(())
    }

    /// Remove all entries. O(n). A shared block is abandoned to its other
    /// handles rather than cloned and cleared.
    pub fn clear(&mut self) {
        if Rc::strong_count(&self.data) > 1 && !self.unshareable {
            self.data = Rc::new(QueueStorage::new());
            self.unshareable = false;
        } else {
            self.with_private(QueueStorage::clear);
        }
    }

    /// The front (oldest) entry. O(1).
    pub fn front(&self) -> Result<(&K, &V)> {
        self.data.front().ok_or(Error::EmptyQueue)
    }

    /// The back (newest) entry. O(1).
    pub fn back(&self) -> Result<(&K, &V)> {
        self.data.back().ok_or(Error::EmptyQueue)
    }

    /// The front entry with the value mutable. Marks this handle
    /// unshareable; its next clone copies the block eagerly. O(1) plus
    /// the cost of materialization when the block is shared.
    pub fn front_mut(&mut self) -> Result<(&K, &mut V)> {
        if self.data.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let storage = self.private_storage();
        Ok(storage.front_mut().expect("emptiness was checked above"))
    }

    /// The back entry with the value mutable. Marks this handle
    /// unshareable. O(1) plus materialization when shared.
    pub fn back_mut(&mut self) -> Result<(&K, &mut V)> {
        if self.data.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let storage = self.private_storage();
        Ok(storage.back_mut().expect("emptiness was checked above"))
    }

    /// The oldest entry carrying `key`. O(log n).
    pub fn first(&self, key: &K) -> Result<(&K, &V)> {
        self.data.first(key).ok_or(Error::NoSuchKey)
    }

    /// The newest entry carrying `key`. O(log n).
    pub fn last(&self, key: &K) -> Result<(&K, &V)> {
        self.data.last(key).ok_or(Error::NoSuchKey)
    }

    /// The oldest entry carrying `key`, value mutable. Marks this handle
    /// unshareable. O(log n) plus materialization when shared.
    pub fn first_mut(&mut self, key: &K) -> Result<(&K, &mut V)> {
        if self.data.count(key) == 0 {
            return Err(Error::NoSuchKey);
        }
        let storage = self.private_storage();
        Ok(storage
            .first_mut(key)
            .expect("key presence was checked above"))
    }

    /// The newest entry carrying `key`, value mutable. Marks this handle
    /// unshareable. O(log n) plus materialization when shared.
    pub fn last_mut(&mut self, key: &K) -> Result<(&K, &mut V)> {
        if self.data.count(key) == 0 {
            return Err(Error::NoSuchKey);
        }
        let storage = self.private_storage();
        Ok(storage
            .last_mut(key)
            .expect("key presence was checked above"))
    }

    /// Iterate entries in FIFO order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.data.iter(),
        }
    }

    /// Iterate the distinct keys present, in ascending order. The
    /// iterator borrows this handle, so it cannot outlive a mutating
    /// operation on it; operations on sibling handles sharing the same
    /// block materialize their own copy and leave this one intact.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            inner: self.data.keys(),
        }
    }

    /// Run a mutation against a privately owned block, installing a
    /// freshly materialized clone only after the mutation returns.
    /// A clone of the handle taken afterwards may share again.
    fn with_private<R>(&mut self, op: impl FnOnce(&mut QueueStorage<K, V>) -> R) -> R {
        if Rc::strong_count(&self.data) > 1 && !self.unshareable {
            let mut fresh = Rc::new(QueueStorage::clone(&self.data));
            let result = op(Rc::get_mut(&mut fresh).expect("freshly cloned block has one owner"));
            self.data = fresh;
            self.unshareable = false;
            result
        } else {
            // Unshareable implies sole ownership: a clone taken since the
            // flag was set would have copied the block.
            debug_assert_eq!(Rc::strong_count(&self.data), 1);
            let result = op(Rc::get_mut(&mut self.data).expect("unshared block has one owner"));
            self.unshareable = false;
            result
        }
    }

    /// Materialize if shared, mark unshareable, and expose the block for
    /// a mutable borrow handed back to the caller.
    fn private_storage(&mut self) -> &mut QueueStorage<K, V> {
        if Rc::strong_count(&self.data) > 1 && !self.unshareable {
            self.data = Rc::new(QueueStorage::clone(&self.data));
        }
        self.unshareable = true;
        Rc::get_mut(&mut self.data).expect("block is private after materialization")
    }
}

impl<K: Ord + Clone, V: Clone> Default for KvFifo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for KvFifo<K, V> {
    /// Share the storage block, unless this handle has handed out a
    /// mutable borrow into it since its last mutation; then the new
    /// handle gets an eager copy. Either way the clone starts shareable.
    fn clone(&self) -> Self {
        let data = if self.unshareable {
            Rc::new(QueueStorage::clone(&self.data))
        } else {
            Rc::clone(&self.data)
        };
        Self {
            data,
            unshareable: false,
        }
    }
}

impl<K: Ord + Clone + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for KvFifo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: Ord + Clone, V: Clone + PartialEq> PartialEq for KvFifo<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Ord + Clone, V: Clone + Eq> Eq for KvFifo<K, V> {}

impl<K: Ord + Clone, V: Clone> Extend<(K, V)> for KvFifo<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.with_private(|storage| {
            for (key, value) in iter {
                storage.push(key, value);
            }
        });
    }
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for KvFifo<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<'a, K: Ord + Clone, V: Clone> IntoIterator for &'a KvFifo<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`KvFifo`] in FIFO order.
pub struct Iter<'a, K, V> {
    inner: ListIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Double-ended iterator over the distinct keys of a [`KvFifo`] in
/// ascending order. Read-only: dereferencing yields the key alone.
pub struct Keys<'a, K> {
    inner: btree_map::Keys<'a, K, VecDeque<EntryId>>,
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for Keys<'a, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {}
impl<K> FusedIterator for Keys<'_, K> {}
