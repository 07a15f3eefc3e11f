//! Error types for queue operations.

use thiserror::Error;

/// Failure conditions reported by [`KvFifo`](crate::KvFifo) operations.
///
/// Every failing operation checks its precondition before touching the
/// queue, its sharing state, or any outstanding borrows, so an `Err`
/// return never has side effects.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The operation requires at least one entry; the queue is empty.
    #[error("queue is empty")]
    EmptyQueue,

    /// The operation requires the given key to be present; it is not.
    #[error("no entry with the given key")]
    NoSuchKey,
}

/// Result type for queue operations.
pub type Result<T> = core::result::Result<T, Error>;
