//! KeyIndex: ordered mapping from key to the entry ids carrying it.
//!
//! Keys are kept in ascending `Ord` order; each key maps to the ids of its
//! entries oldest-first. A key is present iff its id deque is non-empty,
//! so key traversal never observes a key without live entries.

use std::collections::btree_map;
use std::collections::{BTreeMap, VecDeque};

use crate::entry_list::EntryId;

#[derive(Debug)]
pub(crate) struct KeyIndex<K> {
    map: BTreeMap<K, VecDeque<EntryId>>,
}

impl<K: Ord> KeyIndex<K> {
    pub(crate) fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Number of distinct keys present.
    pub(crate) fn distinct_len(&self) -> usize {
        self.map.len()
    }

    /// Number of entries carrying `key`; 0 when absent. O(log n).
    pub(crate) fn count(&self, key: &K) -> usize {
        self.map.get(key).map_or(0, VecDeque::len)
    }

    /// Record a new occurrence of `key` at the back of its deque,
    /// creating the key's slot when absent. O(log n).
    pub(crate) fn push_back(&mut self, key: K, id: EntryId) {
        self.map.entry(key).or_default().push_back(id);
    }

    /// Oldest entry id carrying `key`. O(log n).
    pub(crate) fn front(&self, key: &K) -> Option<EntryId> {
        self.map.get(key).and_then(|ids| ids.front().copied())
    }

    /// Newest entry id carrying `key`. O(log n).
    pub(crate) fn back(&self, key: &K) -> Option<EntryId> {
        self.map.get(key).and_then(|ids| ids.back().copied())
    }

    /// Remove and return the oldest occurrence of `key`, dropping the
    /// key's slot when it empties. O(log n).
    pub(crate) fn pop_front(&mut self, key: &K) -> Option<EntryId> {
        let ids = self.map.get_mut(key)?;
        let id = ids.pop_front()?;
        if ids.is_empty() {
            self.map.remove(key);
        }
        Some(id)
    }

    /// All occurrences of `key`, oldest-first.
    pub(crate) fn occurrences(&self, key: &K) -> Option<&VecDeque<EntryId>> {
        self.map.get(key)
    }

    /// Distinct keys in ascending order.
    pub(crate) fn keys(&self) -> btree_map::Keys<'_, K, VecDeque<EntryId>> {
        self.map.keys()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }

    /// Sum of per-key occurrence counts. Used by the consistency check.
    #[cfg(test)]
    pub(crate) fn total_occurrences(&self) -> usize {
        self.map.values().map(VecDeque::len).sum()
    }
}
