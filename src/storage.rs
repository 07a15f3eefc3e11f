//! QueueStorage: the shared storage block combining sequence and index.
//!
//! Owns one `EntryList` and one `KeyIndex` and keeps them mutually
//! consistent in every operation: each live entry id appears in exactly
//! one per-key deque, oldest-first, and nowhere else. `Clone` is the
//! materialization step of the copy-on-write protocol: it rebuilds a
//! fresh list in FIFO order and re-derives the index from it, O(n log n).

use std::collections::btree_map;
use std::collections::VecDeque;

use crate::entry_list::{EntryId, EntryList, Iter as ListIter};
use crate::key_index::KeyIndex;

#[derive(Debug)]
pub(crate) struct QueueStorage<K, V> {
    entries: EntryList<K, V>,
    index: KeyIndex<K>,
}

impl<K: Ord + Clone, V: Clone> QueueStorage<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: EntryList::new(),
            index: KeyIndex::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn count(&self, key: &K) -> usize {
        self.index.count(key)
    }

    pub(crate) fn distinct_keys(&self) -> usize {
        self.index.distinct_len()
    }

    /// Append an entry at the back and record it under its key.
    /// The key clone happens before either structure changes.
    pub(crate) fn push(&mut self, key: K, value: V) {
        let indexed_key = key.clone();
        let id = self.entries.push_back(key, value);
        self.index.push_back(indexed_key, id);
    }

    /// Remove the front entry. Index bookkeeping runs first so the key
    /// comparisons happen while both structures are still intact.
    pub(crate) fn pop_front(&mut self) -> Option<()> {
        let id = self.entries.front()?;
        let (key, _) = self.entries.get(id).expect("front id resolves to a live entry");
        let popped = self.index.pop_front(key);
        debug_assert_eq!(popped, Some(id), "front entry must be its key's oldest");
        self.entries.remove(id).expect("front id resolves to a live entry");
        Some(())
    }

    /// Remove the oldest entry carrying `key`. Returns `None` when absent.
    pub(crate) fn pop_key(&mut self, key: &K) -> Option<()> {
        let id = self.index.pop_front(key)?;
        self.entries
            .remove(id)
            .expect("indexed id resolves to a live entry");
        Some(())
    }

    /// Relink every entry carrying `key` to the back of the sequence,
    /// oldest-first, so their relative order is preserved. Entries keep
    /// their ids and values, which leaves the occurrence deque already
    /// correct: moving all of a key's entries in order is a rotation by
    /// its own length. O(m + log n). Returns `None` when absent.
    pub(crate) fn move_to_back(&mut self, key: &K) -> Option<()> {
        let ids = self.index.occurrences(key)?;
        for &id in ids {
            self.entries
                .move_to_back(id)
                .expect("indexed id resolves to a live entry");
        }
        Some(())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub(crate) fn front(&self) -> Option<(&K, &V)> {
        self.entries.front().and_then(|id| self.entries.get(id))
    }

    pub(crate) fn back(&self) -> Option<(&K, &V)> {
        self.entries.back().and_then(|id| self.entries.get(id))
    }

    pub(crate) fn front_mut(&mut self) -> Option<(&K, &mut V)> {
        let id = self.entries.front()?;
        self.entries.get_mut(id)
    }

    pub(crate) fn back_mut(&mut self) -> Option<(&K, &mut V)> {
        let id = self.entries.back()?;
        self.entries.get_mut(id)
    }

    /// Oldest entry carrying `key`. O(log n).
    pub(crate) fn first(&self, key: &K) -> Option<(&K, &V)> {
        self.index.front(key).and_then(|id| self.entries.get(id))
    }

    /// Newest entry carrying `key`. O(log n).
    pub(crate) fn last(&self, key: &K) -> Option<(&K, &V)> {
        self.index.back(key).and_then(|id| self.entries.get(id))
    }

    pub(crate) fn first_mut(&mut self, key: &K) -> Option<(&K, &mut V)> {
        let id = self.index.front(key)?;
        self.entries.get_mut(id)
    }

    pub(crate) fn last_mut(&mut self, key: &K) -> Option<(&K, &mut V)> {
        let id = self.index.back(key)?;
        self.entries.get_mut(id)
    }

    pub(crate) fn iter(&self) -> ListIter<'_, K, V> {
        self.entries.iter()
    }

    pub(crate) fn keys(&self) -> btree_map::Keys<'_, K, VecDeque<EntryId>> {
        self.index.keys()
    }

    /// Test-only structural audit: the index partitions exactly the set
    /// of live entries, per-key deques are oldest-first, and every deque
    /// entry carries its key.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        use std::collections::HashMap;

        assert_eq!(self.index.total_occurrences(), self.entries.len());

        let positions: HashMap<EntryId, usize> = self
            .iter()
            .enumerate()
            .map(|(pos, (id, _, _))| (id, pos))
            .collect();
        assert_eq!(positions.len(), self.entries.len());

        for key in self.index.keys() {
            let ids = self
                .index
                .occurrences(key)
                .expect("present key has occurrences");
            assert!(!ids.is_empty(), "present key must have at least one entry");
            let mut last_pos = None;
            for &id in ids {
                let (entry_key, _) = self.entries.get(id).expect("indexed id is live");
                assert!(entry_key == key, "deque entry must carry its key");
                let pos = positions[&id];
                assert!(last_pos < Some(pos), "deque must be oldest-first");
                last_pos = Some(pos);
            }
        }
    }
}

// Materialization: rebuild rather than memcpy so the fresh block starts
// compact and its index is derived from the sequence it describes.
impl<K: Ord + Clone, V: Clone> Clone for QueueStorage<K, V> {
    fn clone(&self) -> Self {
        let mut fresh = Self::new();
        for (_, key, value) in self.iter() {
            fresh.push(key.clone(), value.clone());
        }
        fresh
    }
}
