//! EntryList: structural FIFO layer with stable entry ids.
//!
//! A doubly-linked list of (key, value) entries stored in a `SlotMap`.
//! Links are slot keys rather than pointers, so an `EntryId` stays valid
//! across insertions and removals of *other* entries, and a removed id can
//! never alias a later entry (generational keys).

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable, generational reference to one entry in the list.
    pub(crate) struct EntryId;
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

#[derive(Debug)]
pub(crate) struct EntryList<K, V> {
    slots: SlotMap<EntryId, Node<K, V>>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
}

impl<K, V> EntryList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn front(&self) -> Option<EntryId> {
        self.head
    }

    pub(crate) fn back(&self) -> Option<EntryId> {
        self.tail
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<(&K, &V)> {
        self.slots.get(id).map(|n| (&n.key, &n.value))
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<(&K, &mut V)> {
        self.slots.get_mut(id).map(|n| (&n.key, &mut n.value))
    }

    /// Append an entry at the tail and return its id. O(1).
    pub(crate) fn push_back(&mut self, key: K, value: V) -> EntryId {
        let prev_tail = self.tail;
        let id = self.slots.insert(Node {
            key,
            value,
            prev: prev_tail,
            next: None,
        });
        match prev_tail {
            Some(t) => self.slots[t].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Unlink and remove the entry, returning its pair. O(1).
    /// Ids of all other entries remain valid.
    pub(crate) fn remove(&mut self, id: EntryId) -> Option<(K, V)> {
        let node = self.slots.remove(id)?;
        self.splice_out(node.prev, node.next);
        Some((node.key, node.value))
    }

    /// Relink an existing entry at the tail, keeping its slot (and id). O(1).
    pub(crate) fn move_to_back(&mut self, id: EntryId) -> Option<()> {
        if self.tail == Some(id) {
            return self.slots.contains_key(id).then_some(());
        }
        let (prev, next) = {
            let node = self.slots.get(id)?;
            (node.prev, node.next)
        };
        self.splice_out(prev, next);

        let prev_tail = self.tail;
        let node = &mut self.slots[id];
        node.prev = prev_tail;
        node.next = None;
        match prev_tail {
            Some(t) => self.slots[t].next = Some(id),
            // Unreachable in practice: tail was not `id`, so another entry exists.
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        Some(())
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    // Repair neighbor links and head/tail after an entry leaves its position.
    fn splice_out(&mut self, prev: Option<EntryId>, next: Option<EntryId>) {
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Double-ended iterator over entries in FIFO order.
pub(crate) struct Iter<'a, K, V> {
    list: &'a EntryList<K, V>,
    front: Option<EntryId>,
    back: Option<EntryId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (EntryId, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let node = &self.list.slots[id];
        self.front = node.next;
        self.remaining -= 1;
        Some((id, &node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let node = &self.list.slots[id];
        self.back = node.prev;
        self.remaining -= 1;
        Some((id, &node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
