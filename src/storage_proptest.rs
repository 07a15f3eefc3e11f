#![cfg(test)]

// Property tests for QueueStorage kept inside the crate so they can call
// the internal consistency audit directly.

use proptest::prelude::*;

use crate::storage::QueueStorage;

#[derive(Clone, Debug)]
enum Op {
    Push(u8, i32),
    PopFront,
    PopKey(u8),
    MoveToBack(u8),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..6, any::<i32>()).prop_map(|(k, v)| Op::Push(k, v)),
        2 => Just(Op::PopFront),
        2 => (0u8..6).prop_map(Op::PopKey),
        2 => (0u8..6).prop_map(Op::MoveToBack),
        1 => Just(Op::Clear),
    ]
}

// Reference model: a plain vector of pairs in FIFO order.
#[derive(Default)]
struct Model {
    entries: Vec<(u8, i32)>,
}

impl Model {
    fn push(&mut self, k: u8, v: i32) {
        self.entries.push((k, v));
    }

    fn pop_front(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.remove(0);
        true
    }

    fn pop_key(&mut self, k: u8) -> bool {
        match self.entries.iter().position(|&(ek, _)| ek == k) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn move_to_back(&mut self, k: u8) -> bool {
        if !self.entries.iter().any(|&(ek, _)| ek == k) {
            return false;
        }
        let (moved, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|&(ek, _)| ek == k);
        self.entries = kept;
        self.entries.extend(moved);
        true
    }

    fn count(&self, k: u8) -> usize {
        self.entries.iter().filter(|&&(ek, _)| ek == k).count()
    }
}

proptest! {
    // After any operation sequence, the storage agrees with the model on
    // sequence order, counts, ends, and per-key extremes, and its two
    // internal structures pass the consistency audit.
    #[test]
    fn prop_storage_matches_fifo_model(ops in proptest::collection::vec(op_strategy(), 1..200)) {
        let mut storage: QueueStorage<u8, i32> = QueueStorage::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Push(k, v) => {
                    storage.push(k, v);
                    model.push(k, v);
                }
                Op::PopFront => {
                    let did = storage.pop_front().is_some();
                    prop_assert_eq!(did, model.pop_front());
                }
                Op::PopKey(k) => {
                    let did = storage.pop_key(&k).is_some();
                    prop_assert_eq!(did, model.pop_key(k));
                }
                Op::MoveToBack(k) => {
                    let did = storage.move_to_back(&k).is_some();
                    prop_assert_eq!(did, model.move_to_back(k));
                }
                Op::Clear => {
                    storage.clear();
                    model.entries.clear();
                }
            }

            storage.assert_consistent();
            prop_assert_eq!(storage.len(), model.entries.len());

            let seq: Vec<(u8, i32)> = storage.iter().map(|(_, k, v)| (*k, *v)).collect();
            prop_assert_eq!(&seq, &model.entries);

            prop_assert_eq!(
                storage.front().map(|(k, v)| (*k, *v)),
                model.entries.first().copied()
            );
            prop_assert_eq!(
                storage.back().map(|(k, v)| (*k, *v)),
                model.entries.last().copied()
            );

            for k in 0u8..6 {
                prop_assert_eq!(storage.count(&k), model.count(k));
                let first = model.entries.iter().find(|&&(ek, _)| ek == k).copied();
                let last = model.entries.iter().rfind(|&&(ek, _)| ek == k).copied();
                prop_assert_eq!(storage.first(&k).map(|(k, v)| (*k, *v)), first);
                prop_assert_eq!(storage.last(&k).map(|(k, v)| (*k, *v)), last);
            }

            // Distinct-key traversal is ascending and matches presence.
            let keys: Vec<u8> = storage.keys().copied().collect();
            let mut expected: Vec<u8> = (0u8..6).filter(|&k| model.count(k) > 0).collect();
            expected.sort_unstable();
            prop_assert_eq!(keys, expected);
        }
    }

    // Materialization produces an equivalent block whose later evolution
    // is independent of the original.
    #[test]
    fn prop_clone_is_equivalent_and_independent(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut storage: QueueStorage<u8, i32> = QueueStorage::new();
        for op in &ops {
            if let Op::Push(k, v) = op {
                storage.push(*k, *v);
            }
        }

        let snapshot: Vec<(u8, i32)> = storage.iter().map(|(_, k, v)| (*k, *v)).collect();
        let copy = storage.clone();
        copy.assert_consistent();
        let copied: Vec<(u8, i32)> = copy.iter().map(|(_, k, v)| (*k, *v)).collect();
        prop_assert_eq!(&copied, &snapshot);

        while storage.pop_front().is_some() {}
        let after: Vec<(u8, i32)> = copy.iter().map(|(_, k, v)| (*k, *v)).collect();
        prop_assert_eq!(&after, &snapshot);
    }
}
