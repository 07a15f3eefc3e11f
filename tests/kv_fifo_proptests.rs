use proptest::prelude::*;

use kv_fifo::KvFifo;

// Model operations on KvFifo against a plain Vec<(K, V)> model, taking
// cheap clones along the way and verifying at the end that every clone
// still matches the model state it was taken from (copy-on-write
// transparency across arbitrary later mutations).

#[derive(Clone, Debug)]
enum Op {
    Push(u8, i32),
    Pop,
    PopKey(u8),
    MoveToBack(u8),
    FrontMutAdd(i32),
    FirstMutAdd(u8, i32),
    TakeClone,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0u8..5, any::<i32>()).prop_map(|(k, v)| Op::Push(k, v)),
        2 => Just(Op::Pop),
        2 => (0u8..5).prop_map(Op::PopKey),
        2 => (0u8..5).prop_map(Op::MoveToBack),
        1 => any::<i32>().prop_map(Op::FrontMutAdd),
        1 => (0u8..5, any::<i32>()).prop_map(|(k, d)| Op::FirstMutAdd(k, d)),
        2 => Just(Op::TakeClone),
        1 => Just(Op::Clear),
    ]
}

type Model = Vec<(u8, i32)>;

fn check_against_model(q: &KvFifo<u8, i32>, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(q.len(), model.len());
    prop_assert_eq!(q.is_empty(), model.is_empty());

    let seq: Vec<(u8, i32)> = q.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(&seq, model);

    prop_assert_eq!(q.front().ok().map(|(k, v)| (*k, *v)), model.first().copied());
    prop_assert_eq!(q.back().ok().map(|(k, v)| (*k, *v)), model.last().copied());

    for k in 0u8..5 {
        let count = model.iter().filter(|&&(ek, _)| ek == k).count();
        prop_assert_eq!(q.count(&k), count);
        prop_assert_eq!(
            q.first(&k).ok().map(|(k, v)| (*k, *v)),
            model.iter().find(|&&(ek, _)| ek == k).copied()
        );
        prop_assert_eq!(
            q.last(&k).ok().map(|(k, v)| (*k, *v)),
            model.iter().rfind(|&&(ek, _)| ek == k).copied()
        );
    }

    let keys: Vec<u8> = q.keys().copied().collect();
    let mut expected: Vec<u8> = (0u8..5)
        .filter(|k| model.iter().any(|&(ek, _)| ek == *k))
        .collect();
    expected.sort_unstable();
    prop_assert_eq!(keys, expected);
    Ok(())
}

proptest! {
    #[test]
    fn prop_kvfifo_matches_model_and_clones_stay_frozen(
        ops in proptest::collection::vec(op_strategy(), 1..150),
    ) {
        let mut q: KvFifo<u8, i32> = KvFifo::new();
        let mut model: Model = Vec::new();
        let mut frozen: Vec<(KvFifo<u8, i32>, Model)> = Vec::new();

        for op in ops {
            match op {
                Op::Push(k, v) => {
                    q.push(k, v);
                    model.push((k, v));
                }
                Op::Pop => {
                    let res = q.pop();
                    if model.is_empty() {
                        prop_assert!(res.is_err());
                    } else {
                        prop_assert!(res.is_ok());
                        model.remove(0);
                    }
                }
                Op::PopKey(k) => {
                    let res = q.pop_key(&k);
                    match model.iter().position(|&(ek, _)| ek == k) {
                        Some(i) => {
                            prop_assert!(res.is_ok());
                            model.remove(i);
                        }
                        None => prop_assert!(res.is_err()),
                    }
                }
                Op::MoveToBack(k) => {
                    let res = q.move_to_back(&k);
                    if model.iter().any(|&(ek, _)| ek == k) {
                        prop_assert!(res.is_ok());
                        let (moved, kept): (Model, Model) =
                            model.drain(..).partition(|&(ek, _)| ek == k);
                        model = kept;
                        model.extend(moved);
                    } else {
                        prop_assert!(res.is_err());
                    }
                }
                Op::FrontMutAdd(d) => {
                    let res = q.front_mut();
                    if model.is_empty() {
                        prop_assert!(res.is_err());
                    } else {
                        let (k, v) = res.unwrap();
                        prop_assert_eq!(*k, model[0].0);
                        *v = v.wrapping_add(d);
                        model[0].1 = model[0].1.wrapping_add(d);
                    }
                }
                Op::FirstMutAdd(k, d) => {
                    let res = q.first_mut(&k);
                    match model.iter().position(|&(ek, _)| ek == k) {
                        Some(i) => {
                            let (_, v) = res.unwrap();
                            *v = v.wrapping_add(d);
                            model[i].1 = model[i].1.wrapping_add(d);
                        }
                        None => prop_assert!(res.is_err()),
                    }
                }
                Op::TakeClone => {
                    frozen.push((q.clone(), model.clone()));
                }
                Op::Clear => {
                    q.clear();
                    model.clear();
                }
            }

            check_against_model(&q, &model)?;
        }

        // Every clone must still look exactly like the model at the
        // moment it was taken, no matter what happened afterwards.
        for (snapshot, snapshot_model) in &frozen {
            check_against_model(snapshot, snapshot_model)?;
        }
    }
}
