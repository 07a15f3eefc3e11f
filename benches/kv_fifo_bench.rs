use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kv_fifo::KvFifo;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn filled(n: usize, distinct_keys: u64) -> KvFifo<u64, u64> {
    let mut q = KvFifo::new();
    for (i, x) in lcg(1).take(n).enumerate() {
        q.push(x % distinct_keys, i as u64);
    }
    q
}

fn bench_push(c: &mut Criterion) {
    c.bench_function("kvfifo_push_10k", |b| {
        b.iter_batched(
            KvFifo::<u64, u64>::new,
            |mut q| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    q.push(x % 512, i as u64);
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_all(c: &mut Criterion) {
    c.bench_function("kvfifo_pop_all_10k", |b| {
        b.iter_batched(
            || filled(10_000, 512),
            |mut q| {
                while q.pop().is_ok() {}
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_key(c: &mut Criterion) {
    c.bench_function("kvfifo_pop_key_hit", |b| {
        b.iter_batched(
            || filled(10_000, 64),
            |mut q| {
                for x in lcg(7).take(1_000) {
                    let _ = q.pop_key(&(x % 64));
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_move_to_back(c: &mut Criterion) {
    c.bench_function("kvfifo_move_to_back", |b| {
        b.iter_batched(
            || filled(10_000, 64),
            |mut q| {
                for x in lcg(11).take(200) {
                    let _ = q.move_to_back(&(x % 64));
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_count(c: &mut Criterion) {
    c.bench_function("kvfifo_count_lookup", |b| {
        let q = filled(20_000, 1024);
        let mut keys = lcg(13);
        b.iter(|| {
            let k = keys.next().unwrap() % 2048; // half hits, half misses
            black_box(q.count(&k))
        })
    });
}

fn bench_clone_shared(c: &mut Criterion) {
    c.bench_function("kvfifo_clone_shared", |b| {
        let q = filled(10_000, 512);
        b.iter(|| black_box(q.clone()))
    });
}

fn bench_cow_materialize(c: &mut Criterion) {
    // First mutation through a sharing handle pays the deep copy.
    c.bench_function("kvfifo_cow_materialize_10k", |b| {
        let q = filled(10_000, 512);
        b.iter_batched(
            || q.clone(),
            |mut copy| {
                copy.push(0, 0);
                black_box(copy)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_pop_all,
    bench_pop_key,
    bench_move_to_back,
    bench_count,
    bench_clone_shared,
    bench_cow_materialize,
);
criterion_main!(benches);
