use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use php_array::PhpArray;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_put(c: &mut Criterion) {
    c.bench_function("php_array_put_10k", |b| {
        b.iter_batched(
            PhpArray::<u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("php_array_get_hit", |b| {
        let mut m = PhpArray::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.put(k.as_str(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("php_array_get_miss", |b| {
        let mut m = PhpArray::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

// Unset everything in insertion order: every removal repairs a cluster
// and the table shrinks repeatedly.
fn bench_unset_all(c: &mut Criterion) {
    c.bench_function("php_array_unset_all_10k", |b| {
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        b.iter_batched(
            || {
                let mut m = PhpArray::new();
                for (i, k) in keys.iter().enumerate() {
                    m.put(k.as_str(), i as u64);
                }
                m
            },
            |mut m| {
                for k in &keys {
                    black_box(m.unset(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("php_array_iterate_10k", |b| {
        let mut m = PhpArray::new();
        for (i, x) in lcg(5).take(10_000).enumerate() {
            m.put(key(x), i as u64);
        }
        b.iter(|| black_box(m.iter_values().sum::<u64>()))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put, bench_get_hit, bench_get_miss, bench_unset_all, bench_iterate
}
criterion_main!(benches);
