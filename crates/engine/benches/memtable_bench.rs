use criterion::{criterion_group, criterion_main, Criterion};
use memtable::Memtable;

const N: u64 = 10_000;
const VAL_SIZE: usize = 100;

fn memtable_put_sequential(c: &mut Criterion) {
    c.bench_function("memtable_put_10k_sequential", |b| {
        b.iter(|| {
            let mut m = Memtable::new();
            for i in 0..N {
                m.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE]);
            }
        });
    });
}

fn memtable_get_hit(c: &mut Criterion) {
    let mut m = Memtable::new();
    for i in 0..N {
        m.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE]);
    }

    c.bench_function("memtable_get_hit_10k", |b| {
        b.iter(|| {
            for i in 0..N {
                let key = format!("k{:06}", i).into_bytes();
                criterion::black_box(m.get(&key));
            }
        });
    });
}

fn memtable_get_miss(c: &mut Criterion) {
    let mut m = Memtable::new();
    for i in 0..N {
        m.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE]);
    }

    c.bench_function("memtable_get_miss_10k", |b| {
        b.iter(|| {
            for i in 0..N {
                let key = format!("miss{:06}", i).into_bytes();
                criterion::black_box(m.get(&key));
            }
        });
    });
}

fn memtable_overwrite_same_key(c: &mut Criterion) {
    c.bench_function("memtable_overwrite_10k", |b| {
        b.iter(|| {
            let mut m = Memtable::new();
            for i in 0..N {
                m.put(b"hot".to_vec(), format!("v{}", i).into_bytes());
            }
        });
    });
}

fn memtable_delete_heavy(c: &mut Criterion) {
    c.bench_function("memtable_put_delete_10k", |b| {
        b.iter(|| {
            let mut m = Memtable::new();
            for i in 0..N {
                let key = format!("k{:06}", i).into_bytes();
                m.put(key.clone(), vec![b'x'; VAL_SIZE]);
                m.delete(key);
            }
        });
    });
}

criterion_group!(
    benches,
    memtable_put_sequential,
    memtable_get_hit,
    memtable_get_miss,
    memtable_overwrite_same_key,
    memtable_delete_heavy
);
criterion_main!(benches);
