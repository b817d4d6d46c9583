use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;
use wal::Wal;

const N: usize = 1_000;
const VAL_SIZE: usize = 100;

fn wal_append(c: &mut Criterion) {
    c.bench_function("wal_append_fsync_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let w = Wal::open(dir.path()).unwrap();
                (dir, w)
            },
            |(_dir, mut w)| {
                for i in 0..N as u64 {
                    let key = format!("k{}", i).into_bytes();
                    w.append(&key, Some(&vec![b'x'; VAL_SIZE])).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn wal_append_tombstones(c: &mut Criterion) {
    c.bench_function("wal_append_tombstone_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let w = Wal::open(dir.path()).unwrap();
                (dir, w)
            },
            |(_dir, mut w)| {
                for i in 0..N as u64 {
                    let key = format!("k{}", i).into_bytes();
                    w.append(&key, None).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn wal_replay(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    {
        let mut w = Wal::open(dir.path()).unwrap();
        for i in 0..5_000u64 {
            let key = format!("k{}", i).into_bytes();
            w.append(&key, Some(&vec![b'x'; VAL_SIZE])).unwrap();
        }
    }

    c.bench_function("wal_replay_5k", |b| {
        b.iter(|| {
            let mut w = Wal::open(dir.path()).unwrap();
            let mut count = 0u64;
            w.replay(|_, _| count += 1).unwrap();
            criterion::black_box(count);
        });
    });
}

criterion_group!(benches, wal_append, wal_append_tombstones, wal_replay);
criterion_main!(benches);
