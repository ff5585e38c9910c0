//! Бенчмарки операций БД: запись и чтение на значениях 64 B и 1 KiB.

use criterion::{criterion_group, criterion_main, Criterion};
use std::path::PathBuf;
use std::sync::Arc;

use rumcask::{Db, HashKeyStore};

const SEEDED_KEYS: u64 = 10_000;

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rumcask-bench-{}-{}-{}", prefix, pid, t))
}

fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("db_writes");
    for size in [64usize, 1024] {
        group.bench_function(format!("{}b", size), |b| {
            let root = unique_root(&format!("w{}", size));
            let db = Db::open(&root, Arc::new(HashKeyStore::new())).unwrap();
            let value = vec![b'X'; size];
            let mut i = 0u64;

            b.iter(|| {
                let key = format!("KEY{:08}", i % SEEDED_KEYS);
                i += 1;
                db.set(key.as_bytes(), &value).unwrap();
            });

            drop(db);
            let _ = std::fs::remove_dir_all(&root);
        });
    }
    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("db_reads");
    for size in [64usize, 1024] {
        group.bench_function(format!("{}b", size), |b| {
            let root = unique_root(&format!("r{}", size));
            let db = Db::open(&root, Arc::new(HashKeyStore::new())).unwrap();
            let value = vec![b'X'; size];
            for i in 0..SEEDED_KEYS {
                let key = format!("KEY{:08}", i);
                db.set(key.as_bytes(), &value).unwrap();
            }

            // LCG вместо rand: детерминированный выбор ключа
            let mut state = 0x9E3779B97F4A7C15u64;
            b.iter(|| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let key = format!("KEY{:08}", state % SEEDED_KEYS);
                db.get(key.as_bytes()).unwrap();
            });

            drop(db);
            let _ = std::fs::remove_dir_all(&root);
        });
    }
    group.finish();
}

criterion_group!(benches, bench_writes, bench_reads);
criterion_main!(benches);
