use carcache::{CacheConn, CacheManager};
use carstore::{CarStore, FixedScores};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn seeded_store() -> CarStore {
    let mut scores = FixedScores::new(vec![2600, 1400, 2900, 1100, 2200, 1700]);
    CarStore::seeded(&mut scores)
}

fn bench_list_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_cache");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("hit", |b| {
        let store = seeded_store();
        let mgr = CacheManager::new(CacheConn::new());

        // Warm: first read populates the blob
        mgr.get_list(&store).unwrap();

        b.iter(|| {
            black_box(mgr.get_list(&store).unwrap());
        });
    });

    group.bench_function("direct_store", |b| {
        let store = seeded_store();

        b.iter(|| {
            black_box(store.all_by_score_desc());
        });
    });

    group.finish();
}

fn bench_ranked_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranked_cache");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("full_hit", |b| {
        let store = seeded_store();
        let mgr = CacheManager::new(CacheConn::new());
        mgr.get_ranked(&store).unwrap();

        b.iter(|| {
            black_box(mgr.get_ranked(&store).unwrap());
        });
    });

    group.bench_function("top5_hit", |b| {
        let store = seeded_store();
        let mgr = CacheManager::new(CacheConn::new());
        mgr.get_ranked(&store).unwrap();

        b.iter(|| {
            black_box(mgr.get_ranked_top5(&store).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_list_reads, bench_ranked_reads);
criterion_main!(benches);
