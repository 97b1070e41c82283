use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdserve::cache::LruCache;
use mdserve::md5;

fn bench_hash(c: &mut Criterion) {
    let input = b"the quick brown fox jumps over the lazy dog";
    c.bench_function("md5::hash short message", |b| {
        b.iter(|| md5::hash(black_box(input)))
    });

    let long_input = vec![b'x'; 4096];
    c.bench_function("md5::hash 4KiB message", |b| {
        b.iter(|| md5::hash(black_box(&long_input)))
    });
}

fn bench_cache_hit(c: &mut Criterion) {
    let cache = LruCache::new(256);
    cache.put("hello", md5::hash(b"hello"));

    c.bench_function("LruCache::get hit", |b| {
        b.iter(|| black_box(cache.get(black_box("hello"))))
    });
}

fn bench_cache_eviction_churn(c: &mut Criterion) {
    let cache = LruCache::new(64);
    let mut i = 0usize;

    c.bench_function("LruCache::put under constant eviction", |b| {
        b.iter(|| {
            let key = format!("key{i}");
            cache.put(black_box(&key), "d".repeat(32));
            i += 1;
        })
    });
}

criterion_group!(benches, bench_hash, bench_cache_hit, bench_cache_eviction_churn);
criterion_main!(benches);
