use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pkgref_bench::package_lock;
use pkgref_util::hash::content_hash;

fn bench_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hash");

    for deps in [10, 100, 1000, 10_000] {
        let text = package_lock(deps);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(deps), &text, |b, text| {
            b.iter(|| content_hash(black_box(text)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_content_hash);
criterion_main!(benches);
