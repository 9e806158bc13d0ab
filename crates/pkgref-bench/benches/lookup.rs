use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pkgref_bench::{offset_of, package_json, package_lock, package_name};
use pkgref_core::{JsonParser, ParseCache, RangedJsonParser, Session};
use std::fs;
use std::path::Path;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for deps in [10, 100, 1000, 10_000] {
        let text = package_lock(deps);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(deps), &text, |b, text| {
            b.iter(|| RangedJsonParser.parse(black_box(text)));
        });
    }

    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit");
    let path = Path::new("/bench/package-lock.json");

    for deps in [100, 10_000] {
        let text = package_lock(deps);
        let cache = ParseCache::default();
        cache.get_ast(path, &text).unwrap();

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(deps), &text, |b, text| {
            b.iter(|| cache.get_ast(path, black_box(text)));
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let dir = tempfile::tempdir().unwrap();
    let deps = 1000;
    let target = package_name(deps / 2);
    fs::create_dir_all(dir.path().join("node_modules").join(&target)).unwrap();

    let manifest = package_json(deps);
    let manifest_path = dir.path().join("package.json");
    fs::write(&manifest_path, &manifest).unwrap();
    let lock = package_lock(deps);
    let lock_path = dir.path().join("package-lock.json");
    fs::write(&lock_path, &lock).unwrap();

    let session = Session::new(dir.path().to_path_buf());
    let cases = [
        ("package_json", &manifest_path, &manifest, target.clone()),
        (
            "lockfile_key",
            &lock_path,
            &lock,
            format!("node_modules/{target}"),
        ),
    ];
    for (label, path, text, needle) in cases {
        let offset = offset_of(text, &needle).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| session.lookup(path, black_box(text), black_box(offset)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_cache_hit, bench_lookup);
criterion_main!(benches);
