use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sfdc_git_diff::classify::ClassificationIndex;
use sfdc_git_diff::config::AnomalyPolicy;
use sfdc_git_diff::definitions::TypeLookupTable;
use sfdc_git_diff::package::{Manifest, PackageDescriptor};
use std::hint::black_box;

const FOLDERS: [&str; 5] = ["classes", "triggers", "pages", "objects", "widgets"];

fn create_paths(count: usize) -> Vec<String> {
    (0..count)
        .flat_map(|i| {
            let folder = FOLDERS[i % FOLDERS.len()];
            [
                format!("force-app/main/default/{folder}/Object{i}.src"),
                format!("force-app/main/default/{folder}/Object{i}.src-meta.xml"),
            ]
        })
        .collect()
}

fn table() -> TypeLookupTable {
    [
        ("classes", "ApexClass"),
        ("triggers", "ApexTrigger"),
        ("pages", "ApexPage"),
        ("objects", "CustomObject"),
    ]
    .into_iter()
    .collect()
}

fn benchmark_classification(c: &mut Criterion) {
    let table = table();
    let mut group = c.benchmark_group("classification");

    for size in [100, 1_000, 10_000] {
        let paths = create_paths(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &paths, |b, paths| {
            b.iter(|| {
                ClassificationIndex::build(
                    black_box(paths),
                    "default/",
                    &table,
                    AnomalyPolicy::Warn,
                )
            });
        });
    }

    group.finish();
}

fn benchmark_artifacts(c: &mut Criterion) {
    let table = table();
    let paths = create_paths(5_000);
    let index = ClassificationIndex::build(&paths, "default/", &table, AnomalyPolicy::Warn)
        .expect("warn policy never fails");
    let descriptor = PackageDescriptor::build(&index, "58.0");

    let mut group = c.benchmark_group("artifacts");

    group.bench_function("descriptor_xml", |b| {
        b.iter(|| black_box(&descriptor).to_xml());
    });

    group.bench_function("manifest", |b| {
        b.iter(|| {
            Manifest::build(black_box(&paths), "default/", AnomalyPolicy::Warn)
                .map(|manifest| manifest.render())
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_classification, benchmark_artifacts);
criterion_main!(benches);
