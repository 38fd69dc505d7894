//! Benchmarks for scanning a docs tree and deriving book models.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio_site::{BookCompiler, BookModel, BookOptions, Navigation};
use folio_storage::FsStorage;

/// Create ranked directories with the given depth and breadth.
fn create_docs(root: &Path, depth: usize, breadth: usize) {
    fn create_level(dir: &Path, current_depth: usize, max_depth: usize, breadth: usize) {
        if current_depth > max_depth {
            return;
        }

        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("README.md"),
            format!("# Level {current_depth}\n\n## Overview\n\nContent at depth {current_depth}."),
        )
        .unwrap();

        for i in 0..breadth {
            fs::write(
                dir.join(format!("{i:03}-page.md")),
                format!("---\nnavOrder: {i}\n---\n# Page {i}\n\n## Details\n"),
            )
            .unwrap();
            let child_dir = dir.join(format!("{i:03}-section"));
            create_level(&child_dir, current_depth + 1, max_depth, breadth);
        }
    }

    create_level(root, 0, depth, breadth);
}

fn compiler(source_dir: PathBuf) -> BookCompiler {
    let options = BookOptions {
        title: "Bench".to_owned(),
        ..BookOptions::default()
    };
    BookCompiler::new(Arc::new(FsStorage::new(source_dir)), options)
}

fn bench_generate(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut group = c.benchmark_group("generate");

    for (depth, breadth, label) in [(2, 3, "small"), (3, 4, "medium"), (4, 4, "large")] {
        let source_dir = temp_dir.path().join(format!("docs_{label}"));
        create_docs(&source_dir, depth, breadth);

        group.bench_function(BenchmarkId::new("cold", label), |b| {
            b.iter_with_setup(|| compiler(source_dir.clone()), |compiler| compiler.generate())
        });

        let warm = compiler(source_dir.clone());
        let _ = warm.generate();
        group.bench_function(BenchmarkId::new("cached", label), |b| {
            b.iter(|| warm.generate())
        });
    }

    group.finish();
}

fn bench_model(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let source_dir = temp_dir.path().join("docs");
    create_docs(&source_dir, 3, 4);
    let config = compiler(source_dir).generate().unwrap();

    let mut group = c.benchmark_group("model");

    group.bench_function("root", |b| {
        b.iter(|| BookModel::compile(&config, &Navigation::new("/")))
    });

    group.bench_function("deep", |b| {
        b.iter(|| BookModel::compile(&config, &Navigation::new("/section/section/section/page")))
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_model);
criterion_main!(benches);
