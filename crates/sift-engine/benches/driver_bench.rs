use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sift_engine::linter::{Driver, Linter, SourceFile};
use sift_engine::syntax::parse;

fn class_source(methods: usize) -> String {
    let mut source = String::from("using System;\nusing System.Linq;\n\nclass Bench\n{\n");
    for i in 0..methods {
        source.push_str(&format!(
            "    public int M{i}(int[] xs)\n    {{\n        try {{ return xs.Where(x => x > {i}).Count(); }}\n        catch (Exception ex) {{ Log(ex); throw ex; }}\n    }}\n"
        ));
    }
    source.push_str("}\n");
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for methods in [10, 100, 1000] {
        let source = class_source(methods);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(methods), &source, |b, source| {
            b.iter(|| parse(black_box(source)))
        });
    }
    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let linter = Linter::new();
    let source = class_source(100);
    let tree = parse(&source).tree;

    c.bench_function("lint_tree_100_methods", |b| {
        b.iter(|| linter.lint_tree(black_box(&tree), "bench.cs"))
    });
}

fn bench_fix_all(c: &mut Criterion) {
    let linter = Linter::new();
    let source = class_source(50);

    c.bench_function("fix_all_50_methods", |b| {
        b.iter(|| linter.fix_all(black_box(&source), "bench.cs", &["bare-rethrow"]))
    });
}

fn bench_batch(c: &mut Criterion) {
    let linter = Linter::new();
    let files: Vec<SourceFile> = (0..64)
        .map(|i| SourceFile::new(format!("f{}.cs", i), class_source(20)))
        .collect();

    let mut group = c.benchmark_group("batch");
    for jobs in [1, 4] {
        let driver = Driver::with_jobs(&linter, jobs);
        group.bench_with_input(BenchmarkId::new("jobs", jobs), &files, |b, files| {
            b.iter(|| driver.lint_batch(black_box(files)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_lint, bench_fix_all, bench_batch);
criterion_main!(benches);
