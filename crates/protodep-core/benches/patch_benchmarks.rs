use criterion::{Criterion, black_box, criterion_group, criterion_main};
use protodep_core::{DependencyFilter, ProtoPatcher};
use protodep_fs::NormalizedPath;
use protodep_meta::Dependency;

fn large_proto(messages: usize) -> String {
    let mut source = String::from(
        "syntax = \"proto3\";\npackage upstream.api.v1;\noption java_package = \"com.upstream.api.v1\";\n",
    );
    for i in 0..messages {
        source.push_str(&format!(
            "message Item{i} {{\n  string id = 1;\n  message Detail {{\n    int64 at = 1;\n  }}\n  enum State {{\n    UNKNOWN = 0;\n  }}\n}}\n"
        ));
    }
    source
}

fn patch_benchmark(c: &mut Criterion) {
    let content = large_proto(500);
    let patcher = ProtoPatcher::new(".org.api.derived_from", &[], "proto");

    c.bench_function("ProtoPatcher::patch (500 messages)", |b| {
        b.iter(|| {
            let _ = patcher.patch(black_box(content.as_bytes()), black_box("vendor/api/v1/items.proto"));
        })
    });

    // Already patched input exercises annotation replacement
    let patched = patcher.patch(content.as_bytes(), "vendor/api/v1/items.proto").into_owned();
    c.bench_function("ProtoPatcher::patch (re-patch)", |b| {
        b.iter(|| {
            let _ = patcher.patch(black_box(&patched), black_box("vendor/api/v1/items.proto"));
        })
    });
}

fn filter_benchmark(c: &mut Criterion) {
    let dep = Dependency {
        target: "github.com/org/repo".into(),
        includes: vec!["/api".into(), "**/shared/*.proto".into()],
        ignores: vec!["./api/internal".into(), "**/*_test.proto".into()],
        ..Default::default()
    };
    let filter = DependencyFilter::for_dependency(&dep).unwrap();
    let root = NormalizedPath::new("/home/dev/.protodep/github.com/org/repo");
    let candidate = root.join("api/v1/nested/deeper/user_service.proto");

    c.bench_function("DependencyFilter::decide", |b| {
        b.iter(|| filter.decide(black_box(&root), black_box(&candidate)))
    });
}

criterion_group!(benches, patch_benchmark, filter_benchmark);
criterion_main!(benches);
