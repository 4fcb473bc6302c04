use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sarf_index::{RootTree, Scheme, SchemeTable};

const LETTERS: [char; 12] = ['ب', 'ت', 'ج', 'د', 'ر', 'س', 'ع', 'ق', 'ك', 'ل', 'م', 'ن'];

fn synthetic_roots() -> Vec<String> {
    let mut roots = Vec::new();
    for a in LETTERS {
        for b in LETTERS {
            for c in LETTERS {
                roots.push([a, b, c].iter().collect());
            }
        }
    }
    roots
}

fn bench_tree(c: &mut Criterion) {
    let roots = synthetic_roots();
    let mut group = c.benchmark_group("root_tree");

    group.bench_function(BenchmarkId::new("insert", roots.len()), |b| {
        b.iter(|| {
            let mut tree = RootTree::new();
            for root in &roots {
                tree.insert(root);
            }
            tree
        })
    });

    let mut tree = RootTree::new();
    for root in &roots {
        tree.insert(root);
    }
    group.bench_function(BenchmarkId::new("search", roots.len()), |b| {
        b.iter(|| roots.iter().filter(|r| tree.search(r).is_some()).count())
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let mut table = SchemeTable::new();
    let ids: Vec<String> = (0..500).map(|idx| format!("scheme-{idx}")).collect();
    for id in &ids {
        table.put(Scheme::new(id.as_str(), "فَاعِل", "Agent"));
    }
    c.bench_function("scheme_table_get", |b| {
        b.iter(|| ids.iter().filter(|id| table.get(id).is_some()).count())
    });
}

criterion_group!(benches, bench_tree, bench_registry);
criterion_main!(benches);
