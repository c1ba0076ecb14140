use criterion::{Criterion, black_box, criterion_group, criterion_main};
use richdoc_engine::model::{DocumentTree, Element, NodeId, register_core_types};

/// Nested list chain `depth` levels deep, ending in a paragraph with text.
fn deep_tree(depth: usize) -> (DocumentTree, NodeId, NodeId) {
    register_core_types();
    let mut tree = DocumentTree::new(Element::new("document")).unwrap();
    let mut parent = tree.root();
    for _ in 0..depth {
        let list = tree.create_node(Element::new("list"), 0).unwrap();
        tree.append(parent, list).unwrap();
        let item = tree.create_node(Element::new("list_item"), 0).unwrap();
        tree.append(list, item).unwrap();
        parent = item;
    }
    let paragraph = tree.create_node(Element::new("paragraph"), 0).unwrap();
    tree.append(parent, paragraph).unwrap();
    let text = tree.create_node(Element::new("text"), 0).unwrap();
    tree.append(paragraph, text).unwrap();
    tree.set_length(text, 40).unwrap();
    (tree, paragraph, text)
}

fn bench_length_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("length_propagation");

    for depth in [4, 32] {
        let (mut tree, _, text) = deep_tree(depth);
        group.bench_function(format!("adjust_depth_{depth}"), |b| {
            b.iter(|| {
                tree.adjust_length(black_box(text), 1).unwrap();
                tree.adjust_length(black_box(text), -1).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_positional_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("positional_queries");

    let (tree, paragraph, text) = deep_tree(32);
    group.bench_function("offset", |b| {
        b.iter(|| black_box(tree.offset(black_box(text))));
    });
    group.bench_function("merge_check", |b| {
        b.iter(|| black_box(tree.can_be_merged_with(black_box(paragraph), black_box(text))));
    });

    group.finish();
}

criterion_group!(benches, bench_length_propagation, bench_positional_queries);
criterion_main!(benches);
