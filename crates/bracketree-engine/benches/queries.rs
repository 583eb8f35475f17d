use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};

use bracketree_engine::{
    BracketPairsModel, BracketPairsOptions, Range, StaticLanguageConfiguration, TextDocument,
};
mod common;

fn bench_range_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_queries");
    let doc = TextDocument::new("rust", &common::generate_c_like_source(1000));
    let mut model = BracketPairsModel::new(
        &doc,
        Rc::new(StaticLanguageConfiguration::c_like()),
        BracketPairsOptions::default(),
    );
    // Build the tree outside the measured loop.
    model.brackets_in_range(&doc, Range::new(1, 1, 1, 1));

    let viewport = Range::new(3000, 1, 3060, 1);
    group.bench_function("brackets_in_viewport", |b| {
        b.iter(|| std::hint::black_box(model.brackets_in_range(&doc, viewport)));
    });
    group.bench_function("pairs_in_viewport_with_indentation", |b| {
        b.iter(|| std::hint::black_box(model.bracket_pairs_in_range(&doc, viewport, true)));
    });
    group.bench_function("brackets_in_document", |b| {
        b.iter(|| std::hint::black_box(model.brackets_in_range(&doc, doc.full_range())));
    });

    group.finish();
}

criterion_group!(benches, bench_range_queries);
criterion_main!(benches);
