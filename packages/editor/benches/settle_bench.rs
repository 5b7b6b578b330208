use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quire_editor::model::builders::*;
use quire_editor::model::{Node, SequentialIds};
use quire_editor::{Command, EditorConfig, EditorView, PostEffectEngine, UniformLayout};

fn long_page(blocks: usize) -> Node {
    let content = (0..blocks)
        .map(|i| paragraph(&format!("paragraph {}", i)))
        .collect();
    doc(vec![page(vec![paragraph("header")], content, vec![paragraph("footer")])])
}

fn view_of(doc: Node) -> EditorView {
    EditorView::with_parts(
        doc,
        EditorConfig::default(),
        Box::new(UniformLayout::new(24.0)),
        PostEffectEngine::with_ids(SequentialIds::new("bench")),
    )
    .unwrap()
}

fn settle_single_overflow(c: &mut Criterion) {
    // 11 blocks of 24 overflow the 245 budget by one block
    let doc = long_page(11);
    c.bench_function("settle_single_overflow", |b| {
        b.iter(|| {
            let mut view = view_of(black_box(doc.clone()));
            view.settle().unwrap()
        })
    });
}

fn settle_long_cascade(c: &mut Criterion) {
    let doc = long_page(120);
    c.bench_function("settle_long_cascade", |b| {
        b.iter(|| {
            let mut view = view_of(black_box(doc.clone()));
            view.settle().unwrap()
        })
    });
}

fn type_and_commit(c: &mut Criterion) {
    let doc = long_page(10);
    c.bench_function("type_and_commit", |b| {
        b.iter(|| {
            let mut view = view_of(doc.clone());
            for _ in 0..20 {
                view.execute(Command::InsertText { text: "lorem ipsum".into() }).unwrap();
                view.execute(Command::SplitBlock).unwrap();
            }
            black_box(view.doc().page_count())
        })
    });
}

criterion_group!(benches, settle_single_overflow, settle_long_cascade, type_and_commit);
criterion_main!(benches);
