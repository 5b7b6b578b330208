//! Integration tests for the editor crate

use quire_editor::model::builders::*;
use quire_editor::model::{Align, Node, NodeKind, Region, SequentialIds};
use quire_editor::{
    Command, EditorConfig, EditorView, PostEffectEngine, Selection, SettleTrigger, UniformLayout,
};

fn paragraphs(prefix: &str, n: usize) -> Vec<Node> {
    (0..n).map(|i| paragraph(&format!("{}{}", prefix, i))).collect()
}

fn view_of(pages: Vec<Node>, block_height: f64) -> anyhow::Result<EditorView> {
    Ok(EditorView::with_parts(
        doc(pages),
        EditorConfig::default(),
        Box::new(UniformLayout::new(block_height)),
        PostEffectEngine::with_ids(SequentialIds::new("doc")),
    )?)
}

fn page_texts(view: &EditorView) -> Vec<Vec<String>> {
    view.doc()
        .pages()
        .iter()
        .map(|p| p.content_blocks().iter().map(|(_, n)| n.text_content()).collect())
        .collect()
}

fn assert_regions_intact(view: &EditorView) {
    for page in view.doc().pages() {
        for region in [Region::Header, Region::Content, Region::Footer] {
            assert!(page.region(region).is_some(), "page {} lost a region", page.index);
        }
    }
}

#[test]
fn test_overflow_creates_second_page() -> anyhow::Result<()> {
    // 5 x 60 = 300 reaches the 245 budget, the first four stay below it
    let mut view = view_of(vec![page(vec![], paragraphs("p", 5), vec![])], 60.0)?;
    let report = view.settle()?;

    assert!(report.converged);
    assert_eq!(report.corrections.len(), 1);
    assert_eq!(report.corrections[0].moved, 1);
    assert!(report.corrections[0].created_page);
    assert_eq!(
        page_texts(&view),
        vec![vec!["p0", "p1", "p2", "p3"], vec!["p4"]]
    );
    assert_regions_intact(&view);
    Ok(())
}

#[test]
fn test_taller_blocks_cascade_over_new_pages() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], paragraphs("p", 5), vec![])], 100.0)?;
    let report = view.settle()?;

    assert!(report.converged);
    let moved: Vec<(usize, usize, bool)> = report
        .corrections
        .iter()
        .map(|c| (c.page, c.moved, c.created_page))
        .collect();
    assert_eq!(moved, vec![(0, 3, true), (1, 1, true)]);
    assert_eq!(
        page_texts(&view),
        vec![vec!["p0", "p1"], vec!["p2", "p3"], vec!["p4"]]
    );
    Ok(())
}

#[test]
fn test_oversized_first_block_empties_source_page() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], paragraphs("p", 2), vec![])], 300.0)?;
    let report = view.settle_cycle()?;

    assert_eq!(report.corrections[0].moved, 2);
    let first = view.doc().page(0).expect("source page survives");
    let content = first.region(Region::Content).expect("content region survives");
    assert_eq!(content.child_count(), 0);
    assert_eq!(page_texts(&view)[1], vec!["p0", "p1"]);
    assert_regions_intact(&view);
    Ok(())
}

#[test]
fn test_deleting_sole_block_keeps_content_region() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], vec![paragraph("only")], vec![])], 24.0)?;
    let mut tr = view.state().tr();
    tr.delete(4, 10)?;
    view.dispatch(tr)?;

    let page = view.doc().page(0).expect("page survives");
    let content = page.region(Region::Content).expect("content region survives");
    assert_eq!(content.child_count(), 0);
    assert_regions_intact(&view);
    Ok(())
}

#[test]
fn test_insert_table_command() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], vec![paragraph("")], vec![])], 24.0)?;
    assert!(view.execute(Command::InsertTable { rows: 3, cols: 3 })?);

    let table = view.doc().pages()[0]
        .content_blocks()
        .into_iter()
        .map(|(_, n)| n)
        .find(|n| n.kind() == NodeKind::Table)
        .expect("table inserted");
    assert_eq!(table.child_count(), 3);
    assert!(table.children().iter().all(|row| row.child_count() == 3));
    Ok(())
}

#[test]
fn test_cascade_resolves_one_boundary_per_cycle() -> anyhow::Result<()> {
    let mut view = view_of(
        vec![
            page(vec![], paragraphs("a", 5), vec![]),
            page(vec![], paragraphs("b", 5), vec![]),
        ],
        60.0,
    )?;

    let first = view.settle_cycle()?;
    assert_eq!(first.corrections[0].page, 0);
    assert_eq!(view.doc().page_count(), 2);
    assert_eq!(view.doc().pages()[1].content_blocks().len(), 6);

    let second = view.settle_cycle()?;
    assert_eq!(second.corrections[0].page, 1);
    assert_eq!(view.doc().page_count(), 3);

    assert!(view.settle_cycle()?.converged);
    Ok(())
}

#[test]
fn test_justify_spans_two_paragraphs() -> anyhow::Result<()> {
    let mut view = view_of(
        vec![page(
            vec![paragraph("head")],
            vec![paragraph("one"), paragraph("two"), paragraph("three")],
            vec![],
        )],
        24.0,
    )?;
    let start = view.doc().pages()[0].content_start();
    view.set_selection(Selection::text(start + 1, start + 7))?;
    assert!(view.execute(Command::SetAlignment { align: Align::Justify })?);

    let aligns: Vec<Option<Align>> = view.doc().pages()[0]
        .content_blocks()
        .iter()
        .map(|(_, n)| n.attrs().align())
        .collect();
    assert_eq!(
        aligns,
        vec![Some(Align::Justify), Some(Align::Justify), Some(Align::Left)]
    );
    let header = view.doc().pages()[0].region(Region::Header).cloned().expect("header");
    assert_eq!(header.children()[0].attrs().align(), Some(Align::Left));
    Ok(())
}

#[test]
fn test_settling_a_fitting_document_is_a_noop() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], paragraphs("p", 3), vec![])], 60.0)?;
    let version = view.state().version();
    let before = view.doc().clone();

    let report = view.settle()?;
    assert!(report.converged);
    assert!(report.corrections.is_empty());
    assert_eq!(view.state().version(), version);
    assert!(view.doc().ptr_eq(&before));
    Ok(())
}

#[test]
fn test_ids_survive_relocation() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], paragraphs("p", 8), vec![])], 60.0)?;
    let ids_of = |view: &EditorView| -> Vec<(String, Option<String>)> {
        view.doc()
            .pages()
            .iter()
            .flat_map(|p| p.content_blocks())
            .map(|(_, n)| (n.text_content(), n.id().map(str::to_string)))
            .collect()
    };
    let before = ids_of(&view);
    assert!(before.iter().all(|(_, id)| id.is_some()));

    view.settle()?;
    assert_eq!(view.doc().page_count(), 2);
    assert_eq!(ids_of(&view), before);

    view.settle()?;
    assert_eq!(ids_of(&view), before);
    Ok(())
}

#[test]
fn test_typing_then_enter_settles_and_undoes() -> anyhow::Result<()> {
    let mut view = view_of(vec![page(vec![], paragraphs("p", 4), vec![])], 60.0)?;
    // end of the last paragraph
    let end = view.doc().pages()[0].content_blocks()[3].0 + 3;
    view.set_selection(Selection::cursor(end))?;
    view.execute(Command::InsertText { text: "!".into() })?;
    view.execute(Command::SplitBlock)?;
    view.execute(Command::InsertText { text: "new".into() })?;

    assert_eq!(
        page_texts(&view),
        vec![vec!["p0", "p1", "p2", "p3!"], vec!["new"]]
    );
    let new_block = &view.doc().pages()[1].content_blocks()[0].1;
    assert!(new_block.id().is_some());

    assert!(view.undo()?);
    assert!(view.undo()?);
    assert_eq!(page_texts(&view), vec![vec!["p0", "p1", "p2", "p3!"]]);

    assert!(view.redo()?);
    assert_eq!(page_texts(&view)[1], vec![""]);
    assert_regions_intact(&view);
    Ok(())
}

#[test]
fn test_unmeasurable_page_is_retried() -> anyhow::Result<()> {
    let mut oracle = UniformLayout::new(60.0);
    oracle.detach(0);
    let mut view = EditorView::with_parts(
        doc(vec![page(vec![], paragraphs("p", 5), vec![])]),
        EditorConfig::default(),
        Box::new(oracle),
        PostEffectEngine::empty(),
    )?;

    let report = view.settle()?;
    assert_eq!(report.skipped, vec![0]);
    assert!(report.corrections.is_empty());
    assert_eq!(view.doc().page_count(), 1);

    view.set_oracle(Box::new(UniformLayout::new(60.0)));
    let report = view.settle()?;
    assert!(report.skipped.is_empty());
    assert_eq!(view.doc().page_count(), 2);
    Ok(())
}

#[test]
fn test_every_transaction_trigger_keeps_pages_settled() -> anyhow::Result<()> {
    let mut config = EditorConfig::default();
    config.pagination.trigger = SettleTrigger::EveryTransaction;
    let mut view = EditorView::with_parts(
        doc(vec![page(vec![], vec![paragraph("")], vec![])]),
        config,
        Box::new(UniformLayout::new(50.0)),
        PostEffectEngine::with_ids(SequentialIds::new("doc")),
    )?;
    for _ in 0..12 {
        view.execute(Command::InsertText { text: "x".into() })?;
        view.execute(Command::SplitBlock)?;
    }
    // 4 x 50 stays below the 245 budget, a fifth block does not
    let counts: Vec<usize> = view
        .doc()
        .pages()
        .iter()
        .map(|p| p.content_blocks().len())
        .collect();
    assert_eq!(counts, vec![4, 4, 4, 1]);
    assert_regions_intact(&view);
    Ok(())
}

#[test]
fn test_positions_round_trip_after_settling() -> anyhow::Result<()> {
    let mut view = view_of(
        vec![page(
            vec![paragraph("title")],
            vec![heading(1, "Intro"), bullet_list(vec!["a", "b"]), table(2, 2), paragraph("end")],
            vec![paragraph("1")],
        )],
        100.0,
    )?;
    view.settle()?;
    let d = view.doc();
    for pos in 0..=d.content_size() {
        assert_eq!(d.resolve(pos)?.reconstruct(), pos);
    }
    Ok(())
}

#[test]
fn test_snapshot_reports_toolbar_and_outline() -> anyhow::Result<()> {
    let mut view = view_of(
        vec![page(vec![], vec![heading(2, "Scope"), bullet_list(vec!["item"])], vec![])],
        24.0,
    )?;
    // heading at 4 (4..11), list at 11, item at 12, paragraph at 13, text at 14
    view.set_selection(Selection::cursor(14))?;
    let snapshot = view.snapshot();
    assert!(snapshot.active["bullet_list"]);
    assert_eq!(snapshot.outline.len(), 1);
    assert_eq!(snapshot.outline[0].level, 2);
    assert!(snapshot.outline[0].rect.is_some());
    assert!(snapshot.selection_rect.is_some());
    Ok(())
}
