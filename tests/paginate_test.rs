//! Integration tests for pagination.

use std::sync::Arc;
use std::time::Duration;

use folio::paginate::{pages_round_trip, paginate_manual, paginate_strict, split_blocks};
use folio::render::PAGE_BREAK_HTML;
use folio::{
    paginate, Editor, Error, HeightMeasurer, PaginateOptions, PaginationWorker, Paginator,
    ParseOptions, TextMetricsMeasurer,
};

/// Measures `<p>N</p>` as N pixels.
fn by_text(block: &str) -> Option<f32> {
    let start = block.find('>')? + 1;
    let end = block[start..].find('<')? + start;
    block[start..end].trim().parse().ok()
}

fn contents(pages: &[folio::Page]) -> Vec<&str> {
    pages.iter().map(|p| p.content.as_str()).collect()
}

#[test]
fn test_manual_breaks_under_capacity() {
    let html = format!("<p>100</p><p>200</p>{}<p>300</p>", PAGE_BREAK_HTML);
    let options = PaginateOptions::new().with_capacity(1050.0);
    let pages = paginate(&html, Some(&by_text), &options);

    assert_eq!(contents(&pages), vec!["<p>100</p><p>200</p>", "<p>300</p>"]);
    assert_eq!(pages[0].height, Some(300.0));
    assert_eq!(pages[1].number, 2);
}

#[test]
fn test_overflow_gives_one_block_per_page() {
    let html = "<p>600</p><p>600</p><p>600</p>";
    let options = PaginateOptions::new().with_capacity(1050.0);
    let pages = paginate(html, Some(&by_text), &options);

    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|p| p.block_count == 1));
    assert_eq!(
        pages.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn test_pages_reproduce_editor_content() {
    let mut html = String::new();
    for i in 0..40 {
        html.push_str(&format!(
            "<h2>Clause {}</h2><p>{}</p>",
            i,
            "The tenant shall keep the premises in good repair. ".repeat(i % 7 + 1)
        ));
        if i % 15 == 14 {
            html.push_str(PAGE_BREAK_HTML);
        }
    }
    let editor = Editor::from_html(&html, &ParseOptions::default()).unwrap();
    let serialized = editor.serialize();

    let measurer = TextMetricsMeasurer::default();
    let pages = paginate(&serialized, Some(&measurer), &PaginateOptions::default());

    assert!(pages.len() > 3);
    assert!(pages_round_trip(&serialized, &pages));
    let capacity = PaginateOptions::default().capacity();
    for page in pages.iter().filter(|p| p.block_count > 1) {
        assert!(page.height.unwrap_or(f32::MAX) <= capacity);
    }
    // two manual breaks give three segments
    assert_eq!(pages.last().map(|p| p.segment), Some(2));
}

#[test]
fn test_manual_only_fallback() {
    let html = format!("<p>a</p>{}<p>b</p><p>c</p>", PAGE_BREAK_HTML);
    let unavailable = |_: &str| None::<f32>;
    let options = PaginateOptions::new();

    let pages = paginate(&html, Some(&unavailable), &options);
    assert_eq!(pages, paginate_manual(&html));
    assert!(pages.iter().all(|p| !p.is_measured()));
    assert_eq!(split_blocks(&pages[1].content).len(), 2);

    let err = paginate_strict(&html, &unavailable, &options).unwrap_err();
    assert!(matches!(err, Error::MeasurementUnavailable(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_paginator_reports_changes_through_editor() {
    let mut editor = Editor::from_html("<p>600</p><p>300</p>", &ParseOptions::default()).unwrap();
    let mut paginator = Paginator::new(PaginateOptions::new().with_capacity(1050.0));
    let measurer: &dyn HeightMeasurer = &by_text;

    assert!(editor.paginate(&mut paginator, Some(measurer)));
    assert_eq!(editor.pages().len(), 1);
    assert!(!editor.paginate(&mut paginator, Some(measurer)));

    // "<p>300</p>" becomes "<p>3000</p>" and no longer fits
    editor
        .apply(folio::EditOp::InsertText {
            pos: 9,
            text: "0".to_string(),
        })
        .unwrap();
    assert!(!editor.pages_current());
    assert!(editor.paginate(&mut paginator, Some(measurer)));
    assert_eq!(editor.pages().len(), 2);
    assert_eq!(editor.pages_version(), 1);
}

#[test]
fn test_worker_results_for_old_versions_are_discarded() {
    let measurer: Arc<dyn HeightMeasurer> = Arc::new(TextMetricsMeasurer::default());
    let worker = PaginationWorker::spawn(measurer, PaginateOptions::default());
    let mut editor = Editor::from_html("<h1>Intro</h1><p>text</p>", &ParseOptions::default()).unwrap();

    editor.request_pages(&worker).unwrap();
    let stale = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(stale.version, 0);

    editor.insert_page_break(7).unwrap();
    assert!(!editor.accept_pages(stale));
    assert!(editor.pages().is_empty());

    editor.request_pages(&worker).unwrap();
    let fresh = worker.wait_latest(Duration::from_secs(5)).unwrap();
    assert!(editor.accept_pages(fresh));
    assert!(editor.pages_current());
    assert_eq!(editor.pages().len(), 2);
}

#[test]
fn test_break_inside_quote_cuts_between_blocks() {
    let html = format!(
        "<blockquote><p>a</p>{}<p>b</p></blockquote><p>c</p>",
        PAGE_BREAK_HTML
    );
    let editor = Editor::from_html(&html, &ParseOptions::default()).unwrap();
    let pages = paginate_manual(&editor.serialize());

    assert_eq!(
        contents(&pages),
        vec![
            "<blockquote><p>a</p></blockquote>",
            "<blockquote><p>b</p></blockquote><p>c</p>"
        ]
    );
}
