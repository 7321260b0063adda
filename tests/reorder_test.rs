//! Integration tests for section reordering.

use folio::{Direction, Editor, Error, ParseOptions};

const CONTRACT: &str = "<p>This agreement is made between the parties.</p>\
<h1>Definitions</h1><p>Terms used here.</p><ul><li><p>Lessor</p></li><li><p>Lessee</p></li></ul>\
<h2>Interpretation</h2><p>Headings are for reference.</p>\
<h1>Payment</h1><p>Rent is due monthly.</p><div data-type=\"page-break\" class=\"page-break\"></div>\
<h1>Termination</h1><p>Thirty days notice.</p><h4>Note</h4><p>Not an outline entry.</p>";

fn editor() -> Editor {
    Editor::from_html(CONTRACT, &ParseOptions::default()).unwrap()
}

fn titles(editor: &Editor) -> Vec<String> {
    editor.outline().iter().map(|e| e.text.clone()).collect()
}

#[test]
fn test_sections_cover_outline() {
    let editor = editor();
    let sections = editor.sections();

    assert_eq!(sections.len(), 4);
    assert_eq!(titles(&editor), vec!["Definitions", "Interpretation", "Payment", "Termination"]);
    assert!(sections.windows(2).all(|w| w[0].end == w[1].start));
    assert_eq!(sections[3].end, editor.tree().content_size());
    // the preamble paragraph belongs to no section
    assert!(sections[0].start > 0);
}

#[test]
fn test_move_down_swaps_neighbours() {
    let mut editor = editor();
    let size = editor.tree().content_size();

    let version = editor.move_section(2, Direction::Down).unwrap();
    assert_eq!(version, 1);
    assert_eq!(titles(&editor), vec!["Definitions", "Interpretation", "Termination", "Payment"]);
    assert_eq!(editor.tree().content_size(), size);

    // the page break travels with the section that contains it
    let html = editor.serialize();
    let termination = html.find("<h1>Termination</h1>").unwrap();
    let payment = html.find("<h1>Payment</h1>").unwrap();
    let page_break = html.find("data-type=\"page-break\"").unwrap();
    assert!(termination < payment && payment < page_break);
}

#[test]
fn test_move_up_then_down_restores_document() {
    for index in 1..4 {
        let mut editor = editor();
        let original = editor.serialize();

        editor.move_section(index, Direction::Up).unwrap();
        assert_ne!(editor.serialize(), original);
        editor.move_section(index - 1, Direction::Down).unwrap();

        assert_eq!(editor.serialize(), original, "section {}", index);
        assert_eq!(editor.version(), 2);
    }
}

#[test]
fn test_move_preserves_block_multiset() {
    let mut editor = editor();
    let mut before: Vec<String> = editor.tree().content.iter().map(|n| n.plain_text()).collect();

    editor.move_section(1, Direction::Up).unwrap();
    let mut after: Vec<String> = editor.tree().content.iter().map(|n| n.plain_text()).collect();

    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn test_boundary_moves_rejected() {
    let mut editor = editor();
    let original = editor.serialize();

    for (index, direction) in [(0, Direction::Up), (3, Direction::Down), (4, Direction::Up)] {
        let err = editor.move_section(index, direction).unwrap_err();
        assert!(matches!(err, Error::Index { .. }), "{} {}", index, direction);
        assert!(err.is_structural());
    }

    assert_eq!(editor.serialize(), original);
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_nested_heading_rejected() {
    let html = "<h1>Intro</h1><p>text</p><blockquote><h2>Quoted</h2><p>q</p></blockquote><h1>End</h1>";
    let mut editor = Editor::from_html(html, &ParseOptions::default()).unwrap();
    assert_eq!(editor.outline().len(), 3);

    let err = editor.move_section(1, Direction::Up).unwrap_err();
    assert!(matches!(err, Error::Range(_)));
    assert_eq!(editor.serialize(), html);
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_single_section_cannot_move() {
    let mut editor = Editor::from_html("<h1>Only</h1><p>body</p>", &ParseOptions::default()).unwrap();
    assert!(editor.move_section(0, Direction::Down).is_err());
    assert!(editor.move_section(0, Direction::Up).is_err());

    let mut empty = Editor::from_html("<p>no headings</p>", &ParseOptions::default()).unwrap();
    assert!(matches!(
        empty.move_section(0, Direction::Down),
        Err(Error::Index { len: 0, .. })
    ));
}
