//! Manual break splitting and the top-level block scanner.
//!
//! Both functions return borrowed slices of their input. Concatenating the
//! manual segments reproduces the input minus the break markers, and
//! concatenating the blocks of a segment reproduces the segment exactly.

use regex::Regex;
use std::sync::OnceLock;

use crate::parser::tokenizer::{self, TokenKind};

fn break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<div data-type="page-break"[^>]*></div>"#)
            .expect("page break pattern is valid")
    })
}

/// Split serialized content at every page-break marker.
///
/// `k` markers always yield `k + 1` segments; segments may be empty.
pub fn split_manual(html: &str) -> Vec<&str> {
    break_regex().split(html).collect()
}

/// Number of page-break markers in serialized content.
pub fn count_breaks(html: &str) -> usize {
    break_regex().find_iter(html).count()
}

/// Remove every page-break marker from serialized content.
pub fn strip_breaks(html: &str) -> String {
    break_regex().replace_all(html, "").into_owned()
}

/// Split a segment into its top-level blocks.
///
/// Whitespace and comments between blocks belong to the following block;
/// trailing whitespace belongs to the last block. A segment that contains
/// only whitespace is a single block, an empty segment has none.
pub fn split_blocks(segment: &str) -> Vec<&str> {
    let mut ends = Vec::new();
    let mut depth = 0usize;

    for token in tokenizer::tokenize(segment) {
        match &token.kind {
            TokenKind::Open {
                name, self_closing, ..
            } => {
                if *self_closing || tokenizer::is_void(name) {
                    if depth == 0 {
                        ends.push(token.end);
                    }
                } else {
                    depth += 1;
                }
            }
            TokenKind::Close { .. } => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        ends.push(token.end);
                    }
                }
            }
            TokenKind::Text => {
                if depth == 0 && !token.source(segment).trim().is_empty() {
                    ends.push(token.end);
                }
            }
            TokenKind::Comment => {}
        }
    }

    match ends.last_mut() {
        Some(last) => *last = segment.len(),
        None if !segment.is_empty() => ends.push(segment.len()),
        None => {}
    }

    let mut blocks = Vec::with_capacity(ends.len());
    let mut start = 0;
    for end in ends {
        blocks.push(&segment[start..end]);
        start = end;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_manual() {
        let html = r#"<p>a</p><div data-type="page-break" class="page-break"></div><p>b</p>"#;
        assert_eq!(split_manual(html), vec!["<p>a</p>", "<p>b</p>"]);
        assert_eq!(count_breaks(html), 1);
        assert_eq!(strip_breaks(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_split_manual_edges() {
        let marker = r#"<div data-type="page-break"></div>"#;
        assert_eq!(split_manual(""), vec![""]);
        let html = format!("{}<p>x</p>{}", marker, marker);
        assert_eq!(split_manual(&html), vec!["", "<p>x</p>", ""]);
    }

    #[test]
    fn test_split_blocks() {
        let segment = "<h1>Intro</h1><p>a <strong>b</strong></p><ul><li><p>x</p></li></ul><hr>";
        let blocks = split_blocks(segment);
        assert_eq!(
            blocks,
            vec![
                "<h1>Intro</h1>",
                "<p>a <strong>b</strong></p>",
                "<ul><li><p>x</p></li></ul>",
                "<hr>",
            ]
        );
    }

    #[test]
    fn test_split_blocks_whitespace_attachment() {
        let segment = "\n  <p>a</p>\n<!-- c --><p>b</p>\n";
        let blocks = split_blocks(segment);
        assert_eq!(blocks, vec!["\n  <p>a</p>", "\n<!-- c --><p>b</p>\n"]);
        assert_eq!(blocks.concat(), segment);
    }

    #[test]
    fn test_split_blocks_bare_text_and_empty() {
        assert_eq!(split_blocks("loose text<p>p</p>"), vec!["loose text", "<p>p</p>"]);
        assert!(split_blocks("").is_empty());
        assert_eq!(split_blocks("  "), vec!["  "]);
    }
}
