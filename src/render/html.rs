//! HTML serialization of documents.
//!
//! The output is the flattened content stream consumed by pagination. It
//! contains no whitespace between blocks, so splitting it at top-level
//! element boundaries and concatenating the pieces reproduces it exactly.

use crate::model::{anchor_id, Document, Node, NodeKind, TextRun};

use super::HtmlOptions;

/// Serialized form of a page-break node.
pub const PAGE_BREAK_HTML: &str = r#"<div data-type="page-break" class="page-break"></div>"#;

/// Serialize a document to HTML.
pub fn to_html(doc: &Document, options: &HtmlOptions) -> String {
    HtmlRenderer::new(options.clone()).render(doc)
}

/// Serialize a list of nodes (no anchors, positions start at 0).
pub fn nodes_to_html(nodes: &[Node]) -> String {
    let renderer = HtmlRenderer::new(HtmlOptions::default());
    let mut output = String::new();
    let mut pos = 0;
    for node in nodes {
        renderer.render_node(&mut output, node, pos);
        pos += node.size();
    }
    output
}

/// HTML renderer.
pub struct HtmlRenderer {
    options: HtmlOptions,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    /// Render a document to HTML.
    pub fn render(&self, doc: &Document) -> String {
        let mut output = String::new();
        let mut pos = 0;
        for node in &doc.content {
            self.render_node(&mut output, node, pos);
            pos += node.size();
        }
        output
    }

    fn render_node(&self, output: &mut String, node: &Node, pos: usize) {
        match node.kind {
            NodeKind::Heading { level } => {
                if self.options.anchors && level <= self.options.anchor_max_level {
                    output.push_str(&format!("<h{} id=\"{}\">", level, anchor_id(pos)));
                } else {
                    output.push_str(&format!("<h{}>", level));
                }
                self.render_runs(output, &node.runs, false);
                output.push_str(&format!("</h{}>", level));
            }
            NodeKind::Paragraph => {
                output.push_str("<p>");
                self.render_runs(output, &node.runs, false);
                output.push_str("</p>");
            }
            NodeKind::CodeBlock => {
                output.push_str("<pre><code>");
                self.render_runs(output, &node.runs, true);
                output.push_str("</code></pre>");
            }
            NodeKind::PageBreak => output.push_str(PAGE_BREAK_HTML),
            NodeKind::HorizontalRule => output.push_str("<hr>"),
            NodeKind::Blockquote => self.render_container(output, node, pos, "<blockquote>", "</blockquote>"),
            NodeKind::BulletList => self.render_container(output, node, pos, "<ul>", "</ul>"),
            NodeKind::OrderedList { start } => {
                let open = if start == 1 {
                    "<ol>".to_string()
                } else {
                    format!("<ol start=\"{}\">", start)
                };
                self.render_container(output, node, pos, &open, "</ol>");
            }
            NodeKind::ListItem => self.render_container(output, node, pos, "<li>", "</li>"),
        }
    }

    fn render_container(&self, output: &mut String, node: &Node, pos: usize, open: &str, close: &str) {
        output.push_str(open);
        let mut child_pos = pos + 1;
        for child in &node.children {
            self.render_node(output, child, child_pos);
            child_pos += child.size();
        }
        output.push_str(close);
    }

    fn render_runs(&self, output: &mut String, runs: &[TextRun], code: bool) {
        for run in runs {
            let tags = mark_tags(run, code);
            for tag in &tags {
                output.push('<');
                output.push_str(tag);
                output.push('>');
            }
            if code {
                output.push_str(&escape_html(&run.text));
            } else {
                output.push_str(&escape_html(&run.text).replace('\n', "<br>"));
            }
            for tag in tags.iter().rev() {
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
        }
    }
}

fn mark_tags(run: &TextRun, code_block: bool) -> Vec<&'static str> {
    let style = &run.style;
    let mut tags = Vec::new();
    if style.bold {
        tags.push("strong");
    }
    if style.italic {
        tags.push("em");
    }
    if style.underline {
        tags.push("u");
    }
    if style.strike {
        tags.push("s");
    }
    if style.code && !code_block {
        tags.push("code");
    }
    if style.inserted {
        tags.push("ins");
    }
    if style.deleted {
        tags.push("del");
    }
    tags
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mark, TextRun};
    use crate::parser::{parse_html, ParseOptions};

    fn sample() -> Document {
        Document::from_nodes(vec![
            Node::heading("Intro", 1),
            Node::paragraph("text"),
            Node::page_break(),
            Node::heading("Terms", 1),
            Node::paragraph("text2"),
        ])
    }

    #[test]
    fn test_to_html() {
        let html = to_html(&sample(), &HtmlOptions::default());
        assert_eq!(
            html,
            "<h1>Intro</h1><p>text</p><div data-type=\"page-break\" class=\"page-break\"></div><h1>Terms</h1><p>text2</p>"
        );
    }

    #[test]
    fn test_to_html_with_anchors() {
        let options = HtmlOptions::new().with_anchors(true);
        let html = to_html(&sample(), &options);
        assert!(html.starts_with("<h1 id=\"heading-0\">Intro</h1>"));
        assert!(html.contains("<h1 id=\"heading-14\">Terms</h1>"));
    }

    #[test]
    fn test_marks_and_escaping() {
        let mut p = Node::paragraph("");
        p.runs = vec![
            TextRun::new("A & B "),
            TextRun::bold("<bold>"),
            TextRun::marked("new", Mark::Inserted),
        ];
        let html = nodes_to_html(&[p]);
        assert_eq!(
            html,
            "<p>A &amp; B <strong>&lt;bold&gt;</strong><ins>new</ins></p>"
        );
    }

    #[test]
    fn test_html_parse_round_trip() {
        let html = "<h2>Scope</h2><ol start=\"3\"><li><p>one</p></li></ol><blockquote><p>q <em>x</em></p></blockquote><hr><pre><code>a  b</code></pre>";
        let doc = parse_html(html, &ParseOptions::default()).unwrap();
        assert_eq!(to_html(&doc, &HtmlOptions::default()), html);
    }
}
