//! HTML to document tree parser.
//!
//! Accepts the markup produced by rich-text editors (headings, paragraphs,
//! lists, block quotes, code blocks, rules, page-break markers and inline
//! marks). Anything else is rejected in strict mode and flattened into
//! paragraphs in lenient mode.

use regex::Regex;
use std::sync::OnceLock;

use super::tokenizer::{attr, decode_entities, is_void, tokenize, Token, TokenKind};
use super::ParseOptions;
use crate::error::{Error, Result};
use crate::model::{Document, Mark, Metadata, Node, NodeKind, TextRun, TextStyle};

/// Parse an HTML document into a [`Document`].
pub fn parse_html(input: &str, options: &ParseOptions) -> Result<Document> {
    let mut parser = HtmlParser::new(input, options);
    let content = parser.parse_blocks(None)?;
    let title = options.title.clone().or(parser.title);
    log::debug!("parsed {} top-level blocks", content.len());
    Ok(Document {
        metadata: Metadata {
            title,
            ..Default::default()
        },
        content,
    })
}

/// Parse an HTML fragment into top-level nodes.
pub fn parse_fragment(input: &str, options: &ParseOptions) -> Result<Vec<Node>> {
    HtmlParser::new(input, options).parse_blocks(None)
}

/// Check whether an opening tag's attributes mark a page break.
pub(crate) fn is_page_break_attrs(attrs: &str) -> bool {
    attr(attrs, "data-type").is_some_and(|v| v == "page-break")
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Heading(u8),
    Paragraph,
    Pre,
    Div,
    Rule,
    Container(NodeKind),
    Inline(Option<Mark>),
    Break,
    Title,
    Head,
    Skip,
    Transparent,
    Unknown,
}

fn classify(name: &str, attrs: &str) -> Tag {
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            Tag::Heading(name[1..].parse().unwrap_or(1))
        }
        "p" => Tag::Paragraph,
        "pre" => Tag::Pre,
        "div" => Tag::Div,
        "hr" => Tag::Rule,
        "blockquote" => Tag::Container(NodeKind::Blockquote),
        "ul" => Tag::Container(NodeKind::BulletList),
        "ol" => Tag::Container(NodeKind::OrderedList {
            start: attr(attrs, "start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1),
        }),
        "li" => Tag::Container(NodeKind::ListItem),
        "strong" | "b" => Tag::Inline(Some(Mark::Bold)),
        "em" | "i" => Tag::Inline(Some(Mark::Italic)),
        "u" => Tag::Inline(Some(Mark::Underline)),
        "s" | "strike" => Tag::Inline(Some(Mark::Strike)),
        "code" => Tag::Inline(Some(Mark::Code)),
        "ins" => Tag::Inline(Some(Mark::Inserted)),
        "del" => Tag::Inline(Some(Mark::Deleted)),
        "span" | "a" | "mark" | "sub" | "sup" | "small" | "label" => Tag::Inline(None),
        "br" => Tag::Break,
        "title" => Tag::Title,
        "head" => Tag::Head,
        "script" | "style" | "template" | "noscript" => Tag::Skip,
        "html" | "body" | "main" | "article" | "section" | "header" | "footer" | "aside"
        | "nav" => Tag::Transparent,
        _ => Tag::Unknown,
    }
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\r\n\x0C]+").expect("whitespace pattern is valid"))
}

struct HtmlParser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    options: &'a ParseOptions,
    title: Option<String>,
}

impl<'a> HtmlParser<'a> {
    fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            input,
            tokens: tokenize(input),
            pos: 0,
            options,
            title: None,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Report malformed markup: an error in strict mode, a log line otherwise.
    fn unexpected(&self, message: String) -> Result<()> {
        if self.options.is_lenient() {
            log::debug!("lenient HTML recovery: {}", message);
            Ok(())
        } else {
            Err(Error::Parse(message))
        }
    }

    fn text_of(&self, token: &Token, preserve: bool) -> String {
        let decoded = decode_entities(token.source(self.input));
        if preserve || self.options.preserve_whitespace {
            decoded.into_owned()
        } else {
            whitespace_regex().replace_all(&decoded, " ").into_owned()
        }
    }

    fn parse_blocks(&mut self, until: Option<&str>) -> Result<Vec<Node>> {
        let mut blocks = Vec::new();

        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Close { name } => {
                    self.pos += 1;
                    if until == Some(name.as_str()) {
                        return Ok(blocks);
                    }
                    self.unexpected(format!("unexpected </{}>", name))?;
                }
                TokenKind::Comment => self.pos += 1,
                TokenKind::Text => {
                    if token.source(self.input).trim().is_empty() {
                        self.pos += 1;
                    } else {
                        blocks.push(self.implicit_paragraph()?);
                    }
                }
                TokenKind::Open {
                    name,
                    attrs,
                    self_closing,
                } => {
                    let closed = self_closing || is_void(&name);
                    match classify(&name, &attrs) {
                        Tag::Inline(_) | Tag::Break => blocks.push(self.implicit_paragraph()?),
                        Tag::Heading(level) => {
                            self.pos += 1;
                            let runs = self.inline_content(&name, closed, false)?;
                            blocks.push(finish_textblock(NodeKind::heading(level), runs));
                        }
                        Tag::Paragraph => {
                            self.pos += 1;
                            let runs = self.inline_content(&name, closed, false)?;
                            blocks.push(finish_textblock(NodeKind::Paragraph, runs));
                        }
                        Tag::Pre => {
                            self.pos += 1;
                            let mut runs = self.inline_content(&name, closed, true)?;
                            for run in &mut runs {
                                run.style.set(Mark::Code, false);
                            }
                            let mut node = Node::new(NodeKind::CodeBlock);
                            node.runs = runs;
                            node.normalize_runs();
                            blocks.push(node);
                        }
                        Tag::Div => {
                            self.pos += 1;
                            if is_page_break_attrs(&attrs) {
                                if !closed {
                                    self.skip_until(&name)?;
                                }
                                blocks.push(Node::page_break());
                            } else if !closed {
                                blocks.extend(self.parse_blocks(Some(&name))?);
                            }
                        }
                        Tag::Rule => {
                            self.pos += 1;
                            blocks.push(Node::horizontal_rule());
                        }
                        Tag::Container(kind) => {
                            self.pos += 1;
                            let children = if closed {
                                Vec::new()
                            } else {
                                self.parse_blocks(Some(&name))?
                            };
                            blocks.extend(build_container(kind, children));
                        }
                        Tag::Title => {
                            self.pos += 1;
                            if !closed {
                                let runs = self.inline_content(&name, false, false)?;
                                let title: String = runs.iter().map(|r| r.text.as_str()).collect();
                                self.title = Some(title.trim().to_string());
                            }
                        }
                        Tag::Head => {
                            self.pos += 1;
                            if !closed {
                                self.parse_head()?;
                            }
                        }
                        Tag::Skip => {
                            self.pos += 1;
                            if !closed {
                                self.skip_until(&name)?;
                            }
                        }
                        Tag::Transparent => {
                            self.pos += 1;
                            if !closed {
                                blocks.extend(self.parse_blocks(Some(&name))?);
                            }
                        }
                        Tag::Unknown => {
                            self.unexpected(format!("unsupported element <{}>", name))?;
                            self.pos += 1;
                            if !closed {
                                blocks.extend(self.parse_blocks(Some(&name))?);
                            }
                        }
                    }
                }
            }
        }

        if let Some(name) = until {
            self.unexpected(format!("unclosed <{}>", name))?;
        }
        Ok(blocks)
    }

    /// Collect inline content not wrapped in a block element.
    fn implicit_paragraph(&mut self) -> Result<Node> {
        let mut runs = Vec::new();
        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Text => {
                    runs.push(TextRun::new(self.text_of(&token, false)));
                    self.pos += 1;
                }
                TokenKind::Comment => self.pos += 1,
                TokenKind::Open {
                    name,
                    attrs,
                    self_closing,
                } => match classify(&name, &attrs) {
                    Tag::Break => {
                        self.pos += 1;
                        runs.push(TextRun::new("\n"));
                    }
                    Tag::Inline(mark) => {
                        self.pos += 1;
                        let mut style = TextStyle::default();
                        if let Some(mark) = mark {
                            style.set(mark, true);
                        }
                        if !self_closing {
                            runs.extend(self.parse_inline(&name, style, false)?);
                        }
                    }
                    _ => break,
                },
                TokenKind::Close { .. } => break,
            }
        }
        Ok(finish_textblock(NodeKind::Paragraph, runs))
    }

    fn inline_content(&mut self, until: &str, closed: bool, preserve: bool) -> Result<Vec<TextRun>> {
        if closed {
            return Ok(Vec::new());
        }
        self.parse_inline(until, TextStyle::default(), preserve)
    }

    fn parse_inline(&mut self, until: &str, style: TextStyle, preserve: bool) -> Result<Vec<TextRun>> {
        let mut runs = Vec::new();

        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Text => {
                    runs.push(TextRun {
                        text: self.text_of(&token, preserve),
                        style: style.clone(),
                    });
                    self.pos += 1;
                }
                TokenKind::Comment => self.pos += 1,
                TokenKind::Close { name } => {
                    if name == until {
                        self.pos += 1;
                        return Ok(runs);
                    }
                    if matches!(classify(&name, ""), Tag::Inline(_)) {
                        self.pos += 1;
                        self.unexpected(format!("stray </{}> inside <{}>", name, until))?;
                        continue;
                    }
                    // A block closes around us; leave the token for the caller.
                    self.unexpected(format!("unclosed <{}>", until))?;
                    return Ok(runs);
                }
                TokenKind::Open {
                    name,
                    attrs,
                    self_closing,
                } => match classify(&name, &attrs) {
                    Tag::Break => {
                        self.pos += 1;
                        runs.push(TextRun {
                            text: "\n".to_string(),
                            style: style.clone(),
                        });
                    }
                    Tag::Inline(mark) => {
                        self.pos += 1;
                        let mut inner = style.clone();
                        if let Some(mark) = mark {
                            inner.set(mark, true);
                        }
                        if !self_closing {
                            runs.extend(self.parse_inline(&name, inner, preserve)?);
                        }
                    }
                    _ => {
                        self.unexpected(format!("<{}> inside <{}>", name, until))?;
                        return Ok(runs);
                    }
                },
            }
        }

        self.unexpected(format!("unclosed <{}>", until))?;
        Ok(runs)
    }

    /// Read the document title out of `<head>` and skip everything else.
    fn parse_head(&mut self) -> Result<()> {
        while let Some(token) = self.peek().cloned() {
            self.pos += 1;
            match token.kind {
                TokenKind::Close { ref name } if name == "head" => return Ok(()),
                TokenKind::Open {
                    ref name,
                    self_closing: false,
                    ..
                } if name == "title" => {
                    let runs = self.parse_inline("title", TextStyle::default(), false)?;
                    let title: String = runs.iter().map(|r| r.text.as_str()).collect();
                    self.title = Some(title.trim().to_string());
                }
                TokenKind::Open {
                    ref name,
                    self_closing: false,
                    ..
                } if !is_void(name) => self.skip_until(name)?,
                _ => {}
            }
        }
        self.unexpected("unclosed <head>".to_string())
    }

    /// Skip tokens up to and including the matching close tag.
    fn skip_until(&mut self, name: &str) -> Result<()> {
        let mut depth = 0usize;
        while let Some(token) = self.peek().cloned() {
            self.pos += 1;
            match token.kind {
                TokenKind::Open {
                    name: ref open,
                    self_closing: false,
                    ..
                } if open == name => depth += 1,
                TokenKind::Close { name: ref close } if close == name => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        self.unexpected(format!("unclosed <{}>", name))
    }
}

/// Trim the outer whitespace of a textblock and merge its runs.
fn finish_textblock(kind: NodeKind, mut runs: Vec<TextRun>) -> Node {
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start_matches(' ').to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
    let mut node = Node::new(kind);
    node.runs = runs;
    node.normalize_runs();
    node
}

/// Build a container, repairing children the schema does not allow.
/// Build a container, hoisting page breaks out of it.
///
/// Page breaks only live at the top level, so a break found inside a
/// container splits it into two containers of the same kind with the break
/// between them. Breaks hoisted from nested containers arrive here as direct
/// children and split this level in turn.
fn build_container(kind: NodeKind, children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(|c| c.kind == NodeKind::PageBreak) {
        return vec![wrap_container(kind, children)];
    }

    log::debug!("hoisting page break out of <{}>", kind.name());
    let mut out = Vec::new();
    let mut group = Vec::new();
    let mut kind = kind;
    for child in children {
        if child.kind == NodeKind::PageBreak {
            if !group.is_empty() {
                let part = wrap_container(kind, std::mem::take(&mut group));
                kind = continued(kind, &part);
                out.push(part);
            }
            out.push(child);
        } else {
            group.push(child);
        }
    }
    if !group.is_empty() {
        out.push(wrap_container(kind, group));
    }
    out
}

/// Kind of the container continuing `part` after a hoisted break.
fn continued(kind: NodeKind, part: &Node) -> NodeKind {
    match kind {
        NodeKind::OrderedList { start } => NodeKind::OrderedList {
            start: start.saturating_add(part.children.len() as u32),
        },
        other => other,
    }
}

fn wrap_container(kind: NodeKind, children: Vec<Node>) -> Node {
    let is_list = matches!(kind, NodeKind::BulletList | NodeKind::OrderedList { .. });
    let mut children: Vec<Node> = if is_list {
        children
            .into_iter()
            .map(|child| {
                if child.kind == NodeKind::ListItem {
                    child
                } else {
                    Node::container(NodeKind::ListItem, vec![child])
                }
            })
            .collect()
    } else {
        children
            .into_iter()
            .filter(|child| child.kind != NodeKind::ListItem)
            .collect()
    };
    if children.is_empty() {
        let filler = if is_list {
            Node::container(NodeKind::ListItem, vec![Node::paragraph("")])
        } else {
            Node::paragraph("")
        };
        children.push(filler);
    }
    Node::container(kind, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn test_parse_headings_and_paragraphs() {
        let doc = parse_html("<h1>Intro</h1><p>text</p><h2>Terms</h2>", &strict()).unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.content[0], Node::heading("Intro", 1));
        assert_eq!(doc.content[1], Node::paragraph("text"));
        assert_eq!(doc.content[2].kind.heading_level(), Some(2));
    }

    #[test]
    fn test_parse_page_break_marker() {
        let html = r#"<p>a</p><div data-type="page-break" class="page-break"></div><p>b</p>"#;
        let doc = parse_html(html, &strict()).unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.content[1].kind, NodeKind::PageBreak);
    }

    #[test]
    fn test_nested_page_break_is_hoisted() {
        let html = r#"<blockquote><p>a</p><div data-type="page-break"></div><p>b</p></blockquote><p>c</p>"#;
        let doc = parse_html(html, &strict()).unwrap();
        let kinds: Vec<NodeKind> = doc.content.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Blockquote,
                NodeKind::PageBreak,
                NodeKind::Blockquote,
                NodeKind::Paragraph
            ]
        );
        assert_eq!(doc.content[0].children, vec![Node::paragraph("a")]);
        assert_eq!(doc.content[2].children, vec![Node::paragraph("b")]);
    }

    #[test]
    fn test_page_break_in_list_item_splits_list() {
        let html = r#"<ol start="2"><li><p>one</p></li><li><p>two</p><div data-type="page-break"></div><p>more</p></li><li><p>three</p></li></ol>"#;
        let doc = parse_html(html, &strict()).unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.content[0].kind, NodeKind::OrderedList { start: 2 });
        assert_eq!(doc.content[0].children.len(), 2);
        assert_eq!(doc.content[1].kind, NodeKind::PageBreak);
        assert_eq!(doc.content[2].kind, NodeKind::OrderedList { start: 4 });
        assert_eq!(doc.content[2].children[0].children[0], Node::paragraph("more"));
        assert_eq!(doc.content[2].children[1].children[0], Node::paragraph("three"));
    }

    #[test]
    fn test_parse_inline_marks() {
        let doc = parse_html("<p>The <strong>Parties</strong> <em>agree</em></p>", &strict()).unwrap();
        let p = &doc.content[0];
        assert_eq!(p.text_content(), "The Parties agree");
        assert!(p.runs[1].style.bold);
        assert!(p.runs[3].style.italic);
    }

    #[test]
    fn test_parse_lists_and_quotes() {
        let html = "<ul><li><p>one</p></li><li>two</li></ul><blockquote><p>q</p></blockquote>";
        let doc = parse_html(html, &strict()).unwrap();
        assert_eq!(doc.block_count(), 2);
        let list = &doc.content[0];
        assert_eq!(list.kind, NodeKind::BulletList);
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.children[1].children[0], Node::paragraph("two"));
        assert_eq!(doc.content[1].kind, NodeKind::Blockquote);
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let doc = parse_html("<p>\n  The   party\n</p>", &strict()).unwrap();
        assert_eq!(doc.content[0].text_content(), "The party");
    }

    #[test]
    fn test_parse_code_block_keeps_whitespace() {
        let doc = parse_html("<pre><code>a  b\nc</code></pre>", &strict()).unwrap();
        assert_eq!(doc.content[0].kind, NodeKind::CodeBlock);
        assert_eq!(doc.content[0].text_content(), "a  b\nc");
        assert!(!doc.content[0].runs[0].style.code);
    }

    #[test]
    fn test_strict_rejects_unknown_elements() {
        let result = parse_html("<table><tr><td>x</td></tr></table>", &strict());
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_lenient_flattens_unknown_elements() {
        let options = ParseOptions::new().lenient();
        let doc = parse_html("<table><tr><td>x</td></tr></table><p>y", &options).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.content[0].text_content(), "x");
        assert_eq!(doc.content[1].text_content(), "y");
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        let doc = parse_html("Hello <b>world</b><p>next</p>", &strict()).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.content[0].text_content(), "Hello world");
    }

    #[test]
    fn test_title_extraction() {
        let html = "<html><head><title> NDA </title></head><body><p>x</p></body></html>";
        let doc = parse_html(html, &strict()).unwrap();
        assert_eq!(doc.metadata.title.as_deref(), Some("NDA"));
        assert_eq!(doc.block_count(), 1);
    }
}
