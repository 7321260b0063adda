//! Node and text-level types.

use serde::{Deserialize, Serialize};

/// The type tag of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
    },

    /// A paragraph of text
    Paragraph,

    /// A preformatted code block
    CodeBlock,

    /// A block quotation containing other blocks
    Blockquote,

    /// An unordered list of list items
    BulletList,

    /// An ordered list of list items
    OrderedList {
        /// Number of the first item
        start: u32,
    },

    /// A list item containing other blocks
    ListItem,

    /// An explicit page break marker
    PageBreak,

    /// A horizontal rule / separator
    HorizontalRule,
}

impl NodeKind {
    /// Create a heading kind with the level clamped to 1-6.
    pub fn heading(level: u8) -> Self {
        NodeKind::Heading {
            level: level.clamp(1, 6),
        }
    }

    /// Check if this kind holds inline text.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            NodeKind::Heading { .. } | NodeKind::Paragraph | NodeKind::CodeBlock
        )
    }

    /// Check if this kind holds child blocks.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Blockquote
                | NodeKind::BulletList
                | NodeKind::OrderedList { .. }
                | NodeKind::ListItem
        )
    }

    /// Check if this kind is an atom (no content, size 1).
    pub fn is_atom(&self) -> bool {
        matches!(self, NodeKind::PageBreak | NodeKind::HorizontalRule)
    }

    /// Get the heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NodeKind::Heading { level } => Some(*level),
            _ => None,
        }
    }

    /// Short human-readable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Blockquote => "blockquote",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList { .. } => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::PageBreak => "page_break",
            NodeKind::HorizontalRule => "horizontal_rule",
        }
    }
}

/// A node of the document tree.
///
/// Textblocks carry `runs`, containers carry `children`, atoms carry neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type
    pub kind: NodeKind,

    /// Inline text runs (textblocks only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<TextRun>,

    /// Child blocks (containers only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            runs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a textblock of the given kind holding plain text.
    pub fn textblock(kind: NodeKind, text: impl Into<String>) -> Self {
        let mut node = Self::new(kind);
        let text = text.into();
        if !text.is_empty() {
            node.runs.push(TextRun::new(text));
        }
        node
    }

    /// Create a heading.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::textblock(NodeKind::heading(level), text)
    }

    /// Create a paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::textblock(NodeKind::Paragraph, text)
    }

    /// Create a code block.
    pub fn code_block(text: impl Into<String>) -> Self {
        Self::textblock(NodeKind::CodeBlock, text)
    }

    /// Create a page break marker.
    pub fn page_break() -> Self {
        Self::new(NodeKind::PageBreak)
    }

    /// Create a horizontal rule.
    pub fn horizontal_rule() -> Self {
        Self::new(NodeKind::HorizontalRule)
    }

    /// Create a container node with the given children.
    pub fn container(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            runs: Vec::new(),
            children,
        }
    }

    /// Create a bullet list from paragraphs of text.
    pub fn bullet_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        let items = items
            .into_iter()
            .map(|text| Self::container(NodeKind::ListItem, vec![Self::paragraph(text)]))
            .collect();
        Self::container(NodeKind::BulletList, items)
    }

    /// Size of this node in the position space.
    ///
    /// Atoms take one position, textblocks take their text length plus an
    /// open and close token, containers their children plus two tokens.
    pub fn size(&self) -> usize {
        if self.kind.is_atom() {
            1
        } else if self.kind.is_textblock() {
            self.text_len() + 2
        } else {
            self.children.iter().map(Node::size).sum::<usize>() + 2
        }
    }

    /// Number of characters held by this node's own runs.
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    /// Text content of this node and all descendants.
    pub fn text_content(&self) -> String {
        if self.kind.is_textblock() {
            self.runs.iter().map(|r| r.text.as_str()).collect()
        } else {
            self.children.iter().map(Node::text_content).collect()
        }
    }

    /// Plain text with blocks separated by newlines.
    pub fn plain_text(&self) -> String {
        if self.kind.is_textblock() {
            self.text_content()
        } else {
            self.children
                .iter()
                .map(Node::plain_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    /// Check if this node is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind.heading_level().is_some()
    }

    /// Copy of the runs covering characters `from..to`.
    pub fn slice_runs(&self, from: usize, to: usize) -> Vec<TextRun> {
        let mut out = Vec::new();
        let mut offset = 0;
        for run in &self.runs {
            let len = run.len();
            let start = from.max(offset);
            let end = to.min(offset + len);
            if start < end {
                out.push(TextRun {
                    text: char_slice(&run.text, start - offset, end - offset).to_string(),
                    style: run.style.clone(),
                });
            }
            offset += len;
        }
        out
    }

    /// Replace characters `from..to` with `runs`.
    ///
    /// Offsets are clamped to the text length by the caller; this only
    /// rearranges runs.
    pub fn splice_runs(&mut self, from: usize, to: usize, runs: Vec<TextRun>) {
        let len = self.text_len();
        let head = self.slice_runs(0, from);
        let tail = self.slice_runs(to, len);
        self.runs = head.into_iter().chain(runs).chain(tail).collect();
        self.normalize_runs();
    }

    /// Insert plain text at a character offset, inheriting the style of the
    /// run it lands in (or ends).
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        let style = self.style_at(offset);
        self.splice_runs(
            offset,
            offset,
            vec![TextRun {
                text: text.to_string(),
                style,
            }],
        );
    }

    /// Style of the character just before `offset` (or the first run).
    fn style_at(&self, offset: usize) -> TextStyle {
        let mut acc = 0;
        for run in &self.runs {
            acc += run.len();
            if offset <= acc {
                return run.style.clone();
            }
        }
        self.runs
            .last()
            .map(|r| r.style.clone())
            .unwrap_or_default()
    }

    /// Check whether every character in `from..to` carries `mark`.
    pub fn has_mark(&self, from: usize, to: usize, mark: Mark) -> bool {
        let runs = self.slice_runs(from, to);
        !runs.is_empty() && runs.iter().all(|r| r.style.has(mark))
    }

    /// Set or clear `mark` on characters `from..to`.
    pub fn set_mark(&mut self, from: usize, to: usize, mark: Mark, on: bool) {
        let mut middle = self.slice_runs(from, to);
        for run in &mut middle {
            run.style.set(mark, on);
        }
        self.splice_runs(from, to, middle);
    }

    /// Merge adjacent runs with equal styles and drop empty runs.
    pub fn normalize_runs(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.style == run.style => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default, skip_serializing_if = "TextStyle::is_plain")]
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a text run carrying a single mark.
    pub fn marked(text: impl Into<String>, mark: Mark) -> Self {
        let mut run = Self::new(text);
        run.style.set(mark, true);
        run
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::marked(text, Mark::Bold)
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::marked(text, Mark::Italic)
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Inline marks that can be toggled on text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Bold text
    Bold,
    /// Italic text
    Italic,
    /// Underlined text
    Underline,
    /// Strikethrough text
    Strike,
    /// Inline code
    Code,
    /// Text added by an accepted suggestion
    Inserted,
    /// Text removed by an accepted suggestion
    Deleted,
}

/// Text styling properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Strikethrough text
    pub strike: bool,

    /// Inline code
    pub code: bool,

    /// Redline insertion
    pub inserted: bool,

    /// Redline deletion
    pub deleted: bool,
}

impl TextStyle {
    /// Check if a mark is set.
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strike => self.strike,
            Mark::Code => self.code,
            Mark::Inserted => self.inserted,
            Mark::Deleted => self.deleted,
        }
    }

    /// Set or clear a mark.
    pub fn set(&mut self, mark: Mark, on: bool) {
        let slot = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strike => &mut self.strike,
            Mark::Code => &mut self.code,
            Mark::Inserted => &mut self.inserted,
            Mark::Deleted => &mut self.deleted,
        };
        *slot = on;
    }

    /// Check if no styling is applied.
    pub fn is_plain(&self) -> bool {
        *self == TextStyle::default()
    }
}

/// Slice a string by character offsets.
pub(crate) fn char_slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(s, from);
    let end = byte_offset(s, to);
    &s[start..end.max(start)]
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
