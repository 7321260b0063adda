//! Document-level types and position arithmetic.
//!
//! Positions follow a flattened content-address space: an atom takes one
//! position, a textblock takes its characters plus an open and a close
//! token, and a container takes its children plus two tokens. A node's
//! position is the offset just before its open token, so top-level
//! boundaries are the running sum of top-level node sizes.

use super::{Mark, Node, NodeKind, TextRun};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An editable rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Top-level blocks in document order
    #[serde(default)]
    pub content: Vec<Node>,
}

/// A position resolved into a textblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPosition {
    /// Child indices from the top level down to the textblock
    pub path: Vec<usize>,
    /// Position of the textblock itself
    pub node_pos: usize,
    /// Character offset inside the textblock
    pub offset: usize,
}

impl TextPosition {
    /// Check if the textblock is a top-level node.
    pub fn is_top_level(&self) -> bool {
        self.path.len() == 1
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from top-level nodes.
    pub fn from_nodes(content: Vec<Node>) -> Self {
        Self {
            metadata: Metadata::default(),
            content,
        }
    }

    /// Size of the whole content in the position space.
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::size).sum()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.content.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(Node::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Visit every node in document order with its position and depth.
    pub fn descendants<'a>(&'a self, mut f: impl FnMut(&'a Node, usize, usize)) {
        fn walk<'a>(
            nodes: &'a [Node],
            start: usize,
            depth: usize,
            f: &mut impl FnMut(&'a Node, usize, usize),
        ) {
            let mut pos = start;
            for node in nodes {
                f(node, pos, depth);
                if node.kind.is_container() {
                    walk(&node.children, pos + 1, depth + 1, f);
                }
                pos += node.size();
            }
        }
        walk(&self.content, 0, 0, &mut f);
    }

    /// Positions between top-level nodes, including 0 and the content size.
    pub fn boundaries(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.content.len() + 1);
        let mut pos = 0;
        out.push(pos);
        for node in &self.content {
            pos += node.size();
            out.push(pos);
        }
        out
    }

    /// Index of the top-level boundary at `pos`, if `pos` is one.
    pub fn boundary_index(&self, pos: usize) -> Option<usize> {
        let mut cursor = 0;
        for (i, node) in self.content.iter().enumerate() {
            if cursor == pos {
                return Some(i);
            }
            if cursor > pos {
                return None;
            }
            cursor += node.size();
        }
        (cursor == pos).then_some(self.content.len())
    }

    /// Validate that `from..to` is an ordered range inside the document.
    pub fn check_range(&self, from: usize, to: usize) -> Result<()> {
        if from > to {
            return Err(Error::Range(format!(
                "start {} is after end {}",
                from, to
            )));
        }
        let size = self.content_size();
        if to > size {
            return Err(Error::Range(format!(
                "{}..{} exceeds document size {}",
                from, to, size
            )));
        }
        Ok(())
    }

    fn require_boundary(&self, pos: usize) -> Result<usize> {
        self.boundary_index(pos).ok_or_else(|| {
            Error::Range(format!("position {} is not a top-level block boundary", pos))
        })
    }

    /// Copy of the top-level nodes between two boundaries.
    pub fn slice(&self, from: usize, to: usize) -> Result<Vec<Node>> {
        self.check_range(from, to)?;
        let start = self.require_boundary(from)?;
        let end = self.require_boundary(to)?;
        Ok(self.content[start..end].to_vec())
    }

    /// Replace the top-level nodes between two boundaries with `fragment`.
    ///
    /// Validation happens before any change, so a failed call leaves the
    /// document untouched.
    pub fn replace_range(&mut self, from: usize, to: usize, fragment: Vec<Node>) -> Result<()> {
        self.check_range(from, to)?;
        let start = self.require_boundary(from)?;
        let end = self.require_boundary(to)?;
        self.content.splice(start..end, fragment);
        Ok(())
    }

    /// Resolve a position that lies inside a textblock.
    pub fn resolve_text(&self, pos: usize) -> Option<TextPosition> {
        fn find(
            nodes: &[Node],
            start: usize,
            pos: usize,
            path: &mut Vec<usize>,
        ) -> Option<(usize, usize)> {
            let mut cursor = start;
            for (i, node) in nodes.iter().enumerate() {
                let size = node.size();
                if pos > cursor && pos < cursor + size {
                    path.push(i);
                    if node.kind.is_textblock() {
                        return Some((cursor, pos - cursor - 1));
                    }
                    if node.kind.is_container() {
                        return find(&node.children, cursor + 1, pos, path);
                    }
                    return None;
                }
                cursor += size;
            }
            None
        }

        let mut path = Vec::new();
        find(&self.content, 0, pos, &mut path).map(|(node_pos, offset)| TextPosition {
            path,
            node_pos,
            offset,
        })
    }

    /// Get a node by its child-index path.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get(*first)?;
        for i in rest {
            node = node.children.get(*i)?;
        }
        Some(node)
    }

    fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for i in rest {
            node = node.children.get_mut(*i)?;
        }
        Some(node)
    }

    fn require_text(&self, pos: usize) -> Result<TextPosition> {
        self.resolve_text(pos)
            .ok_or_else(|| Error::Range(format!("position {} is not inside a textblock", pos)))
    }

    /// Text between two positions, with textblocks separated by newlines.
    pub fn text_between(&self, from: usize, to: usize) -> Result<String> {
        self.check_range(from, to)?;
        let mut parts = Vec::new();
        self.descendants(|node, pos, _| {
            if !node.kind.is_textblock() {
                return;
            }
            let start = pos + 1;
            let end = start + node.text_len();
            let a = from.max(start);
            let b = to.min(end);
            if a < b || (a == b && from <= start && end <= to && node.text_len() == 0) {
                let text: String = node
                    .slice_runs(a - start, b - start)
                    .iter()
                    .map(|r| r.text.as_str())
                    .collect();
                parts.push(text);
            }
        });
        Ok(parts.join("\n"))
    }

    /// Insert plain text at a position inside a textblock.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<()> {
        let at = self.require_text(pos)?;
        if let Some(node) = self.node_at_mut(&at.path) {
            node.insert_text(at.offset, text);
        }
        Ok(())
    }

    /// Replace characters between two positions of the same textblock.
    pub fn replace_text(&mut self, from: usize, to: usize, runs: Vec<TextRun>) -> Result<()> {
        self.check_range(from, to)?;
        let a = self.require_text(from)?;
        let b = self.require_text(to)?;
        if a.path != b.path {
            return Err(Error::Range(format!(
                "{}..{} spans more than one textblock",
                from, to
            )));
        }
        if let Some(node) = self.node_at_mut(&a.path) {
            node.splice_runs(a.offset, b.offset, runs);
        }
        Ok(())
    }

    /// Delete the content between two positions.
    ///
    /// Supported shapes: two top-level boundaries, a range inside one
    /// textblock, or a range whose ends lie in top-level textblocks or at
    /// top-level boundaries. Partially covered textblocks at both ends are
    /// joined into the first one.
    pub fn delete_range(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_range(from, to)?;
        if from == to {
            return Ok(());
        }

        let start_boundary = self.boundary_index(from);
        let end_boundary = self.boundary_index(to);
        if let (Some(start), Some(end)) = (start_boundary, end_boundary) {
            self.content.drain(start..end);
            return Ok(());
        }

        let a = match start_boundary {
            Some(i) => Endpoint::Boundary(i),
            None => Endpoint::Text(self.require_text(from)?),
        };
        let b = match end_boundary {
            Some(i) => Endpoint::Boundary(i),
            None => Endpoint::Text(self.require_text(to)?),
        };

        if let (Endpoint::Text(ta), Endpoint::Text(tb)) = (&a, &b) {
            if ta.path == tb.path {
                let (pa, oa, ob) = (ta.path.clone(), ta.offset, tb.offset);
                if let Some(node) = self.node_at_mut(&pa) {
                    node.splice_runs(oa, ob, Vec::new());
                }
                return Ok(());
            }
        }

        for end in [&a, &b] {
            if let Endpoint::Text(t) = end {
                if !t.is_top_level() {
                    return Err(Error::Range(format!(
                        "{}..{} crosses a container boundary",
                        from, to
                    )));
                }
            }
        }

        // Build the surviving pieces first, then splice once.
        let (first, head) = match &a {
            Endpoint::Boundary(i) => (*i, None),
            Endpoint::Text(t) => {
                let node = &self.content[t.path[0]];
                let mut kept = node.clone();
                kept.runs = node.slice_runs(0, t.offset);
                (t.path[0], Some(kept))
            }
        };
        let (last, tail) = match &b {
            Endpoint::Boundary(i) => (*i, None),
            Endpoint::Text(t) => {
                let node = &self.content[t.path[0]];
                (t.path[0] + 1, Some(node.slice_runs(t.offset, node.text_len())))
            }
        };

        let replacement = match (head, tail) {
            (Some(mut head), Some(tail)) => {
                head.runs.extend(tail);
                head.normalize_runs();
                vec![head]
            }
            (Some(head), None) => vec![head],
            (None, Some(tail)) => {
                let mut node = self.content[last - 1].clone();
                node.runs = tail;
                vec![node]
            }
            (None, None) => Vec::new(),
        };
        self.content.splice(first..last, replacement);
        Ok(())
    }

    /// Toggle an inline mark over every textblock intersecting `from..to`.
    ///
    /// The mark is removed when the whole range already carries it,
    /// otherwise it is applied to the whole range.
    pub fn toggle_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<()> {
        self.check_range(from, to)?;
        let mut targets: Vec<(Vec<usize>, usize, usize)> = Vec::new();
        collect_textblocks(&self.content, 0, &mut Vec::new(), &mut |path, pos, node| {
            let start = pos + 1;
            let end = start + node.text_len();
            let a = from.max(start);
            let b = to.min(end);
            if a < b {
                targets.push((path.to_vec(), a - start, b - start));
            }
        });
        if targets.is_empty() {
            return Ok(());
        }

        let all_marked = targets.iter().all(|(path, a, b)| {
            self.node_at(path)
                .map(|n| n.has_mark(*a, *b, mark))
                .unwrap_or(false)
        });
        for (path, a, b) in targets {
            if let Some(node) = self.node_at_mut(&path) {
                node.set_mark(a, b, mark, !all_marked);
            }
        }
        Ok(())
    }

    /// Change the type of the textblock at (or starting at) `pos`.
    pub fn set_block_type(&mut self, pos: usize, kind: NodeKind) -> Result<()> {
        if !kind.is_textblock() {
            return Err(Error::Range(format!(
                "cannot turn a textblock into {}",
                kind.name()
            )));
        }
        self.check_range(pos, pos)?;
        let at = self
            .resolve_text(pos)
            .or_else(|| {
                pos.checked_add(1)
                    .and_then(|next| self.resolve_text(next))
                    .filter(|t| t.node_pos == pos)
            })
            .ok_or_else(|| Error::Range(format!("no textblock at position {}", pos)))?;
        if let Some(node) = self.node_at_mut(&at.path) {
            node.kind = kind;
        }
        Ok(())
    }

    /// Insert a block at a top-level boundary.
    ///
    /// A position inside a top-level textblock splits that block and puts
    /// `node` between the two halves.
    pub fn insert_block(&mut self, pos: usize, node: Node) -> Result<()> {
        self.check_range(pos, pos)?;
        if let Some(i) = self.boundary_index(pos) {
            self.content.insert(i, node);
            return Ok(());
        }

        let at = self.require_text(pos)?;
        if !at.is_top_level() {
            return Err(Error::Range(format!(
                "position {} is inside a container",
                pos
            )));
        }
        let i = at.path[0];
        let original = &self.content[i];
        let mut head = original.clone();
        head.runs = original.slice_runs(0, at.offset);
        let mut tail = original.clone();
        tail.runs = original.slice_runs(at.offset, original.text_len());
        self.content.splice(i..=i, [head, node, tail]);
        Ok(())
    }
}

enum Endpoint {
    Boundary(usize),
    Text(TextPosition),
}

fn collect_textblocks(
    nodes: &[Node],
    start: usize,
    path: &mut Vec<usize>,
    f: &mut impl FnMut(&[usize], usize, &Node),
) {
    let mut pos = start;
    for (i, node) in nodes.iter().enumerate() {
        path.push(i);
        if node.kind.is_textblock() {
            f(path, pos, node);
        } else if node.kind.is_container() {
            collect_textblocks(&node.children, pos + 1, path, f);
        }
        path.pop();
        pos += node.size();
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title (shown in page headers)
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title for page headers, falling back to "Document".
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Document")
    }
}

/// Navigation record for a heading, derived from the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Anchor identity, derived from the position
    pub id: String,

    /// Heading level (1-3)
    pub level: u8,

    /// Heading text
    pub text: String,

    /// Position of the heading node
    pub position: usize,
}

impl OutlineEntry {
    /// Create an entry; the id is derived from the position.
    pub fn new(level: u8, text: impl Into<String>, position: usize) -> Self {
        Self {
            id: anchor_id(position),
            level,
            text: text.into(),
            position,
        }
    }

    /// Text for display, "Untitled" when the heading is empty.
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            "Untitled"
        } else {
            &self.text
        }
    }
}

/// Anchor identity for a heading at `position`.
pub fn anchor_id(position: usize) -> String {
    format!("heading-{}", position)
}
