//! Edit operations and change events.

use std::fmt;

use crate::model::{Mark, Node, NodeKind, TextRun};

/// A single document mutation.
///
/// Every operation is applied atomically through [`Editor::apply`]: it
/// either succeeds and bumps the document version once, or fails and leaves
/// the document untouched.
///
/// [`Editor::apply`]: super::Editor::apply
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Insert plain text at a position inside a textblock
    InsertText { pos: usize, text: String },

    /// Delete the content between two positions
    DeleteRange { from: usize, to: usize },

    /// Toggle an inline mark over a range
    ToggleMark { from: usize, to: usize, mark: Mark },

    /// Change the type of the textblock at a position
    SetBlockType { pos: usize, kind: NodeKind },

    /// Parse HTML and insert its blocks at a top-level boundary
    InsertHtml { pos: usize, html: String },

    /// Insert a page break at a boundary, splitting a textblock if needed
    InsertPageBreak { pos: usize },

    /// Replace the blocks between two top-level boundaries
    ReplaceRange {
        from: usize,
        to: usize,
        fragment: Vec<Node>,
    },

    /// Replace characters inside one textblock with styled runs
    ReplaceText {
        from: usize,
        to: usize,
        runs: Vec<TextRun>,
    },
}

impl EditOp {
    /// Kind of the operation.
    pub fn kind(&self) -> EditKind {
        match self {
            EditOp::InsertText { .. } => EditKind::InsertText,
            EditOp::DeleteRange { .. } => EditKind::DeleteRange,
            EditOp::ToggleMark { .. } => EditKind::ToggleMark,
            EditOp::SetBlockType { .. } => EditKind::SetBlockType,
            EditOp::InsertHtml { .. } => EditKind::InsertHtml,
            EditOp::InsertPageBreak { .. } => EditKind::InsertPageBreak,
            EditOp::ReplaceRange { .. } => EditKind::ReplaceRange,
            EditOp::ReplaceText { .. } => EditKind::ReplaceText,
        }
    }

    /// Check if the operation can change block structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            EditKind::DeleteRange
                | EditKind::SetBlockType
                | EditKind::InsertHtml
                | EditKind::InsertPageBreak
                | EditKind::ReplaceRange
        )
    }
}

/// Kind of an applied edit, reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    InsertText,
    DeleteRange,
    ToggleMark,
    SetBlockType,
    InsertHtml,
    InsertPageBreak,
    ReplaceRange,
    ReplaceText,
}

impl EditKind {
    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            EditKind::InsertText => "insert_text",
            EditKind::DeleteRange => "delete_range",
            EditKind::ToggleMark => "toggle_mark",
            EditKind::SetBlockType => "set_block_type",
            EditKind::InsertHtml => "insert_html",
            EditKind::InsertPageBreak => "insert_page_break",
            EditKind::ReplaceRange => "replace_range",
            EditKind::ReplaceText => "replace_text",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notification sent to subscribers after every successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Document version after the edit
    pub version: u64,
    /// What kind of edit produced this version
    pub kind: EditKind,
    /// Content size after the edit
    pub size: usize,
}
