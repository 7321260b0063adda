//! Document model types.
//!
//! This module defines the owned document tree that every structural
//! operation works on, plus the derived records (outline entries, pages)
//! computed from it. Nodes are addressed by integer positions rather than
//! references, so all edits are expressed as range replacements.

mod document;
mod node;
mod page;

pub use document::{anchor_id, Document, Metadata, OutlineEntry, TextPosition};
pub use node::{Mark, Node, NodeKind, TextRun, TextStyle};
pub use page::Page;

