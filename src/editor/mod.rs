//! Editing session over a document tree.
//!
//! The session is the single mutation entry point for a document. Every
//! edit, including section moves, goes through [`Editor::apply`], so edits
//! are serialized and each one produces exactly one new version.

mod derived;
mod ops;
mod session;

pub use derived::Versioned;
pub use ops::{ChangeEvent, EditKind, EditOp};
pub use session::Editor;
