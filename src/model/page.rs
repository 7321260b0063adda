//! Page-level types.

use serde::{Deserialize, Serialize};

/// A renderable page produced by pagination.
///
/// Pages are derived output: they are recomputed from the document's
/// serialized content and carry no identity beyond their number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Index of the manual segment this page belongs to (0-indexed)
    pub segment: usize,

    /// Serialized content fragment of the page
    pub content: String,

    /// Number of top-level blocks on the page
    pub block_count: usize,

    /// Accumulated measured height, `None` when the page was not measured
    pub height: Option<f32>,
}

impl Page {
    /// Create a page holding a content fragment.
    pub fn new(number: u32, segment: usize, content: impl Into<String>) -> Self {
        Self {
            number,
            segment,
            content: content.into(),
            block_count: 0,
            height: None,
        }
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Check if the page was measured.
    pub fn is_measured(&self) -> bool {
        self.height.is_some()
    }
}
