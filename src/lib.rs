//! # folio
//!
//! Document structuring engine for rich-text legal documents.
//!
//! A document is an owned tree of typed nodes addressed by integer
//! positions. On top of it the crate derives a navigable outline, moves
//! whole sections with a single atomic edit, and cuts the serialized
//! content into pages using manual breaks and measured block heights.
//!
//! ## Quick Start
//!
//! ```
//! use folio::{Direction, Editor, ParseOptions};
//!
//! fn main() -> folio::Result<()> {
//!     let html = "<h1>Intro</h1><p>text</p><h1>Terms</h1><p>text2</p>";
//!     let mut editor = Editor::from_html(html, &ParseOptions::default())?;
//!
//!     // Outline entries are derived after every edit
//!     assert_eq!(editor.outline()[1].text, "Terms");
//!
//!     // Swap the two sections in one edit
//!     editor.move_section(0, Direction::Down)?;
//!     assert_eq!(
//!         editor.serialize(),
//!         "<h1>Terms</h1><p>text2</p><h1>Intro</h1><p>text</p>"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline**: headings of level 1 to 3 with position-derived anchors
//! - **Section moves**: atomic swap of neighbouring sections
//! - **Pagination**: manual breaks plus greedy height-based overflow
//! - **Background measurement**: cancellable worker keyed by version
//! - **Export**: page surfaces handed to pluggable exporters

pub mod editor;
pub mod error;
pub mod export;
pub mod model;
pub mod outline;
pub mod paginate;
pub mod parser;
pub mod render;
pub mod reorder;
pub mod services;
pub mod templates;

// Re-export commonly used types
pub use editor::{ChangeEvent, EditKind, EditOp, Editor, Versioned};
pub use error::{Error, Result};
pub use export::{export_pages, HtmlBookExporter, PageExporter, PageSurface};
pub use model::{
    Document, Mark, Metadata, Node, NodeKind, OutlineEntry, Page, TextRun, TextStyle,
};
pub use outline::AnchorRegistry;
pub use paginate::{
    paginate, HeightMeasurer, PageSize, PaginateOptions, PaginationWorker, Paginator,
    TextMetricsMeasurer,
};
pub use parser::{parse_html, ErrorMode, ParseOptions};
pub use render::{CleanupPreset, HtmlOptions, JsonFormat, TextOptions};
pub use reorder::{Direction, Section};
pub use services::{AssistService, ClauseLookup, ClauseMatch, PlaceholderService};

use std::path::Path;

/// On-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// HTML content
    #[default]
    Html,

    /// Serialized `Document` JSON
    Json,

    /// Plain text (write only)
    Text,
}

impl DocumentFormat {
    /// Pick a format from a file extension; unknown extensions are HTML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => DocumentFormat::Json,
            Some("txt") | Some("text") => DocumentFormat::Text,
            _ => DocumentFormat::Html,
        }
    }
}

/// Load a document from an `.html` or `.json` file.
///
/// HTML is parsed leniently. A document without a title takes the file
/// stem as its title.
///
/// # Example
///
/// ```no_run
/// let doc = folio::load_file("contract.html").unwrap();
/// println!("{} blocks", doc.block_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    load_file_with_options(path, &ParseOptions::new().lenient())
}

/// Load a document with custom HTML parse options.
pub fn load_file_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    load_str(&content, DocumentFormat::from_path(path), options).map(|doc| with_stem_title(doc, path))
}

/// Load a document from a string in the given format.
pub fn load_str(content: &str, format: DocumentFormat, options: &ParseOptions) -> Result<Document> {
    match format {
        DocumentFormat::Json => render::from_json(content),
        DocumentFormat::Html => parse_html(content, options),
        DocumentFormat::Text => Err(Error::Parse(
            "plain text cannot be loaded as a document".to_string(),
        )),
    }
}

/// Save a document; the format follows the file extension.
pub fn save_file<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let path = path.as_ref();
    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => render::to_json(doc, JsonFormat::Pretty)?,
        DocumentFormat::Text => render::to_text(doc, &TextOptions::default()),
        DocumentFormat::Html => render::to_html(doc, &HtmlOptions::default()),
    };
    std::fs::write(path, content)?;
    log::debug!("Saved document to {}", path.display());
    Ok(())
}

/// Load a document without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn load_file_async<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await?;
    load_str(
        &content,
        DocumentFormat::from_path(path),
        &ParseOptions::new().lenient(),
    )
    .map(|doc| with_stem_title(doc, path))
}

fn with_stem_title(mut doc: Document, path: &Path) -> Document {
    if doc.metadata.title.is_none() {
        doc.metadata.title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path("a.JSON"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path("a.htm"), DocumentFormat::Html);
        assert_eq!(DocumentFormat::from_path("a.txt"), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_path("noext"), DocumentFormat::Html);
    }

    #[test]
    fn test_load_html_file_uses_stem_title() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lease.html");
        std::fs::write(&path, "<h1>Intro</h1><p>text</p>").unwrap();

        let doc = load_file(&path).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.metadata.title.as_deref(), Some("lease"));
    }

    #[test]
    fn test_save_and_reload_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = Document::from_nodes(vec![Node::heading("Intro", 1), Node::page_break()]);
        doc.metadata = Metadata::with_title("Lease");

        save_file(&doc, &path).unwrap();
        assert_eq!(load_file(&path).unwrap(), doc);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_file("/definitely/not/here.html");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_text_is_not_loadable() {
        let result = load_str("hello", DocumentFormat::Text, &ParseOptions::default());
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
