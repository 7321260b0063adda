//! Rendering module for converting documents to output formats.

mod cleanup;
pub mod html;
mod json;
mod options;
mod text;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use html::{escape_html, nodes_to_html, to_html, HtmlRenderer, PAGE_BREAK_HTML};
pub use json::{from_json, to_json, JsonFormat};
pub use options::{HtmlOptions, TextOptions};
pub use text::to_text;
