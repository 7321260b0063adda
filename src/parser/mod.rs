//! HTML parsing module.

mod html;
mod options;
pub(crate) mod tokenizer;

pub use html::{parse_fragment, parse_html};
pub use options::{ErrorMode, ParseOptions};
