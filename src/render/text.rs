//! Plain text rendering for documents.

use crate::model::Document;

use super::{CleanupPipeline, TextOptions};

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &TextOptions) -> String {
    let mut output = doc.plain_text();

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        output = pipeline.process(&output);
    }

    output.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use crate::render::CleanupPreset;

    #[test]
    fn test_to_text() {
        let doc = Document::from_nodes(vec![
            Node::heading("Confidentiality", 2),
            Node::paragraph("The parties agree."),
            Node::page_break(),
            Node::bullet_list(["one", "two"]),
        ]);

        let result = to_text(&doc, &TextOptions::default());
        assert_eq!(result, "Confidentiality\n\nThe parties agree.\n\none\ntwo");
    }

    #[test]
    fn test_to_text_with_cleanup() {
        let doc = Document::from_nodes(vec![Node::paragraph("a   b  ")]);
        let options = TextOptions::new().with_cleanup_preset(CleanupPreset::Standard);
        assert_eq!(to_text(&doc, &options), "a b");
    }
}
