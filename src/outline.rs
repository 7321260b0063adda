//! Outline extraction and heading anchors.
//!
//! The outline is a pure function of the document: every call walks the
//! whole tree and collects headings of level 1 to 3 in document order.
//! Anchor identities are derived from heading positions, so they are only
//! stable until the next structural edit.

use std::collections::BTreeMap;

use crate::model::{Document, OutlineEntry};

/// Deepest heading level that appears in the outline.
pub const MAX_OUTLINE_LEVEL: u8 = 3;

/// Extract the outline of a document.
///
/// Headings nested inside containers are included. Entries are ordered by
/// position, which is document order.
pub fn extract(doc: &Document) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    doc.descendants(|node, pos, _depth| {
        if let Some(level) = node.kind.heading_level() {
            if level <= MAX_OUTLINE_LEVEL {
                entries.push(OutlineEntry::new(level, node.text_content(), pos));
            }
        }
    });
    entries
}

/// Navigation anchors assigned to outline headings.
///
/// Assignment is idempotent: assigning the same entries twice changes
/// nothing the second time.
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    anchors: BTreeMap<String, usize>,
}

impl AnchorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign anchors for `entries`, dropping anchors no longer present.
    ///
    /// Returns the number of anchors added, moved or removed.
    pub fn assign(&mut self, entries: &[OutlineEntry]) -> usize {
        let next: BTreeMap<String, usize> = entries
            .iter()
            .map(|e| (e.id.clone(), e.position))
            .collect();

        let removed = self
            .anchors
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();
        let changed = next
            .iter()
            .filter(|(id, pos)| self.anchors.get(*id) != Some(*pos))
            .count();

        if removed + changed > 0 {
            log::debug!(
                "Anchors updated: {} changed, {} removed, {} total",
                changed,
                removed,
                next.len()
            );
            self.anchors = next;
        }
        removed + changed
    }

    /// Position of the heading an anchor points to.
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.anchors.get(id).copied()
    }

    /// Number of assigned anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Check if no anchors are assigned.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterate anchors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.anchors.iter().map(|(id, pos)| (id.as_str(), *pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};

    fn scenario() -> Document {
        Document::from_nodes(vec![
            Node::heading("Intro", 1),
            Node::paragraph("text"),
            Node::heading("Terms", 1),
            Node::paragraph("text2"),
        ])
    }

    #[test]
    fn test_extract_scenario() {
        let outline = extract(&scenario());
        assert_eq!(outline.len(), 2);
        assert_eq!((outline[0].level, outline[0].text.as_str()), (1, "Intro"));
        assert_eq!((outline[1].level, outline[1].text.as_str()), (1, "Terms"));
        assert_eq!(outline[0].position, 0);
        assert_eq!(outline[1].position, 13);
        assert_eq!(outline[1].id, "heading-13");
    }

    #[test]
    fn test_extract_ignores_deep_headings() {
        let doc = Document::from_nodes(vec![
            Node::heading("A", 1),
            Node::heading("B", 2),
            Node::heading("C", 3),
            Node::heading("D", 4),
            Node::heading("E", 6),
        ]);
        let levels: Vec<u8> = extract(&doc).iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_nested_heading() {
        let quote = Node::container(NodeKind::Blockquote, vec![Node::heading("Quoted", 2)]);
        let doc = Document::from_nodes(vec![Node::paragraph("p"), quote]);
        let outline = extract(&doc);
        assert_eq!(outline.len(), 1);
        // paragraph (3) + blockquote open token
        assert_eq!(outline[0].position, 4);
    }

    #[test]
    fn test_extract_is_deterministic_and_ordered() {
        let doc = scenario();
        let a = extract(&doc);
        let b = extract(&doc);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0].position < w[1].position));
    }

    #[test]
    fn test_anchor_assign_idempotent() {
        let outline = extract(&scenario());
        let mut registry = AnchorRegistry::new();
        assert_eq!(registry.assign(&outline), 2);
        assert_eq!(registry.assign(&outline), 0);
        assert_eq!(registry.resolve("heading-13"), Some(13));
        assert_eq!(registry.resolve("heading-7"), None);
    }

    #[test]
    fn test_anchor_assign_drops_stale() {
        let mut registry = AnchorRegistry::new();
        registry.assign(&extract(&scenario()));

        let doc = Document::from_nodes(vec![Node::heading("Only", 1)]);
        let changed = registry.assign(&extract(&doc));
        // heading-13 removed, heading-0 unchanged
        assert_eq!(changed, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("heading-0"), Some(0));
    }
}
