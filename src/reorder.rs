//! Section computation and section reordering.
//!
//! A section is the half-open range owned by an outline heading: it starts
//! at the heading and ends at the next outline heading or the document end.
//! Moving a section swaps it with a neighbour through a single range
//! replacement over both sections, so positions outside that range are
//! never touched and no intermediate tree is ever observable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::editor::{EditOp, Editor};
use crate::error::{Error, Result};
use crate::model::{Document, Node, OutlineEntry};
use crate::outline;

/// Direction of a section move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Swap with the previous section
    Up,
    /// Swap with the next section
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(Error::Other(format!(
                "Unknown direction '{}', expected 'up' or 'down'",
                other
            ))),
        }
    }
}

/// Content range owned by an outline heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Index of the owning outline entry
    pub index: usize,

    /// Heading level of the owning entry
    pub level: u8,

    /// Heading text
    pub title: String,

    /// Position of the heading (inclusive)
    pub start: usize,

    /// Position of the next outline heading or the document end (exclusive)
    pub end: usize,
}

impl Section {
    /// Size of the section in the position space.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the section covers no positions.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a position falls inside the section.
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// Compute the sections of consecutive outline entries.
///
/// The result tiles `[first heading, document end)` without gaps.
pub fn sections(doc: &Document, outline: &[OutlineEntry]) -> Vec<Section> {
    let doc_end = doc.content_size();
    outline
        .iter()
        .enumerate()
        .map(|(i, entry)| Section {
            index: i,
            level: entry.level,
            title: entry.text.clone(),
            start: entry.position,
            end: outline.get(i + 1).map_or(doc_end, |next| next.position),
        })
        .collect()
}

/// Section owned by the outline entry at `index`.
pub fn section_at(doc: &Document, outline: &[OutlineEntry], index: usize) -> Option<Section> {
    let entry = outline.get(index)?;
    Some(Section {
        index,
        level: entry.level,
        title: entry.text.clone(),
        start: entry.position,
        end: outline
            .get(index + 1)
            .map_or_else(|| doc.content_size(), |next| next.position),
    })
}

/// A computed section swap: replace `from..to` with `fragment`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSwap {
    /// Start of the combined range (first section's heading)
    pub from: usize,
    /// End of the combined range
    pub to: usize,
    /// The two sections in swapped order
    pub fragment: Vec<Node>,
}

impl SectionSwap {
    /// Turn the swap into the edit operation that commits it.
    pub fn into_op(self) -> EditOp {
        EditOp::ReplaceRange {
            from: self.from,
            to: self.to,
            fragment: self.fragment,
        }
    }
}

/// Plan the move of the section at `index` without touching the document.
///
/// `Up` on the first entry, `Down` on the last entry and indexes outside the
/// outline fail with [`Error::Index`]. Section boundaries that are not
/// top-level block boundaries fail with [`Error::Range`].
pub fn plan_move(
    doc: &Document,
    outline: &[OutlineEntry],
    index: usize,
    direction: Direction,
) -> Result<SectionSwap> {
    let len = outline.len();
    let index_error = || Error::Index {
        index,
        len,
        direction,
    };
    if index >= len {
        return Err(index_error());
    }

    // (first, second) are the outline indexes of the two swapped sections
    let first = match direction {
        Direction::Up => index.checked_sub(1).ok_or_else(index_error)?,
        Direction::Down => {
            if index + 1 >= len {
                return Err(index_error());
            }
            index
        }
    };
    let second = first + 1;

    let from = outline[first].position;
    let mid = outline[second].position;
    let to = outline
        .get(second + 1)
        .map_or_else(|| doc.content_size(), |next| next.position);

    let prev_section = doc.slice(from, mid)?;
    let mut fragment = doc.slice(mid, to)?;
    fragment.extend(prev_section);

    log::debug!(
        "Planned move of section {} {}: swapping {}..{} and {}..{}",
        index,
        direction,
        from,
        mid,
        mid,
        to
    );
    Ok(SectionSwap { from, to, fragment })
}

/// Move the section at outline `index` one step in `direction`.
///
/// The outline is recomputed from the editor's current tree, and the swap is
/// committed as one `ReplaceRange` edit. On failure the document and its
/// version are unchanged. Returns the new document version.
pub fn move_section(editor: &mut Editor, index: usize, direction: Direction) -> Result<u64> {
    let outline = outline::extract(editor.tree());
    let swap = plan_move(editor.tree(), &outline, index, direction)?;
    editor.apply(swap.into_op())
}
