//! External assistance services.
//!
//! Rewrite suggestions, clause search and document checks are provided by
//! collaborators outside this crate. They only ever see plain text and
//! answer with plain values; they never touch the document tree.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A clause returned by a clause search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseMatch {
    /// Clause text
    pub clause: String,
    /// Where the clause comes from
    pub source: String,
    /// Similarity score in `0.0..=1.0`
    pub similarity: f32,
}

/// Result of looking up a clause in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseLookup {
    /// Whether the clause occurs in the document
    pub exists: bool,
    /// Matching text, empty when the clause is absent
    pub snippet: String,
}

/// Collaborator offering drafting assistance on plain text.
pub trait AssistService {
    /// Suggest a rewrite of `text`.
    fn suggest_rewrite(&self, text: &str) -> Result<String>;

    /// Search a clause library for `query`.
    fn search_clauses(&self, query: &str) -> Result<Vec<ClauseMatch>>;

    /// Check whether `clause` occurs in `document`.
    fn find_clause(&self, document: &str, clause: &str) -> Result<ClauseLookup>;

    /// Summarize `document`.
    fn summarize(&self, document: &str) -> Result<String>;

    /// List consistency issues found in `document`.
    fn check_consistency(&self, document: &str) -> Result<Vec<String>>;
}

/// Number of characters kept by the placeholder summary.
pub const SUMMARY_CHARS: usize = 100;

/// Local stand-in for the assistance backend.
///
/// Every answer is deterministic and computed without any model.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderService;

impl PlaceholderService {
    /// Create a placeholder service.
    pub fn new() -> Self {
        Self
    }
}

impl AssistService for PlaceholderService {
    fn suggest_rewrite(&self, text: &str) -> Result<String> {
        Ok(text.chars().rev().collect())
    }

    fn search_clauses(&self, _query: &str) -> Result<Vec<ClauseMatch>> {
        Ok(vec![ClauseMatch {
            clause: "Sample confidentiality clause".to_string(),
            source: "Case Reference A".to_string(),
            similarity: 0.9,
        }])
    }

    fn find_clause(&self, document: &str, clause: &str) -> Result<ClauseLookup> {
        let exists = document.contains(clause);
        Ok(ClauseLookup {
            exists,
            snippet: if exists { clause.to_string() } else { String::new() },
        })
    }

    fn summarize(&self, document: &str) -> Result<String> {
        Ok(document.chars().take(SUMMARY_CHARS).collect())
    }

    fn check_consistency(&self, _document: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
