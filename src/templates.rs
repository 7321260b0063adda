//! Built-in clause templates.

use std::fmt;

use crate::error::{Error, Result};

/// A reusable clause inserted as HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Display name
    pub name: &'static str,
    /// Clause content
    pub html: &'static str,
}

/// All built-in templates in display order.
pub const TEMPLATES: [Template; 3] = [
    Template {
        name: "Confidentiality",
        html: "<h2>Confidentiality</h2><p>The parties agree to keep all confidential information secret and not disclose it to any third party without prior written consent.</p>",
    },
    Template {
        name: "Termination",
        html: "<h2>Termination</h2><p>Either party may terminate this agreement with thirty (30) days written notice to the other party.</p>",
    },
    Template {
        name: "Governing Law",
        html: "<h2>Governing Law</h2><p>This agreement shall be governed by and construed in accordance with the laws of the applicable jurisdiction.</p>",
    },
];

/// Find a template by name, ignoring case and separators.
///
/// `"governing-law"`, `"Governing Law"` and `"governing_law"` all match.
pub fn find(name: &str) -> Result<&'static Template> {
    let wanted = normalize(name);
    TEMPLATES
        .iter()
        .find(|t| normalize(t.name) == wanted)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
}

/// Names of all built-in templates.
pub fn names() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|t| t.name)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template() {
        assert_eq!(find("Termination").unwrap().name, "Termination");
        assert_eq!(find("governing-law").unwrap().name, "Governing Law");
        assert!(find("GOVERNING_LAW").unwrap().html.starts_with("<h2>Governing Law</h2>"));
    }

    #[test]
    fn test_unknown_template() {
        let err = find("Indemnity").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(ref n) if n == "Indemnity"));
    }

    #[test]
    fn test_names() {
        let all: Vec<_> = names().collect();
        assert_eq!(all, vec!["Confidentiality", "Termination", "Governing Law"]);
    }
}
