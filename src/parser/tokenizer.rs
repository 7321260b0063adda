//! Minimal HTML tokenizer shared by the parser and the pagination scanner.
//!
//! Tokens carry byte spans into the input so callers can slice the exact
//! source text of an element.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Kind of an HTML token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Opening tag, possibly self-closing (`<div ... />`)
    Open {
        name: String,
        attrs: String,
        self_closing: bool,
    },
    /// Closing tag
    Close { name: String },
    /// Character data between tags
    Text,
    /// `<!-- ... -->` or `<!DOCTYPE ...>`
    Comment,
}

/// A token with its byte span in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Source text of the token.
    pub fn source<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("tag pattern is valid")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

/// Split HTML into tags, text and comments.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in tag_regex().captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token {
                kind: TokenKind::Text,
                start: last,
                end: whole.start(),
            });
        }

        let kind = match caps.get(2) {
            None => TokenKind::Comment,
            Some(name) => {
                let name = name.as_str().to_ascii_lowercase();
                let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
                if closing {
                    TokenKind::Close { name }
                } else {
                    let raw = caps.get(3).map_or("", |m| m.as_str()).trim();
                    let self_closing = raw.ends_with('/');
                    let attrs = raw.trim_end_matches('/').trim().to_string();
                    TokenKind::Open {
                        name,
                        attrs,
                        self_closing,
                    }
                }
            }
        };
        tokens.push(Token {
            kind,
            start: whole.start(),
            end: whole.end(),
        });
        last = whole.end();
    }

    if last < input.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            start: last,
            end: input.len(),
        });
    }
    tokens
}

/// Look up an attribute value in a raw attribute string.
///
/// Boolean attributes yield an empty string.
pub(crate) fn attr(attrs: &str, name: &str) -> Option<String> {
    attr_regex().captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?;
        if !key.as_str().eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(decode_entities(value).into_owned())
    })
}

/// Elements that never have a closing tag.
pub(crate) fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Decode the character references the serializer and common editors emit.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest
            .char_indices()
            .take_while(|(i, _)| *i < 12)
            .find(|(_, c)| *c == ';')
            .map(|(i, _)| i);
        let Some(semi) = semi else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_spans() {
        let html = r#"<h1>Intro</h1><div data-type="page-break" class="page-break"></div>"#;
        let tokens = tokenize(html);
        assert_eq!(tokens.len(), 5);
        assert!(matches!(&tokens[0].kind, TokenKind::Open { name, .. } if name == "h1"));
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[1].source(html), "Intro");
        assert!(matches!(&tokens[4].kind, TokenKind::Close { name } if name == "div"));
    }

    #[test]
    fn test_tokenize_self_closing_and_comments() {
        let tokens = tokenize("<!-- note --><hr/><BR>");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert!(matches!(
            &tokens[1].kind,
            TokenKind::Open { name, self_closing: true, .. } if name == "hr"
        ));
        assert!(matches!(&tokens[2].kind, TokenKind::Open { name, .. } if name == "br"));
    }

    #[test]
    fn test_attr_lookup() {
        let attrs = r#"data-type="page-break" class='page-break' hidden"#;
        assert_eq!(attr(attrs, "data-type").as_deref(), Some("page-break"));
        assert_eq!(attr(attrs, "class").as_deref(), Some("page-break"));
        assert_eq!(attr(attrs, "hidden").as_deref(), Some(""));
        assert_eq!(attr(attrs, "id"), None);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#169; &#x41;"), "© A");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }
}
