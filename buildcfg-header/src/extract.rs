#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::token::{blank_comments, lex_line, raw_string_literal, TokenKind, ValueToken};
use crate::{span_between, HeaderError, Span};

pub const DEFINE_MARKER: &str = "#define";
pub const PREFIX_NAME: &str = "PREFIX";
pub const BUILD_TAGS_NAME: &str = "GO_BUILD_TAGS";

/// One `#define NAME VALUE...` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    /// Never empty.
    pub value: Vec<ValueToken>,
    /// Whole line in the header; `None` for synthetic entries.
    pub span: Option<Span>,
}

impl ConfigEntry {
    /// The value as a concatenation expression: tokens joined with `" + "`.
    pub fn expression(&self) -> String {
        self.value
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" + ")
    }

    pub fn is_synthetic(&self) -> bool {
        self.span.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// In header order, duplicates kept, synthetic build-tag entry last.
    pub entries: Vec<ConfigEntry>,
    /// Value of `PREFIX` with its quotes removed.
    pub prefix: String,
}

/// Extracts every `#define` entry from `source`.
///
/// `build_tags`, when non-empty, is appended as a `GO_BUILD_TAGS` entry whose
/// value is a raw string literal.
pub fn extract(source: &str, build_tags: Option<&str>) -> Result<Header, HeaderError> {
    let mut entries = Vec::new();
    let mut prefix: Option<(String, Span)> = None;
    let mut seen: HashSet<String> = HashSet::new();

    let mut line_start = 0usize;
    for line in source.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();

        if line.split_whitespace().next() != Some(DEFINE_MARKER) {
            continue;
        }

        let mut words = lex_line(line, offset)?;
        if words.len() < 3 {
            debug!(line = line.trim_end(), "ignoring #define without a value");
            continue;
        }

        let line_span = span_between(offset, offset + line.trim_end().len());
        let value = words.split_off(2);
        let name = words.swap_remove(1);

        if name.kind != TokenKind::Ident {
            warn!(name = %name.text, "skipping #define whose name is not an identifier");
            continue;
        }

        if name.text == PREFIX_NAME {
            // Whitespace words, not lexed tokens: a quoted path with spaces is refused.
            let fields = blank_comments(line).split_whitespace().count();
            if fields != 3 || value.len() != 1 {
                let found = if value.len() != 1 {
                    value.len()
                } else {
                    fields.saturating_sub(2)
                };
                return Err(HeaderError::PrefixArity {
                    found,
                    span: line_span,
                });
            }
            let token = &value[0];
            if token.kind != TokenKind::Str {
                return Err(HeaderError::PrefixUnquoted {
                    span: token.span.unwrap_or(line_span),
                });
            }
            if let Some((_, first)) = prefix {
                return Err(HeaderError::DuplicatePrefix {
                    first,
                    second: line_span,
                });
            }
            let unquoted = &token.text[1..token.text.len() - 1];
            prefix = Some((unquoted.to_string(), line_span));
        }

        if !seen.insert(name.text.clone()) {
            warn!(name = %name.text, "duplicate definition, both are kept");
        }

        entries.push(ConfigEntry {
            name: name.text,
            value,
            span: Some(line_span),
        });
    }

    let Some((prefix, _)) = prefix else {
        return Err(HeaderError::MissingPrefix);
    };

    if let Some(tags) = build_tags.filter(|t| !t.is_empty()) {
        entries.push(ConfigEntry {
            name: BUILD_TAGS_NAME.to_string(),
            value: vec![ValueToken::synthetic(
                TokenKind::RawStr,
                raw_string_literal(tags),
            )],
            span: None,
        });
    }

    debug!(entries = entries.len(), prefix = %prefix, "extracted configuration header");
    Ok(Header { entries, prefix })
}

/// Reads a header, tolerating UTF-16LE and invalid UTF-8.
pub fn read_header(path: &Path) -> Result<String, HeaderError> {
    let bytes = fs::read(path).map_err(|source| HeaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // NUL never appears in a text header, but every ASCII unit of UTF-16LE carries one.
    let is_utf16le = bytes.starts_with(&[0xFF, 0xFE]) || bytes.iter().take(64).any(|b| *b == 0);
    if is_utf16le {
        let body = bytes.strip_prefix(&[0xFF, 0xFE]).unwrap_or(&bytes);
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(String::from_utf16_lossy(&units));
    }

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
