#![forbid(unsafe_code)]

use logos::Logos;

use crate::{span_between, HeaderError, Span};

/// Shape of a single word on a `#define` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `"..."`
    Str,
    /// `r"..."` / `r#"..."#`, only produced for the synthetic build-tag entry.
    RawStr,
    /// C integer literal, possibly signed and suffixed (`-1`, `0x1F`, `0755`, `4096UL`).
    Int,
    /// C floating literal (`1.5`, `.5`, `1e3`, `2.0f`).
    Float,
    /// `'a'`, `'\n'`, `'\x41'`
    Char,
    Ident,
    /// Anything else (operators, parenthesised expressions, ...).
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueToken {
    pub kind: TokenKind,
    /// Source text exactly as written, quotes included.
    pub text: String,
    /// `None` for tokens that were not read from the header.
    pub span: Option<Span>,
}

impl ValueToken {
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            span: None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::Str | TokenKind::RawStr)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\f\r\n]+")]
enum RawToken {
    // Escapes are kept verbatim; C and Rust agree on the ones a config header uses.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    #[regex(r"-?(0[xX][0-9a-fA-F]+|[0-9]+)[uUlL]*", priority = 5)]
    Int,

    #[regex(
        r"-?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?[fFlL]?|-?[0-9]+[eE][-+]?[0-9]+[fFlL]?",
        priority = 5
    )]
    Float,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 5)]
    Ident,

    #[regex(r#"[^ \t\f\r\n"']+"#, priority = 1)]
    Bare,
}

/// Replaces C comments outside of literals with spaces, keeping byte offsets.
///
/// A block comment left open runs to the end of the line.
pub(crate) fn blank_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"' | '\'', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push(' ');
                for rest in chars.by_ref() {
                    if rest == '\n' {
                        out.push('\n');
                        break;
                    }
                    blank(&mut out, rest);
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for rest in chars.by_ref() {
                    blank(&mut out, rest);
                    if prev == '*' && rest == '/' {
                        break;
                    }
                    prev = rest;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

/// Splits one header line into words.
///
/// Whitespace separates words except inside quotes, and C comments are
/// dropped. `line_start` is the byte offset of `line` in the whole header so
/// spans point into the original text.
pub(crate) fn lex_line(line: &str, line_start: usize) -> Result<Vec<ValueToken>, HeaderError> {
    let code = blank_comments(line);
    let mut words = Vec::new();
    let mut lex = RawToken::lexer(&code);

    while let Some(raw) = lex.next() {
        let range = lex.span();
        let start = line_start + range.start;
        let span = span_between(start, line_start + range.end);

        let kind = match raw {
            Ok(RawToken::Str) => TokenKind::Str,
            Ok(RawToken::Char) => TokenKind::Char,
            Ok(RawToken::Int) => TokenKind::Int,
            Ok(RawToken::Float) => TokenKind::Float,
            Ok(RawToken::Ident) => TokenKind::Ident,
            Ok(RawToken::Bare) => TokenKind::Other,
            // Only a quote that never closes can fail to lex.
            Err(()) => {
                let end = line_start + code.trim_end().len();
                return Err(HeaderError::UnterminatedString {
                    span: span_between(start, end.max(start)),
                });
            }
        };

        words.push(ValueToken {
            kind,
            text: lex.slice().to_string(),
            span: Some(span),
        });
    }

    Ok(words)
}

/// Wraps `s` in a Rust raw string literal whose delimiter cannot occur inside it.
pub fn raw_string_literal(s: &str) -> String {
    let mut hashes = 0;
    while s.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{s}\"{fence}")
}
