#![forbid(unsafe_code)]

//! Extraction of `#define` entries from a build configuration header.

mod error;
mod extract;
mod token;

use miette::SourceSpan;

pub use error::HeaderError;
pub use extract::{
    extract, read_header, ConfigEntry, Header, BUILD_TAGS_NAME, DEFINE_MARKER, PREFIX_NAME,
};
pub use token::{raw_string_literal, TokenKind, ValueToken};

pub type Span = SourceSpan;

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

pub fn span_between(start: usize, end: usize) -> Span {
    debug_assert!(end >= start);
    span(start, end - start)
}
