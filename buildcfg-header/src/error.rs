#![forbid(unsafe_code)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::Span;

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum HeaderError {
    #[error("failed to read configuration header {}", .path.display())]
    #[diagnostic(code(buildcfg::header::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to find value of PREFIX")]
    #[diagnostic(
        code(buildcfg::header::missing_prefix),
        help("the header needs a line like `#define PREFIX \"/usr/local\"`")
    )]
    MissingPrefix,

    #[error("expected PREFIX to have exactly one value, found {found}")]
    #[diagnostic(code(buildcfg::header::prefix_arity))]
    PrefixArity {
        found: usize,
        #[label("PREFIX defined here")]
        span: Span,
    },

    #[error("PREFIX value must be a quoted string")]
    #[diagnostic(code(buildcfg::header::prefix_unquoted))]
    PrefixUnquoted {
        #[label("expected a string literal")]
        span: Span,
    },

    #[error("PREFIX is defined more than once")]
    #[diagnostic(code(buildcfg::header::prefix_duplicate))]
    DuplicatePrefix {
        #[label("first definition")]
        first: Span,
        #[label("redefined here")]
        second: Span,
    },

    #[error("unterminated string or character literal")]
    #[diagnostic(code(buildcfg::header::lex))]
    UnterminatedString {
        #[label("literal starts here")]
        span: Span,
    },
}
