#![forbid(unsafe_code)]

use buildcfg_header::Span;
use miette::Diagnostic;
use thiserror::Error;

use crate::ValueType;

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum EmitError {
    #[error("`{name}` refers to `{reference}`, which is not defined")]
    #[diagnostic(code(buildcfg::emit::undefined))]
    UndefinedName {
        name: String,
        reference: String,
        #[label("used here")]
        span: Option<Span>,
    },

    #[error("constant `{name}` depends on `{dependency}`, which is only known at run time")]
    #[diagnostic(
        code(buildcfg::emit::runtime_dependency),
        help("only values that mention APPTAINER_CONFDIR are resolved at run time")
    )]
    ConstantNeedsRuntime {
        name: String,
        dependency: String,
        #[label("defined here")]
        span: Option<Span>,
    },

    #[error("`{name}` mixes {expected} and {found} values")]
    #[diagnostic(code(buildcfg::emit::type_mismatch))]
    TypeMismatch {
        name: String,
        expected: ValueType,
        found: ValueType,
        #[label("this operand is {found}")]
        span: Option<Span>,
    },

    #[error("`{name}` has unsupported value `{token}`")]
    #[diagnostic(
        code(buildcfg::emit::unsupported),
        help(
            "values must be string, integer, floating or character literals, names of \
             other entries, or parenthesised integer expressions"
        )
    )]
    UnsupportedToken {
        name: String,
        token: String,
        #[label("not representable as a Rust constant")]
        span: Option<Span>,
    },

    #[error("`{token}` in `{name}` is not a valid 64-bit integer")]
    #[diagnostic(code(buildcfg::emit::integer))]
    InvalidInteger {
        name: String,
        token: String,
        #[label("here")]
        span: Option<Span>,
    },

    #[error("`{name}` is defined in terms of itself")]
    #[diagnostic(code(buildcfg::emit::cycle))]
    Cycle {
        name: String,
        #[label("cycle passes through here")]
        span: Option<Span>,
    },
}
