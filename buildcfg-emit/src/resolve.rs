#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;

use buildcfg_header::{ConfigEntry, Span, TokenKind, ValueToken};

use crate::classify::{classify, DeclKind};
use crate::EmitError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Char,
    Bool,
}

impl ValueType {
    /// Rust type of a `pub const` holding this value.
    pub fn const_type(self) -> &'static str {
        match self {
            ValueType::Str => "&str",
            ValueType::Int => "i64",
            ValueType::Float => "f64",
            ValueType::Char => "char",
            ValueType::Bool => "bool",
        }
    }

    /// Whether several operands of this type can be joined with `+`.
    pub fn is_additive(self) -> bool {
        matches!(self, ValueType::Str | ValueType::Int | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Str => "string",
            ValueType::Int => "integer",
            ValueType::Float => "float",
            ValueType::Char => "character",
            ValueType::Bool => "boolean",
        })
    }
}

/// One piece of a parenthesised C integer expression such as `(1UL << 3)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExprPart<'a> {
    Lit(i64),
    Name(&'a str),
    Op(&'static str),
}

const EXPR_OPS: [&str; 13] = [
    "<<", ">>", "(", ")", "+", "-", "*", "/", "%", "&", "|", "^", "~",
];

/// Name lookup over every entry of a header. Later definitions shadow earlier ones.
pub(crate) struct Symbols<'h> {
    entries: HashMap<&'h str, &'h ConfigEntry>,
}

impl<'h> Symbols<'h> {
    pub fn new(entries: &'h [ConfigEntry]) -> Self {
        Self {
            entries: entries.iter().map(|e| (e.name.as_str(), e)).collect(),
        }
    }

    pub fn lookup(
        &self,
        entry: &ConfigEntry,
        token: &ValueToken,
    ) -> Result<&'h ConfigEntry, EmitError> {
        self.lookup_name(entry, &token.text, token.span)
    }

    fn lookup_name(
        &self,
        entry: &ConfigEntry,
        name: &str,
        span: Option<Span>,
    ) -> Result<&'h ConfigEntry, EmitError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| EmitError::UndefinedName {
                name: entry.name.clone(),
                reference: name.to_string(),
                span: span.or(entry.span),
            })
    }

    pub fn entry_type(&self, entry: &'h ConfigEntry) -> Result<ValueType, EmitError> {
        self.entry_type_in(entry, &mut Vec::new())
    }

    fn entry_type_in(
        &self,
        entry: &'h ConfigEntry,
        stack: &mut Vec<&'h str>,
    ) -> Result<ValueType, EmitError> {
        let name = entry.name.as_str();
        if stack.contains(&name) {
            return Err(EmitError::Cycle {
                name: name.to_string(),
                span: entry.span,
            });
        }
        stack.push(name);

        let ty = match classify(entry) {
            DeclKind::SuidInstall => ValueType::Bool,
            DeclKind::RelocatedPath | DeclKind::RuntimeValue => {
                for token in &entry.value {
                    self.expect_type(entry, token, ValueType::Str, stack)?;
                }
                ValueType::Str
            }
            DeclKind::Constant => match entry.value.as_slice() {
                [token] => self.token_type(entry, token, stack)?,
                [first, rest @ ..] => {
                    let ty = self.token_type(entry, first, stack)?;
                    if !ty.is_additive() {
                        return Err(EmitError::TypeMismatch {
                            name: entry.name.clone(),
                            expected: ValueType::Str,
                            found: ty,
                            span: first.span.or(entry.span),
                        });
                    }
                    for token in rest {
                        self.expect_type(entry, token, ty, stack)?;
                    }
                    ty
                }
                [] => ValueType::Str,
            },
        };

        stack.pop();
        Ok(ty)
    }

    fn token_type(
        &self,
        entry: &'h ConfigEntry,
        token: &'h ValueToken,
        stack: &mut Vec<&'h str>,
    ) -> Result<ValueType, EmitError> {
        match token.kind {
            TokenKind::Str | TokenKind::RawStr => Ok(ValueType::Str),
            TokenKind::Int => Ok(ValueType::Int),
            TokenKind::Float => Ok(ValueType::Float),
            TokenKind::Char => match parse_c_char(&token.text) {
                Some(_) => Ok(ValueType::Char),
                None => Err(unsupported(entry, token)),
            },
            TokenKind::Ident => {
                let target = self.lookup(entry, token)?;
                self.entry_type_in(target, stack)
            }
            TokenKind::Other => {
                let parts = int_expression(&token.text).ok_or_else(|| unsupported(entry, token))?;
                for part in parts {
                    if let ExprPart::Name(name) = part {
                        let target = self.lookup_name(entry, name, token.span)?;
                        let found = self.entry_type_in(target, stack)?;
                        if found != ValueType::Int {
                            return Err(EmitError::TypeMismatch {
                                name: entry.name.clone(),
                                expected: ValueType::Int,
                                found,
                                span: token.span.or(entry.span),
                            });
                        }
                    }
                }
                Ok(ValueType::Int)
            }
        }
    }

    fn expect_type(
        &self,
        entry: &'h ConfigEntry,
        token: &'h ValueToken,
        expected: ValueType,
        stack: &mut Vec<&'h str>,
    ) -> Result<(), EmitError> {
        match self.token_type(entry, token, stack)? {
            found if found == expected => Ok(()),
            found => Err(EmitError::TypeMismatch {
                name: entry.name.clone(),
                expected,
                found,
                span: token.span.or(entry.span),
            }),
        }
    }

    /// String literals making up a constant, with referenced constants
    /// replaced by their own literals.
    pub fn fold_literals(&self, entry: &'h ConfigEntry) -> Result<Vec<&'h str>, EmitError> {
        let mut literals = Vec::new();
        self.fold_into(entry, entry, &mut literals, &mut Vec::new())?;
        Ok(literals)
    }

    fn fold_into(
        &self,
        root: &ConfigEntry,
        entry: &'h ConfigEntry,
        literals: &mut Vec<&'h str>,
        stack: &mut Vec<&'h str>,
    ) -> Result<(), EmitError> {
        let name = entry.name.as_str();
        if stack.contains(&name) {
            return Err(EmitError::Cycle {
                name: root.name.clone(),
                span: root.span,
            });
        }
        stack.push(name);

        for token in &entry.value {
            let found = match token.kind {
                TokenKind::Str | TokenKind::RawStr => {
                    literals.push(token.text.as_str());
                    continue;
                }
                TokenKind::Ident => {
                    let target = self.constant_target(root, entry, token)?;
                    self.fold_into(root, target, literals, stack)?;
                    continue;
                }
                TokenKind::Int | TokenKind::Other => ValueType::Int,
                TokenKind::Float => ValueType::Float,
                TokenKind::Char => ValueType::Char,
            };
            return Err(EmitError::TypeMismatch {
                name: root.name.clone(),
                expected: ValueType::Str,
                found,
                span: token.span.or(root.span),
            });
        }

        stack.pop();
        Ok(())
    }

    /// Resolves a name used inside the constant `root`, refusing run-time values.
    pub fn constant_target(
        &self,
        root: &ConfigEntry,
        entry: &ConfigEntry,
        token: &ValueToken,
    ) -> Result<&'h ConfigEntry, EmitError> {
        self.constant_name(root, entry, &token.text, token.span)
    }

    pub fn constant_name(
        &self,
        root: &ConfigEntry,
        entry: &ConfigEntry,
        name: &str,
        span: Option<Span>,
    ) -> Result<&'h ConfigEntry, EmitError> {
        let target = self.lookup_name(entry, name, span)?;
        if classify(target).is_runtime() {
            return Err(EmitError::ConstantNeedsRuntime {
                name: root.name.clone(),
                dependency: target.name.clone(),
                span: root.span,
            });
        }
        Ok(target)
    }
}

fn unsupported(entry: &ConfigEntry, token: &ValueToken) -> EmitError {
    EmitError::UnsupportedToken {
        name: entry.name.clone(),
        token: token.text.clone(),
        span: token.span.or(entry.span),
    }
}

/// Parses a C integer literal (decimal, `0x` hex, leading-zero octal,
/// `u`/`l` suffixes) into an `i64`.
pub(crate) fn parse_c_int(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i128::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i128>().ok()?
    };

    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Rewrites a C floating literal as a Rust `f64` literal.
pub(crate) fn float_literal(text: &str) -> String {
    let body = text.trim_end_matches(['f', 'F', 'l', 'L']);
    let (sign, body) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body),
    };
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => body.split_at(at),
        None => (body, ""),
    };
    // Rust wants digits on both sides of the point.
    let mantissa = match mantissa.split_once('.') {
        Some((int, frac)) => format!(
            "{}.{}",
            if int.is_empty() { "0" } else { int },
            if frac.is_empty() { "0" } else { frac }
        ),
        None => format!("{mantissa}.0"),
    };
    format!("{sign}{mantissa}{exponent}")
}

/// Decodes a single-character C literal such as `'a'`, `'\n'`, `'\101'` or `'\x41'`.
pub(crate) fn parse_c_char(text: &str) -> Option<char> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    if first != '\\' {
        return chars.next().is_none().then_some(first);
    }

    let rest = chars.as_str();
    let simple = match rest {
        "n" => Some('\n'),
        "t" => Some('\t'),
        "r" => Some('\r'),
        "a" => Some('\u{7}'),
        "b" => Some('\u{8}'),
        "f" => Some('\u{c}'),
        "v" => Some('\u{b}'),
        "\\" => Some('\\'),
        "'" => Some('\''),
        "\"" => Some('"'),
        "?" => Some('?'),
        _ => None,
    };
    if simple.is_some() {
        return simple;
    }

    let code = if let Some(hex) = rest.strip_prefix('x') {
        u32::from_str_radix(hex, 16).ok()?
    } else if (1..=3).contains(&rest.len()) && rest.chars().all(|c| c.is_digit(8)) {
        u32::from_str_radix(rest, 8).ok()?
    } else {
        return None;
    };
    char::from_u32(code)
}

/// Splits a C integer expression into literals, names and operators.
///
/// Returns `None` for anything that is not a well-formed, parenthesis-balanced
/// integer expression over `+ - * / % << >> & | ^ ~`.
pub(crate) fn int_expression(text: &str) -> Option<Vec<ExprPart<'_>>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }

        let part = if c.is_ascii_alphanumeric() || c == '_' {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            rest = &rest[end..];
            if c.is_ascii_digit() {
                ExprPart::Lit(parse_c_int(word)?)
            } else {
                ExprPart::Name(word)
            }
        } else {
            let op = EXPR_OPS.into_iter().find(|op| rest.starts_with(op))?;
            rest = &rest[op.len()..];
            match op {
                "(" => depth += 1,
                ")" => depth = depth.checked_sub(1)?,
                _ => {}
            }
            ExprPart::Op(op)
        };

        let operand = |p: &ExprPart<'_>| matches!(p, ExprPart::Lit(_) | ExprPart::Name(_));
        match (parts.last(), &part) {
            (Some(prev), next) if operand(prev) && operand(next) => return None,
            (Some(ExprPart::Op("(")), ExprPart::Op(")")) => return None,
            _ => {}
        }
        parts.push(part);
    }

    let has_operand = parts
        .iter()
        .any(|p| matches!(p, ExprPart::Lit(_) | ExprPart::Name(_)));
    (depth == 0 && has_operand).then_some(parts)
}
