#![forbid(unsafe_code)]

use buildcfg_header::{ConfigEntry, TokenKind, ValueToken};

use crate::classify::{classify, DeclKind};
use crate::resolve::{
    float_literal, int_expression, parse_c_char, parse_c_int, ExprPart, Symbols, ValueType,
};
use crate::EmitError;

/// One rendered item of the generated module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub ty: ValueType,
    /// Rust source of the item, without a trailing newline.
    pub source: String,
}

pub(crate) fn render_declaration<'h>(
    entry: &'h ConfigEntry,
    symbols: &Symbols<'h>,
) -> Result<Declaration, EmitError> {
    let kind = classify(entry);
    let ty = symbols.entry_type(entry)?;
    let name = entry.name.as_str();

    let source = match kind {
        DeclKind::SuidInstall => {
            format!("pub static {name}: LazyLock<bool> = LazyLock::new(is_suid_install);")
        }
        DeclKind::RelocatedPath => {
            let arg = match string_operands(entry, symbols)?.as_slice() {
                [one] => one.clone(),
                many => format!("&[{}].concat()", many.join(", ")),
            };
            format!("pub static {name}: LazyLock<String> = LazyLock::new(|| relocate_path({arg}));")
        }
        DeclKind::RuntimeValue => {
            let expr = match string_operands(entry, symbols)?.as_slice() {
                [one] => format!("String::from({one})"),
                many => format!("[{}].concat()", many.join(", ")),
            };
            format!("pub static {name}: LazyLock<String> = LazyLock::new(|| {expr});")
        }
        DeclKind::Constant => {
            let expr = constant_expression(entry, ty, symbols)?;
            format!("pub const {name}: {} = {expr};", ty.const_type())
        }
    };

    Ok(Declaration {
        name: name.to_string(),
        kind,
        ty,
        source,
    })
}

/// `&str` operands of a run-time string, in header order.
fn string_operands<'h>(
    entry: &'h ConfigEntry,
    symbols: &Symbols<'h>,
) -> Result<Vec<String>, EmitError> {
    entry
        .value
        .iter()
        .map(|token| match token.kind {
            TokenKind::Ident => {
                let target = symbols.lookup(entry, token)?;
                Ok(if classify(target).is_runtime() {
                    format!("{}.as_str()", target.name)
                } else {
                    target.name.clone()
                })
            }
            _ => Ok(token.text.clone()),
        })
        .collect()
}

fn constant_expression<'h>(
    entry: &'h ConfigEntry,
    ty: ValueType,
    symbols: &Symbols<'h>,
) -> Result<String, EmitError> {
    match (entry.value.as_slice(), ty) {
        ([token], _) if !token.is_string() => constant_operand(entry, token, symbols),
        (tokens, ValueType::Int | ValueType::Float) => {
            let operands = tokens
                .iter()
                .map(|token| constant_operand(entry, token, symbols))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(operands.join(" + "))
        }
        _ => {
            debug_assert_eq!(ty, ValueType::Str);
            let literals = symbols.fold_literals(entry)?;
            Ok(match literals.as_slice() {
                [one] => one.to_string(),
                many => format!("concat!({})", many.join(", ")),
            })
        }
    }
}

/// A single non-string operand of a constant, as Rust source.
fn constant_operand<'h>(
    entry: &'h ConfigEntry,
    token: &'h ValueToken,
    symbols: &Symbols<'h>,
) -> Result<String, EmitError> {
    let unsupported = || EmitError::UnsupportedToken {
        name: entry.name.clone(),
        token: token.text.clone(),
        span: token.span.or(entry.span),
    };

    match token.kind {
        TokenKind::Ident => Ok(symbols.constant_target(entry, entry, token)?.name.clone()),
        TokenKind::Int => parse_c_int(&token.text)
            .map(|value| value.to_string())
            .ok_or_else(|| EmitError::InvalidInteger {
                name: entry.name.clone(),
                token: token.text.clone(),
                span: token.span.or(entry.span),
            }),
        TokenKind::Float => Ok(float_literal(&token.text)),
        TokenKind::Char => parse_c_char(&token.text)
            .map(|c| format!("{c:?}"))
            .ok_or_else(unsupported),
        TokenKind::Other => {
            let parts = int_expression(&token.text).ok_or_else(unsupported)?;
            render_int_expression(entry, token, &parts, symbols)
        }
        TokenKind::Str | TokenKind::RawStr => Ok(token.text.clone()),
    }
}

fn render_int_expression<'h>(
    entry: &'h ConfigEntry,
    token: &ValueToken,
    parts: &[ExprPart<'_>],
    symbols: &Symbols<'h>,
) -> Result<String, EmitError> {
    let mut out = String::new();
    let mut prev: Option<ExprPart<'_>> = None;
    let mut prev_unary = false;

    for &part in strip_outer_parens(parts) {
        let follows_operand = match prev {
            None => false,
            Some(ExprPart::Op(op)) => op == ")",
            Some(_) => true,
        };
        let unary = matches!(part, ExprPart::Op("-" | "+" | "~")) && !follows_operand;

        let tight = prev.is_none()
            || prev_unary
            || matches!(prev, Some(ExprPart::Op("(")))
            || matches!(part, ExprPart::Op(")"));
        if !tight {
            out.push(' ');
        }

        match part {
            ExprPart::Lit(value) => out.push_str(&value.to_string()),
            ExprPart::Name(name) => {
                let target = symbols.constant_name(entry, entry, name, token.span)?;
                out.push_str(&target.name);
            }
            ExprPart::Op("~") => out.push('!'),
            ExprPart::Op(op) => out.push_str(op),
        }

        prev = Some(part);
        prev_unary = unary;
    }
    Ok(out)
}

/// Drops parentheses that enclose the whole expression.
fn strip_outer_parens<'p, 'a>(mut parts: &'p [ExprPart<'a>]) -> &'p [ExprPart<'a>] {
    while let [ExprPart::Op("("), inner @ .., ExprPart::Op(")")] = parts {
        let mut depth = 0usize;
        let balanced = inner.iter().all(|part| {
            match part {
                ExprPart::Op("(") => depth += 1,
                ExprPart::Op(")") if depth == 0 => return false,
                ExprPart::Op(")") => depth -= 1,
                _ => {}
            }
            true
        });
        if !balanced || depth != 0 {
            break;
        }
        parts = inner;
    }
    parts
}
