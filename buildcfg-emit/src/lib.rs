#![forbid(unsafe_code)]

//! Renders extracted header entries as a Rust module whose install paths are
//! resolved against the running executable's location.

mod classify;
mod error;
mod render;
mod resolve;

use buildcfg_header::Header;
use tracing::{debug, info};

pub use classify::{classify, DeclKind, CONFDIR_NAME, RELOCATABLE_NAMES, SUID_INSTALL_NAME};
pub use error::EmitError;
pub use render::Declaration;
pub use resolve::ValueType;

use render::render_declaration;
use resolve::Symbols;

pub const GENERATED_BANNER: &str = "// Code generated by buildcfg. DO NOT EDIT.";

/// Prefix discovery, suid detection and path relocation. Expects a
/// `BUILD_PREFIX: &str` constant in the including module.
pub const RUNTIME_SUPPORT: &str = include_str!("runtime.rs.in");

/// Classifies and renders every entry, in header order.
pub fn declarations(header: &Header) -> Result<Vec<Declaration>, EmitError> {
    let symbols = Symbols::new(&header.entries);
    header
        .entries
        .iter()
        .map(|entry| {
            let decl = render_declaration(entry, &symbols)?;
            debug!(name = %decl.name, kind = ?decl.kind, ty = %decl.ty, "rendered declaration");
            Ok(decl)
        })
        .collect()
}

/// Renders the complete module text.
pub fn emit_module(header: &Header) -> Result<String, EmitError> {
    let decls = declarations(header)?;

    let mut out = String::new();
    out.push_str(GENERATED_BANNER);
    out.push_str("\n\n");
    out.push_str(&format!("const BUILD_PREFIX: &str = \"{}\";\n\n", header.prefix));
    out.push_str(RUNTIME_SUPPORT);
    out.push('\n');
    for decl in &decls {
        out.push_str(&decl.source);
        out.push('\n');
    }

    let runtime = decls.iter().filter(|d| d.kind.is_runtime()).count();
    info!(
        declarations = decls.len(),
        runtime,
        prefix = %header.prefix,
        "rendered configuration module"
    );
    Ok(out)
}
