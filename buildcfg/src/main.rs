#![forbid(unsafe_code)]

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser};
use miette::{Diagnostic, NamedSource};
use thiserror::Error;
use tracing::info;

use buildcfg_emit::emit_module;
use buildcfg_header::{extract, read_header};

const LOG_ENV: &str = "BUILDCFG_LOG";

/// Turns the configure-generated `config.h` into a Rust configuration module
/// whose install paths follow the binary when the tree is moved.
#[derive(Parser, Debug)]
#[command(name = "buildcfg", version)]
struct Cli {
    /// C header containing `#define NAME VALUE` lines
    #[arg(value_name = "HEADER")]
    header: PathBuf,

    /// Where to write the generated module
    #[arg(short, long, default_value = "config.rs")]
    output: PathBuf,

    /// Build tags recorded as `GO_BUILD_TAGS`
    #[arg(long, env = "GO_BUILD_TAGS")]
    build_tags: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error, Diagnostic)]
enum OutputError {
    #[error("cannot create a temporary file next to {}", .path.display())]
    #[diagnostic(code(buildcfg::output::create))]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", .path.display())]
    #[diagnostic(code(buildcfg::output::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

/// Writes `contents` to a sibling temp file and renames it over `path`.
fn write_atomically(path: &Path, contents: &str) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tmp.persist(path).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = read_header(&cli.header)?;
    let named = || NamedSource::new(cli.header.display().to_string(), source.clone());

    let build_tags = cli.build_tags.as_deref().filter(|tags| !tags.is_empty());
    let header = extract(&source, build_tags)
        .map_err(|e| miette::Report::new(e).with_source_code(named()))?;

    let module =
        emit_module(&header).map_err(|e| miette::Report::new(e).with_source_code(named()))?;

    write_atomically(&cli.output, &module)?;
    info!(output = %cli.output.display(), "wrote configuration module");
    Ok(())
}
