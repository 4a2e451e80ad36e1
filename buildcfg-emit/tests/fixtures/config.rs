// Code generated by buildcfg. DO NOT EDIT.

const BUILD_PREFIX: &str = "/usr/local";

// ---- relocation runtime ----

use std::io;
use std::path::{Component, Path, PathBuf};
#[allow(unused_imports)]
use std::sync::LazyLock;
use std::sync::OnceLock;

const FRONTEND_BINARY: &str = "apptainer";
const HELPER_BINARIES: [&str; 2] = ["starter", "starter-suid"];
const SUID_HELPER: &str = "libexec/apptainer/bin/starter-suid";
const ROOT_RELATIVE_DIRS: [&str; 2] = ["/etc/apptainer", "/var/apptainer"];

/// Why a build-time path was not moved under the discovered prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelocationError {
    /// A setuid starter is installed; its trusted paths are never redirected.
    SuidInstall { original: String },
    NotRelative { original: String, base: String },
    NonUtf8 { original: String },
}

impl std::fmt::Display for RelocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuidInstall { original } => {
                write!(f, "relocation of {original} not allowed with starter-suid")
            }
            Self::NotRelative { original, base } => {
                write!(f, "cannot make {original} relative to {base}")
            }
            Self::NonUtf8 { original } => {
                write!(f, "relocated path for {original} is not valid UTF-8")
            }
        }
    }
}

impl std::error::Error for RelocationError {}

/// Where the running program is installed, discovered at most once.
pub struct Installation {
    build_prefix: &'static str,
    executable: fn() -> io::Result<PathBuf>,
    prefix: OnceLock<PathBuf>,
    suid_install: OnceLock<bool>,
}

impl Installation {
    pub const fn new(build_prefix: &'static str) -> Self {
        Self::with_executable(build_prefix, std::env::current_exe)
    }

    pub const fn with_executable(
        build_prefix: &'static str,
        executable: fn() -> io::Result<PathBuf>,
    ) -> Self {
        Self {
            build_prefix,
            executable,
            prefix: OnceLock::new(),
            suid_install: OnceLock::new(),
        }
    }

    pub fn build_prefix(&self) -> &'static str {
        self.build_prefix
    }

    /// Install prefix derived from the executable location.
    ///
    /// `PREFIX/bin/apptainer` and `PREFIX/libexec/apptainer/bin/starter{,-suid}`
    /// are recognised; any other executable keeps the build prefix.
    pub fn prefix(&self) -> &Path {
        self.prefix.get_or_init(|| self.discover_prefix())
    }

    fn discover_prefix(&self) -> PathBuf {
        let executable = match (self.executable)() {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(error = %err, "error getting executable path, using default prefix");
                return PathBuf::from(self.build_prefix);
            }
        };

        let prefix = match executable.file_name().and_then(|name| name.to_str()) {
            Some(FRONTEND_BINARY) => dirname(&executable, 2),
            Some(name) if HELPER_BINARIES.contains(&name) => dirname(&executable, 4),
            _ => PathBuf::from(self.build_prefix),
        };
        tracing::debug!(prefix = %prefix.display(), "install prefix");
        prefix
    }

    /// Whether a setuid starter exists under the install prefix.
    ///
    /// Checked once: a symlink slipped in after the first answer cannot
    /// turn a non-suid install into one that trusts a foreign config.
    pub fn is_suid_install(&self) -> bool {
        *self
            .suid_install
            .get_or_init(|| self.prefix().join(SUID_HELPER).metadata().is_ok())
    }

    /// Moves a build-time path under the discovered install prefix.
    pub fn relocate(&self, original: &str) -> Result<String, RelocationError> {
        let build_prefix = self.build_prefix;
        if build_prefix.is_empty() || build_prefix == "/" {
            return Ok(original.to_string());
        }

        let root_relative = if original.starts_with(build_prefix) {
            false
        } else if ROOT_RELATIVE_DIRS.iter().any(|dir| original.starts_with(dir)) {
            // Packages put these outside the prefix.
            true
        } else {
            return Ok(original.to_string());
        };

        let prefix = self.prefix();
        if prefix == Path::new(build_prefix) {
            return Ok(original.to_string());
        }

        if self.is_suid_install() {
            return Err(RelocationError::SuidInstall {
                original: original.to_string(),
            });
        }

        let base = if root_relative { "/" } else { build_prefix };
        let relative = lexical_relative(Path::new(base), Path::new(original)).ok_or_else(|| {
            RelocationError::NotRelative {
                original: original.to_string(),
                base: base.to_string(),
            }
        })?;

        lexical_join(prefix, &relative)
            .into_os_string()
            .into_string()
            .map_err(|_| RelocationError::NonUtf8 {
                original: original.to_string(),
            })
    }

    /// Like [`Installation::relocate`], but a refusal terminates the process.
    pub fn relocate_or_exit(&self, original: &str) -> String {
        match self.relocate(original) {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(error = %err, "fatal relocation error");
                eprintln!("FATAL:   {err}");
                std::process::exit(255);
            }
        }
    }
}

/// `levels` applications of `dirname`; the parent of `/` is `/`.
fn dirname(path: &Path, levels: usize) -> PathBuf {
    let mut dir = path;
    for _ in 0..levels {
        dir = match dir.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => dir,
        };
    }
    dir.to_path_buf()
}

fn lexical_components(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !matches!(out.last(), Some(Component::RootDir | Component::Prefix(_))) {
                    out.push(component);
                }
            }
            _ => out.push(component),
        }
    }
    out
}

fn lexical_relative(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = lexical_components(base);
    let target = lexical_components(target);

    let is_absolute = |c: &[Component<'_>]| {
        matches!(c.first(), Some(Component::RootDir | Component::Prefix(_)))
    };
    if is_absolute(&base) != is_absolute(&target) {
        return None;
    }

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if base[common..].contains(&Component::ParentDir) {
        return None;
    }

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    Some(relative)
}

fn lexical_join(prefix: &Path, relative: &Path) -> PathBuf {
    let joined = prefix.join(relative);
    lexical_components(&joined).into_iter().collect()
}

static INSTALLATION: Installation = Installation::new(BUILD_PREFIX);

pub fn install_prefix() -> &'static Path {
    INSTALLATION.prefix()
}

pub fn is_suid_install() -> bool {
    INSTALLATION.is_suid_install()
}

/// Relocates `original`, terminating the process if relocation is refused.
pub fn relocate_path(original: &str) -> String {
    INSTALLATION.relocate_or_exit(original)
}

pub const PREFIX: &str = "/usr/local";
pub static BINDIR: LazyLock<String> = LazyLock::new(|| relocate_path("/usr/local/bin"));
pub static LIBEXECDIR: LazyLock<String> = LazyLock::new(|| relocate_path("/usr/local/libexec"));
pub static SYSCONFDIR: LazyLock<String> = LazyLock::new(|| relocate_path("/usr/local/etc"));
pub const LOCALSTATEDIR: &str = "/usr/local/var";
pub static SESSIONDIR: LazyLock<String> = LazyLock::new(|| relocate_path("/usr/local/var/apptainer/mnt/session"));
pub static APPTAINER_CONFDIR: LazyLock<String> = LazyLock::new(|| relocate_path("/usr/local/etc/apptainer"));
pub static APPTAINER_CONF_FILE: LazyLock<String> = LazyLock::new(|| [APPTAINER_CONFDIR.as_str(), "/apptainer.conf"].concat());
pub static PLUGIN_ROOTDIR: LazyLock<String> = LazyLock::new(|| relocate_path(&[LIBEXECDIR.as_str(), "/apptainer/plugin"].concat()));
pub const CONTAINER_MOUNTDIR: &str = concat!("/usr/local/var", "/apptainer/mnt/container");
pub static APPTAINER_SUID_INSTALL: LazyLock<bool> = LazyLock::new(is_suid_install);
pub const PACKAGE_VERSION: &str = "1.3.0";
pub const MAX_LOOP_DEVICES: i64 = 256;
pub const LOOP_MASK: i64 = 16 | 1;
pub const RATIO: f64 = 1.5;
pub const SEPARATOR: char = ':';
