#![forbid(unsafe_code)]

use buildcfg_header::ConfigEntry;

/// Paths that depend on where the program is installed.
pub const RELOCATABLE_NAMES: [&str; 6] = [
    "BINDIR",
    "LIBEXECDIR",
    "SYSCONFDIR",
    "SESSIONDIR",
    "APPTAINER_CONFDIR",
    "PLUGIN_ROOTDIR",
];

pub const SUID_INSTALL_NAME: &str = "APPTAINER_SUID_INSTALL";

/// Values whose text mentions this name are resolved at run time.
pub const CONFDIR_NAME: &str = "APPTAINER_CONFDIR";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `pub const`, fixed at build time.
    Constant,
    /// `pub static` passed through `relocate_path` on first use.
    RelocatedPath,
    /// `pub static` answered by `is_suid_install`; the header value is ignored.
    SuidInstall,
    /// `pub static` whose expression reads a relocated path.
    RuntimeValue,
}

impl DeclKind {
    pub fn is_runtime(self) -> bool {
        self != DeclKind::Constant
    }
}

pub fn classify(entry: &ConfigEntry) -> DeclKind {
    let name = entry.name.as_str();
    if RELOCATABLE_NAMES.contains(&name) {
        DeclKind::RelocatedPath
    } else if name == SUID_INSTALL_NAME {
        DeclKind::SuidInstall
    } else if entry.expression().contains(CONFDIR_NAME) {
        // Textual, not a dependency graph: `FOO "/x/APPTAINER_CONFDIR"` also qualifies.
        DeclKind::RuntimeValue
    } else {
        DeclKind::Constant
    }
}
