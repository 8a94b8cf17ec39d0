//! Configuration schema.
//!
//! Every field has a default, so an empty or absent config file yields the
//! stock behavior: require Apptainer 1.2.0 and install it unprivileged into
//! `~/.local/apptainer` using the upstream script.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Minimum runtime version required when nothing overrides it.
pub const DEFAULT_MIN_VERSION: &str = "1.2.0";

/// Upstream unprivileged install script.
pub const DEFAULT_INSTALLER_URL: &str =
    "https://raw.githubusercontent.com/apptainer/apptainer/main/tools/install-unprivileged.sh";

/// Default unprivileged install location.
pub const DEFAULT_INSTALL_DIR: &str = "~/.local/apptainer";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// How to find and version-check the runtime.
    pub runtime: RuntimeConfig,

    /// How to install the runtime.
    pub installer: InstallerConfig,
}

/// Runtime detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Binary names to look for, in order of preference. Only `apptainer` by
    /// default: `singularity` numbers its releases 3.x, so the minimum means
    /// nothing against it.
    pub binaries: Vec<String>,

    /// Arguments that make the binary print its version.
    pub version_args: Vec<String>,

    /// 1-based whitespace-separated token of the version output to use.
    pub version_token: usize,

    /// Minimum acceptable version.
    pub min_version: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binaries: vec!["apptainer".to_string()],
            version_args: vec!["--version".to_string()],
            version_token: 2,
            min_version: DEFAULT_MIN_VERSION.to_string(),
        }
    }
}

/// Installer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Script location: http(s) URL, `file://` URL, or filesystem path.
    pub url: String,

    /// Install destination; a leading `~/` expands to `$HOME`.
    pub install_dir: String,

    /// Specific runtime version for the script to install (`-v`).
    pub version: Option<String>,

    /// Extra arguments passed to the script before the install directory.
    pub extra_args: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_INSTALLER_URL.to_string(),
            install_dir: DEFAULT_INSTALL_DIR.to_string(),
            version: None,
            extra_args: Vec::new(),
        }
    }
}

impl InstallerConfig {
    /// Install directory with `~` expanded against `home`.
    pub fn resolved_install_dir(&self, home: Option<&Path>) -> PathBuf {
        expand_home(&self.install_dir, home)
    }
}

/// Expand a leading `~` or `~/` against `home`. Other paths pass through.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
