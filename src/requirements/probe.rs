//! Runtime probe for locating the container runtime binary.
//!
//! An unprivileged install puts the runtime under `<install_dir>/bin`, which
//! is usually not on the user's PATH yet. The `RuntimeProbe` searches that
//! directory first and then the system PATH, so a fresh install is found on
//! re-check without the user editing their shell profile.
//!
//! # Example
//!
//! ```no_run
//! use apptainer_setup::requirements::probe::RuntimeProbe;
//! use std::path::Path;
//!
//! let probe = RuntimeProbe::new(Path::new("/home/me/.local/apptainer"));
//! if let Some(found) = probe.find_runtime(&["apptainer".to_string()]) {
//!     println!("{} at {}", found.name, found.path.display());
//! }
//! ```

use crate::requirements::status::RuntimeBinary;
use std::path::{Path, PathBuf};

/// Search path used to locate the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeProbe {
    install_bin: PathBuf,
    install_bin_on_path: bool,
    search_path: Vec<PathBuf>,
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command, whose behavior varies across systems.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

impl RuntimeProbe {
    /// Probe using the system PATH with `<install_dir>/bin` in front.
    pub fn new(install_dir: &Path) -> Self {
        Self::with_path(install_dir, parse_system_path())
    }

    /// Probe with an explicit base search path.
    pub fn with_path(install_dir: &Path, system_path: Vec<PathBuf>) -> Self {
        let install_bin = install_dir.join("bin");
        let install_bin_on_path = system_path.contains(&install_bin);
        let mut search_path = vec![install_bin.clone()];
        search_path.extend(system_path.into_iter().filter(|p| *p != install_bin));
        Self {
            install_bin,
            install_bin_on_path,
            search_path,
        }
    }

    /// Directory the installer places binaries in.
    pub fn install_bin(&self) -> &Path {
        &self.install_bin
    }

    /// Whether the user's own PATH already includes [`install_bin`](Self::install_bin).
    pub fn install_bin_on_path(&self) -> bool {
        self.install_bin_on_path
    }

    /// Find the first available runtime among `names`, in order.
    ///
    /// A match on anything but the first name is a fallback configured by the
    /// user and is logged as a warning.
    pub fn find_runtime(&self, names: &[String]) -> Option<RuntimeBinary> {
        for (index, name) in names.iter().enumerate() {
            if let Some(path) = resolve_tool_path(name, &self.search_path) {
                if index > 0 {
                    tracing::warn!(
                        "{} not found, using {} at {} as fallback",
                        names[0],
                        name,
                        path.display()
                    );
                } else {
                    tracing::debug!("Found {} at {}", name, path.display());
                }
                return Some(RuntimeBinary {
                    name: name.clone(),
                    path,
                });
            }
        }
        tracing::debug!("No runtime among {:?} on search path", names);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn install_bin_is_searched_first() {
        let temp = TempDir::new().unwrap();
        let probe = RuntimeProbe::with_path(temp.path(), vec![PathBuf::from("/usr/bin")]);
        assert_eq!(probe.search_path[0], temp.path().join("bin"));
        assert_eq!(probe.search_path[1], PathBuf::from("/usr/bin"));
        assert!(!probe.install_bin_on_path());
    }

    #[test]
    fn install_bin_is_not_duplicated() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let probe = RuntimeProbe::with_path(temp.path(), vec![bin.clone(), bin]);
        assert_eq!(probe.search_path.len(), 1);
        assert!(probe.install_bin_on_path());
    }

    #[test]
    fn resolve_tool_path_misses_nonexistent() {
        let temp = TempDir::new().unwrap();
        let result = resolve_tool_path("nonexistent-runtime-xyz", &[temp.path().to_path_buf()]);
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_skips_non_executable() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("apptainer"), "not a program").unwrap();
        let result = resolve_tool_path("apptainer", &[temp.path().to_path_buf()]);
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn find_runtime_prefers_first_name() {
        let temp = TempDir::new().unwrap();
        let sys = temp.path().join("sys");
        make_executable(&sys, "apptainer");
        make_executable(&sys, "singularity");
        let probe = RuntimeProbe::with_path(&temp.path().join("install"), vec![sys]);

        let found = probe
            .find_runtime(&["apptainer".to_string(), "singularity".to_string()])
            .unwrap();
        assert_eq!(found.name, "apptainer");
    }

    #[cfg(unix)]
    #[test]
    fn find_runtime_falls_back_to_later_name() {
        let temp = TempDir::new().unwrap();
        let sys = temp.path().join("sys");
        make_executable(&sys, "singularity");
        let probe = RuntimeProbe::with_path(&temp.path().join("install"), vec![sys]);

        let found = probe
            .find_runtime(&["apptainer".to_string(), "singularity".to_string()])
            .unwrap();
        assert_eq!(found.name, "singularity");
    }

    #[cfg(unix)]
    #[test]
    fn install_dir_binary_shadows_system_binary() {
        let temp = TempDir::new().unwrap();
        let install = temp.path().join("install");
        let sys = temp.path().join("sys");
        make_executable(&sys, "apptainer");
        let installed = make_executable(&install.join("bin"), "apptainer");
        let probe = RuntimeProbe::with_path(&install, vec![sys]);

        let found = probe.find_runtime(&["apptainer".to_string()]).unwrap();
        assert_eq!(found.path, installed);
        assert!(found.path.starts_with(probe.install_bin()));
    }

    #[test]
    fn find_runtime_returns_none_when_absent() {
        let temp = TempDir::new().unwrap();
        let probe = RuntimeProbe::with_path(temp.path(), vec![]);
        assert!(probe.find_runtime(&["apptainer".to_string()]).is_none());
    }

    #[test]
    fn is_elevated_does_not_panic() {
        let _ = is_elevated();
    }
}
