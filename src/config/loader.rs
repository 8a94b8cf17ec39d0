//! Configuration file discovery and loading.
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults
//! 2. Config file (`--config`, or the user config under `$XDG_CONFIG_HOME`
//!    / `~/.config/apptainer-setup/config.yml` when present)
//! 3. `APPTAINER_SETUP_*` environment variables
//! 4. Command-line flags (applied by the caller via [`ConfigOverrides`])

use crate::config::schema::SetupConfig;
use crate::error::{Result, SetupError};
use crate::requirements::version::Version;
use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the minimum version.
pub const ENV_MIN_VERSION: &str = "APPTAINER_SETUP_MIN_VERSION";
/// Environment variable overriding the install directory.
pub const ENV_INSTALL_DIR: &str = "APPTAINER_SETUP_INSTALL_DIR";
/// Environment variable overriding the installer script location.
pub const ENV_INSTALLER_URL: &str = "APPTAINER_SETUP_INSTALLER_URL";
/// Environment variable pinning the version the installer fetches.
pub const ENV_INSTALLER_VERSION: &str = "APPTAINER_SETUP_INSTALLER_VERSION";

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub min_version: Option<String>,
    pub install_dir: Option<String>,
    pub installer_url: Option<String>,
}

/// Find the config file to load, if any.
///
/// An explicit path must exist. Otherwise the user config location is used
/// only when the file is present.
pub fn discover_config_path<F>(explicit: Option<&Path>, env_fn: &F) -> Result<Option<PathBuf>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(SetupError::ConfigValidationError {
                message: format!("Config file not found: {}", path.display()),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let config_home = env_fn("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env_fn("HOME").ok().map(|h| PathBuf::from(h).join(".config")));

    Ok(config_home
        .map(|dir| dir.join("apptainer-setup").join("config.yml"))
        .filter(|p| p.is_file()))
}

/// Parse a YAML config file.
pub fn load_config_file(path: &Path) -> Result<SetupConfig> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SetupConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|e| SetupError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply `APPTAINER_SETUP_*` variables on top of `config`.
pub fn apply_env_overrides<F>(config: &mut SetupConfig, env_fn: &F)
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let get = |key: &str| env_fn(key).ok().filter(|v| !v.is_empty());

    if let Some(v) = get(ENV_MIN_VERSION) {
        config.runtime.min_version = v;
    }
    if let Some(v) = get(ENV_INSTALL_DIR) {
        config.installer.install_dir = v;
    }
    if let Some(v) = get(ENV_INSTALLER_URL) {
        config.installer.url = v;
    }
    if let Some(v) = get(ENV_INSTALLER_VERSION) {
        config.installer.version = Some(v);
    }
}

/// Apply command-line values on top of `config`.
pub fn apply_overrides(config: &mut SetupConfig, overrides: &ConfigOverrides) {
    if let Some(v) = &overrides.min_version {
        config.runtime.min_version = v.clone();
    }
    if let Some(v) = &overrides.install_dir {
        config.installer.install_dir = v.clone();
    }
    if let Some(v) = &overrides.installer_url {
        config.installer.url = v.clone();
    }
}

/// Check the merged configuration for values the run cannot work with.
pub fn validate(config: &SetupConfig) -> Result<()> {
    let invalid = |message: String| Err(SetupError::ConfigValidationError { message });

    if config.runtime.binaries.is_empty() {
        return invalid("runtime.binaries must name at least one binary".to_string());
    }
    if config.runtime.binaries.iter().any(|b| b.trim().is_empty()) {
        return invalid("runtime.binaries must not contain empty names".to_string());
    }
    if config.runtime.version_token == 0 {
        return invalid("runtime.version_token is 1-based and must be at least 1".to_string());
    }
    if let Err(e) = Version::parse(&config.runtime.min_version) {
        return invalid(format!("runtime.min_version: {}", e));
    }
    if config.installer.url.trim().is_empty() {
        return invalid("installer.url must not be empty".to_string());
    }
    if config.installer.install_dir.trim().is_empty() {
        return invalid("installer.install_dir must not be empty".to_string());
    }
    Ok(())
}

/// Load, layer, and validate the configuration.
pub fn load_config<F>(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
    env_fn: &F,
) -> Result<SetupConfig>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let mut config = match discover_config_path(explicit, env_fn)? {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => SetupConfig::default(),
    };

    apply_env_overrides(&mut config, env_fn);
    apply_overrides(&mut config, overrides);
    validate(&config)?;
    Ok(config)
}
