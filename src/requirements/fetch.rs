//! Installer script retrieval and execution.
//!
//! The unprivileged installer is a shell script published upstream. It is
//! fetched over HTTP(S), or read from disk for mirrors and offline hosts,
//! and piped into `bash -s --` so nothing is written to a temp file.

use crate::error::{Result, SetupError};
use crate::shell::{display_command, execute, CommandOptions, CommandResult};
use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the installer script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// `http://` or `https://` URL.
    Http(String),
    /// Local file, given as a path or `file://` URL.
    File(PathBuf),
}

impl ScriptSource {
    /// Classify a configured installer location.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ScriptSource::Http(location.to_string())
        } else if lower.starts_with("file://") {
            ScriptSource::File(PathBuf::from(&location["file://".len()..]))
        } else {
            ScriptSource::File(PathBuf::from(location))
        }
    }

    /// Human-readable location for messages.
    pub fn describe(&self) -> String {
        match self {
            ScriptSource::Http(url) => url.clone(),
            ScriptSource::File(path) => path.display().to_string(),
        }
    }
}

/// Fetches installer scripts.
pub struct ScriptFetcher {
    client: Client,
    timeout: Duration,
}

impl ScriptFetcher {
    /// Create a fetcher with the default 30-second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("apptainer-setup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retrieve the script text.
    pub fn fetch(&self, source: &ScriptSource) -> Result<String> {
        let result = match source {
            ScriptSource::Http(url) => self.fetch_http(url),
            ScriptSource::File(path) => read_file(path),
        };
        result.map_err(|e| SetupError::InstallerFetch {
            source_ref: source.describe(),
            message: format!("{:#}", e),
        })
    }

    fn fetch_http(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            bail!("HTTP {}", response.status());
        }

        let content = response.text()?;
        if content.trim().is_empty() {
            bail!("empty response body");
        }
        Ok(content)
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    if content.trim().is_empty() {
        bail!("script is empty");
    }
    Ok(content)
}

/// Everything needed to run the installer once.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    /// Script location.
    pub source: ScriptSource,
    /// Destination directory handed to the script.
    pub install_dir: PathBuf,
    /// Runtime version to request from the script (`-v`).
    pub version: Option<String>,
    /// Additional script arguments.
    pub extra_args: Vec<String>,
    /// Show the script's stdout (stderr is always shown).
    pub show_output: bool,
}

impl InstallPlan {
    /// Arguments for `bash`: read the script from stdin, then the script's own args.
    pub fn bash_args(&self) -> Vec<String> {
        let mut args = vec!["-s".to_string(), "--".to_string()];
        if let Some(version) = &self.version {
            args.push("-v".to_string());
            args.push(version.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(self.install_dir.display().to_string());
        args
    }
}

/// Fetch the script and run it with `bash`.
///
/// The script's exit status is returned, not judged; callers decide by
/// re-checking the runtime.
pub fn run_install_plan(plan: &InstallPlan, fetcher: &ScriptFetcher) -> Result<CommandResult> {
    let script = fetcher.fetch(&plan.source)?;

    if let Some(parent) = plan.install_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let bash = Path::new("bash");
    let args = plan.bash_args();
    tracing::info!(
        "Running installer from {}: {}",
        plan.source.describe(),
        display_command(bash, &args)
    );

    let options = CommandOptions {
        capture_stdout: !plan.show_output,
        capture_stderr: false,
        stdin: Some(script),
        ..Default::default()
    };
    execute(bash, &args, &options)
}
