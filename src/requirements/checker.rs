//! Runtime version checking.
//!
//! The `RuntimeChecker` locates the runtime, asks it for its version, and
//! compares the result with the configured minimum. Binary lookup and the
//! version query go through a [`CheckerContext`] so the decision logic can
//! be exercised without spawning processes.

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::requirements::probe::RuntimeProbe;
use crate::requirements::status::{RuntimeBinary, RuntimeStatus};
use crate::requirements::version::{is_at_least, Version};
use crate::shell::{execute_quiet, CommandResult};
use regex::Regex;
use std::sync::LazyLock;

/// A token that looks like the start of a version number.
static VERSION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d").expect("VERSION_START must compile"));

/// Mockable dependencies for the checker.
pub struct CheckerContext<'a> {
    /// Find the first available binary among the given names.
    pub locate: &'a dyn Fn(&[String]) -> Option<RuntimeBinary>,
    /// Run the binary with the given arguments, capturing its output.
    pub query_version: &'a dyn Fn(&RuntimeBinary, &[String]) -> Result<CommandResult>,
}

/// Build the production context on top of a probe.
pub fn probe_context(
    probe: &RuntimeProbe,
) -> (
    impl Fn(&[String]) -> Option<RuntimeBinary> + '_,
    impl Fn(&RuntimeBinary, &[String]) -> Result<CommandResult>,
) {
    let locate = move |names: &[String]| probe.find_runtime(names);
    let query = |binary: &RuntimeBinary, args: &[String]| execute_quiet(&binary.path, args);
    (locate, query)
}

/// Checks whether the installed runtime meets the minimum version.
pub struct RuntimeChecker<'a> {
    settings: RuntimeConfig,
    minimum: String,
    ctx: CheckerContext<'a>,
}

impl<'a> RuntimeChecker<'a> {
    /// Create a checker. Fails if the configured minimum is not a supported version.
    pub fn new(settings: &RuntimeConfig, ctx: CheckerContext<'a>) -> Result<Self> {
        Version::parse(&settings.min_version)?;
        Ok(Self {
            settings: settings.clone(),
            minimum: settings.min_version.clone(),
            ctx,
        })
    }

    /// The minimum version being enforced.
    pub fn minimum(&self) -> &str {
        &self.minimum
    }

    /// Name of the preferred runtime binary, for messages.
    pub fn runtime_name(&self) -> &str {
        self.settings
            .binaries
            .first()
            .map(String::as_str)
            .unwrap_or("runtime")
    }

    /// Locate the runtime and evaluate its version.
    pub fn check(&self) -> RuntimeStatus {
        let Some(binary) = (self.ctx.locate)(&self.settings.binaries) else {
            return RuntimeStatus::Missing {
                required: self.minimum.clone(),
            };
        };

        let result = match (self.ctx.query_version)(&binary, &self.settings.version_args) {
            Ok(result) => result,
            Err(e) => {
                return RuntimeStatus::Unrecognized {
                    binary,
                    output: None,
                    reason: e.to_string(),
                }
            }
        };

        let output = if result.stdout.trim().is_empty() {
            result.stderr.clone()
        } else {
            result.stdout.clone()
        };

        if !result.success {
            return RuntimeStatus::Unrecognized {
                binary,
                output: Some(output),
                reason: format!("version query exited with code {:?}", result.exit_code),
            };
        }

        let Some(version) = extract_version(&output, self.settings.version_token) else {
            return RuntimeStatus::Unrecognized {
                binary,
                output: Some(output),
                reason: "no version number in output".to_string(),
            };
        };

        tracing::debug!("{} reports version {}", binary.name, version);

        match is_at_least(&version, &self.minimum) {
            Ok(true) => RuntimeStatus::Satisfied { binary, version },
            Ok(false) => RuntimeStatus::Outdated {
                binary,
                installed: version,
                required: self.minimum.clone(),
            },
            Err(e) => RuntimeStatus::Unrecognized {
                binary,
                output: Some(output),
                reason: e.to_string(),
            },
        }
    }
}

/// Pick the version token out of a version command's output.
///
/// `token` is the 1-based whitespace-separated position to use. When that
/// token does not start like a version (e.g. the word `version` in
/// `apptainer version 1.3.4`), the first token that does is used instead.
/// A leading `v` is stripped; nothing else is rewritten.
pub fn extract_version(output: &str, token: usize) -> Option<String> {
    let tokens: Vec<&str> = output.split_whitespace().collect();

    let chosen: &str = token
        .checked_sub(1)
        .and_then(|i| tokens.get(i))
        .filter(|t| VERSION_START.is_match(t))
        .or_else(|| tokens.iter().find(|t| VERSION_START.is_match(t)))?;

    Some(chosen.strip_prefix('v').unwrap_or(chosen).to_string())
}
