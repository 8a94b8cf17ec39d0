//! Runtime status types.
//!
//! Each runtime check produces a `RuntimeStatus` that describes whether
//! the container runtime is present and new enough.

use serde::Serialize;
use std::path::PathBuf;

/// A runtime executable found on the search path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeBinary {
    /// Binary name that matched (e.g., "apptainer", "singularity").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// The result of checking the runtime against the minimum version.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuntimeStatus {
    /// Runtime is present and at least the minimum version.
    Satisfied {
        binary: RuntimeBinary,
        version: String,
    },

    /// Runtime is present but older than the minimum.
    Outdated {
        binary: RuntimeBinary,
        installed: String,
        required: String,
    },

    /// Runtime binary exists but its version could not be determined.
    /// Handled the same way as a missing runtime.
    Unrecognized {
        binary: RuntimeBinary,
        /// Raw output of the version query, if it ran.
        output: Option<String>,
        /// Why the version was not usable.
        reason: String,
    },

    /// No runtime binary on the search path.
    Missing { required: String },
}

impl RuntimeStatus {
    /// Whether the runtime is usable as-is.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RuntimeStatus::Satisfied { .. })
    }

    /// Whether the installer should run.
    pub fn needs_install(&self) -> bool {
        !self.is_satisfied()
    }

    /// The binary this status refers to, if one was found.
    pub fn binary(&self) -> Option<&RuntimeBinary> {
        match self {
            RuntimeStatus::Satisfied { binary, .. }
            | RuntimeStatus::Outdated { binary, .. }
            | RuntimeStatus::Unrecognized { binary, .. } => Some(binary),
            RuntimeStatus::Missing { .. } => None,
        }
    }

    /// The detected version string, if one was parsed.
    pub fn installed_version(&self) -> Option<&str> {
        match self {
            RuntimeStatus::Satisfied { version, .. } => Some(version),
            RuntimeStatus::Outdated { installed, .. } => Some(installed),
            RuntimeStatus::Unrecognized { .. } | RuntimeStatus::Missing { .. } => None,
        }
    }
}
