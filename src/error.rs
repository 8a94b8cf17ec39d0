//! Error types for apptainer-setup operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `SetupError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors
//! - A missing runtime is a status, not an error; only terminal failures
//!   reach the process exit code

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for apptainer-setup operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A version string is outside the dotted-numeric grammar.
    #[error("Unsupported version '{input}': {reason}")]
    UnsupportedVersion { input: String, reason: String },

    /// The runtime still does not meet the minimum after all attempts.
    #[error("{runtime} {} does not satisfy the required minimum version {required}", .installed.as_deref().unwrap_or("(not installed)"))]
    RequirementUnsatisfied {
        runtime: String,
        installed: Option<String>,
        required: String,
    },

    /// The installer script could not be obtained.
    #[error("Failed to fetch installer from {source_ref}: {message}")]
    InstallerFetch { source_ref: String, message: String },

    /// A process could not be spawned or was killed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for apptainer-setup operations.
pub type Result<T> = std::result::Result<T, SetupError>;
