//! apptainer-setup - make sure a recent Apptainer is available.
//!
//! The tool checks the installed container runtime against a minimum
//! version (1.2.0 by default) and, when it is missing or too old, runs the
//! upstream unprivileged installer and checks again.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and run wiring
//! - [`config`] - Configuration loading and layering
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Version comparison, runtime detection, installation
//! - [`shell`] - External process execution
//! - [`ui`] - Status output
//!
//! # Example
//!
//! ```
//! use apptainer_setup::requirements::is_at_least;
//!
//! assert!(is_at_least("1.10.0", "1.9.9").unwrap());
//! assert!(is_at_least("1.2", "1.2.0").unwrap());
//! assert!(!is_at_least("1.1.5", "1.2.0").unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod requirements;
pub mod shell;
pub mod ui;

pub use error::{Result, SetupError};
