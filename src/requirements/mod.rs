//! Runtime detection, version checking, and unprivileged installation.
//!
//! # Modules
//!
//! - [`version`] - Dotted version parsing and the `is_at_least` comparator
//! - [`probe`] - Search path construction and runtime binary lookup
//! - [`status`] - Runtime status types
//! - [`checker`] - Version query and status evaluation
//! - [`fetch`] - Installer script retrieval and execution
//! - [`installer`] - The check, install, re-check flow

pub mod checker;
pub mod fetch;
pub mod installer;
pub mod probe;
pub mod status;
pub mod version;

pub use checker::{CheckerContext, RuntimeChecker};
pub use installer::{ensure_runtime, EnsureOptions, InstallerContext, SetupOutcome};
pub use status::{RuntimeBinary, RuntimeStatus};
pub use version::{is_at_least, Version};
