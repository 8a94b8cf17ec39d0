//! Configuration loading and schema.
//!
//! # Modules
//!
//! - [`schema`] - Config types and their defaults
//! - [`loader`] - File discovery and layering of file, environment and flags

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigOverrides};
pub use schema::{InstallerConfig, RuntimeConfig, SetupConfig};
