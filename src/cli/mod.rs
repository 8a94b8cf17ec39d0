//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Wiring a parsed command line into a setup run

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::{render_json, run_setup};
