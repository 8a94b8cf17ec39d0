//! CLI argument definitions.
//!
//! The tool has a single action, so there are no subcommands: every flag
//! tunes the one check-and-install run.

use clap::Parser;
use std::path::PathBuf;

/// Ensure Apptainer is installed and new enough, installing it unprivileged if not.
#[derive(Debug, Parser)]
#[command(name = "apptainer-setup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides ~/.config/apptainer-setup/config.yml)
    #[arg(short, long, env = "APPTAINER_SETUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Minimum acceptable runtime version
    #[arg(long, value_name = "VERSION")]
    pub min_version: Option<String>,

    /// Directory for the unprivileged install
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<String>,

    /// Installer script URL or local path
    #[arg(long, value_name = "URL|PATH")]
    pub installer_url: Option<String>,

    /// Only check; never run the installer
    #[arg(long)]
    pub check: bool,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_a_plain_run() {
        let cli = Cli::try_parse_from(["apptainer-setup"]).unwrap();
        assert!(!cli.check);
        assert!(cli.min_version.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "apptainer-setup",
            "--min-version",
            "1.3",
            "--install-dir",
            "/opt/apptainer",
            "--installer-url",
            "./install.sh",
            "--check",
            "--json",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.min_version.as_deref(), Some("1.3"));
        assert_eq!(cli.install_dir.as_deref(), Some("/opt/apptainer"));
        assert_eq!(cli.installer_url.as_deref(), Some("./install.sh"));
        assert!(cli.check && cli.json && cli.quiet);
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["apptainer-setup", "--frobnicate"]).is_err());
    }
}
