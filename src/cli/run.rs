//! Wiring for a single run: config, probe, checker, installer.

use std::path::PathBuf;

use serde_json::json;

use crate::config::{load_config, ConfigOverrides};
use crate::error::Result;
use crate::requirements::checker::{probe_context, CheckerContext, RuntimeChecker};
use crate::requirements::fetch::{run_install_plan, InstallPlan, ScriptFetcher, ScriptSource};
use crate::requirements::installer::{ensure_runtime, EnsureOptions, InstallerContext, SetupOutcome};
use crate::requirements::probe::{is_elevated, RuntimeProbe};
use crate::ui::{OutputMode, UserInterface};

use super::args::Cli;

/// Run the check-and-install flow described by `cli`.
pub fn run_setup(cli: &Cli, ui: &mut dyn UserInterface) -> Result<SetupOutcome> {
    let overrides = ConfigOverrides {
        min_version: cli.min_version.clone(),
        install_dir: cli.install_dir.clone(),
        installer_url: cli.installer_url.clone(),
    };
    let config = load_config(cli.config.as_deref(), &overrides, &|key: &str| {
        std::env::var(key)
    })?;
    tracing::debug!("Resolved config: {:?}", config);

    if ui.output_mode() == OutputMode::Verbose {
        ui.show_header(&format!(
            "apptainer-setup {} (minimum {})",
            env!("CARGO_PKG_VERSION"),
            config.runtime.min_version
        ));
    }

    let home = std::env::var_os("HOME").map(PathBuf::from);
    let install_dir = config.installer.resolved_install_dir(home.as_deref());
    let probe = RuntimeProbe::new(&install_dir);
    let (locate, query) = probe_context(&probe);
    let checker = RuntimeChecker::new(
        &config.runtime,
        CheckerContext {
            locate: &locate,
            query_version: &query,
        },
    )?;

    let fetcher = ScriptFetcher::new()?;
    let run_installer = |plan: &InstallPlan| run_install_plan(plan, &fetcher);
    let ctx = InstallerContext {
        run_installer: &run_installer,
    };

    let options = EnsureOptions {
        check_only: cli.check,
        plan: InstallPlan {
            source: ScriptSource::parse(&config.installer.url),
            install_dir,
            version: config.installer.version.clone(),
            extra_args: config.installer.extra_args.clone(),
            show_output: !cli.json && ui.output_mode().shows_command_output(),
        },
        path_hint: (!probe.install_bin_on_path()).then(|| probe.install_bin().to_path_buf()),
        elevated: is_elevated(),
    };

    ensure_runtime(&checker, ui, &ctx, &options)
}

/// Render a run's result as the `--json` document.
pub fn render_json(result: &Result<SetupOutcome>) -> String {
    let value = match result {
        Ok(outcome) => serde_json::to_value(outcome)
            .unwrap_or_else(|e| json!({ "outcome": "failed", "error": e.to_string() })),
        Err(e) => json!({ "outcome": "failed", "error": e.to_string() }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}
