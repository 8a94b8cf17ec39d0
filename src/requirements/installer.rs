//! Check, install, and re-check the runtime.
//!
//! The installer itself is opaque: its exit status is logged but never
//! trusted. Whether the run succeeded is decided solely by checking the
//! runtime version again afterwards.

use crate::error::{Result, SetupError};
use crate::requirements::checker::RuntimeChecker;
use crate::requirements::fetch::InstallPlan;
use crate::requirements::status::{RuntimeBinary, RuntimeStatus};
use crate::shell::CommandResult;
use crate::ui::UserInterface;
use serde::Serialize;
use std::path::PathBuf;

/// Mockable dependencies for the installer.
pub struct InstallerContext<'a> {
    /// Fetch and run the install script described by the plan.
    pub run_installer: &'a dyn Fn(&InstallPlan) -> Result<CommandResult>,
}

/// How `ensure_runtime` should behave.
#[derive(Debug, Clone)]
pub struct EnsureOptions {
    /// Report only; never run the installer.
    pub check_only: bool,
    /// What to run when an install is needed.
    pub plan: InstallPlan,
    /// Directory to suggest adding to `PATH` when the installed binary lands
    /// there. `None` when the user's `PATH` already covers it.
    pub path_hint: Option<PathBuf>,
    /// Whether the process runs as root.
    pub elevated: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SetupOutcome {
    /// The runtime already met the minimum; nothing was installed.
    AlreadySatisfied {
        binary: RuntimeBinary,
        version: String,
    },
    /// The installer ran and the runtime now meets the minimum.
    Installed {
        previous: Option<String>,
        binary: RuntimeBinary,
        version: String,
    },
    /// Check-only run that found the runtime satisfied.
    Checked { status: RuntimeStatus },
}

impl SetupOutcome {
    /// Version of the runtime after the run.
    pub fn version(&self) -> Option<&str> {
        match self {
            SetupOutcome::AlreadySatisfied { version, .. }
            | SetupOutcome::Installed { version, .. } => Some(version),
            SetupOutcome::Checked { status } => status.installed_version(),
        }
    }
}

/// Make sure the runtime meets the checker's minimum version.
///
/// Returns `Err(SetupError::RequirementUnsatisfied)` when the runtime is
/// still insufficient after one install attempt, or immediately in
/// check-only mode.
pub fn ensure_runtime(
    checker: &RuntimeChecker<'_>,
    ui: &mut dyn UserInterface,
    ctx: &InstallerContext<'_>,
    options: &EnsureOptions,
) -> Result<SetupOutcome> {
    let minimum = checker.minimum().to_string();
    let status = checker.check();

    if let RuntimeStatus::Satisfied { binary, version } = &status {
        ui.success(&format!(
            "{} {} already satisfies the minimum version {}",
            binary.name, version, minimum
        ));
        let outcome = if options.check_only {
            SetupOutcome::Checked {
                status: status.clone(),
            }
        } else {
            SetupOutcome::AlreadySatisfied {
                binary: binary.clone(),
                version: version.clone(),
            }
        };
        return Ok(outcome);
    }

    if options.check_only {
        if let RuntimeStatus::Unrecognized { binary, reason, .. } = &status {
            ui.warning(&format!(
                "Could not determine the version of {}: {}",
                binary.path.display(),
                reason
            ));
        }
        return Err(unsatisfied(checker, &status));
    }

    let dir = options.plan.install_dir.display();
    match &status {
        RuntimeStatus::Outdated {
            binary, installed, ..
        } => ui.message(&format!(
            "{} {} is older than {}; upgrading into {}",
            binary.name, installed, minimum, dir
        )),
        RuntimeStatus::Missing { .. } => ui.message(&format!(
            "{} not found; installing into {}",
            checker.runtime_name(),
            dir
        )),
        RuntimeStatus::Unrecognized { binary, reason, .. } => ui.warning(&format!(
            "Could not determine the version of {} ({}); reinstalling into {}",
            binary.path.display(),
            reason,
            dir
        )),
        RuntimeStatus::Satisfied { .. } => {}
    }

    if options.elevated {
        tracing::warn!("Running the unprivileged installer as root");
        ui.warning("Running as root; the unprivileged install is meant for regular users");
    }

    match (ctx.run_installer)(&options.plan) {
        Ok(result) if result.success => {
            tracing::debug!("Installer finished in {:?}", result.duration);
        }
        Ok(result) => {
            tracing::warn!(
                "Installer exited with code {:?}; checking the runtime anyway",
                result.exit_code
            );
        }
        Err(e) => {
            tracing::warn!("Installer did not run: {}", e);
            ui.warning(&format!("Installer did not run: {}", e));
        }
    }

    let previous = status.installed_version().map(str::to_string);

    match checker.check() {
        RuntimeStatus::Satisfied { binary, version } => {
            ui.success(&format!("{} {} installed", binary.name, version));
            if let Some(bin) = options
                .path_hint
                .as_deref()
                .filter(|bin| binary.path.starts_with(bin))
            {
                ui.show_hint(&format!(
                    "Add {} to your PATH: export PATH=\"{}:$PATH\"",
                    bin.display(),
                    bin.display()
                ));
            }
            Ok(SetupOutcome::Installed {
                previous,
                binary,
                version,
            })
        }
        after => {
            tracing::debug!("Runtime after install: {:?}", after);
            Err(unsatisfied(checker, &after))
        }
    }
}

fn unsatisfied(checker: &RuntimeChecker<'_>, status: &RuntimeStatus) -> SetupError {
    let runtime = status
        .binary()
        .map(|b| b.name.clone())
        .unwrap_or_else(|| checker.runtime_name().to_string());
    SetupError::RequirementUnsatisfied {
        runtime,
        installed: status.installed_version().map(str::to_string),
        required: checker.minimum().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::requirements::checker::CheckerContext;
    use crate::requirements::fetch::ScriptSource;
    use crate::ui::MockUI;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::time::Duration;

    const INSTALL_DIR: &str = "/home/user/.local/apptainer";

    fn options() -> EnsureOptions {
        EnsureOptions {
            check_only: false,
            plan: InstallPlan {
                source: ScriptSource::File(PathBuf::from("/tmp/install.sh")),
                install_dir: PathBuf::from(INSTALL_DIR),
                version: None,
                extra_args: Vec::new(),
                show_output: false,
            },
            path_hint: Some(PathBuf::from(INSTALL_DIR).join("bin")),
            elevated: false,
        }
    }

    fn installer_ok() -> Result<CommandResult> {
        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }

    struct Run {
        result: Result<SetupOutcome>,
        ui: MockUI,
        installs: usize,
    }

    /// Simulate a host whose runtime reports `before` until the installer
    /// runs and `after` from then on. `None` means no binary at all.
    fn run(
        before: Option<&str>,
        after: Option<&str>,
        options: &EnsureOptions,
        installer: fn() -> Result<CommandResult>,
    ) -> Run {
        let installs = Cell::new(0usize);
        let current = || if installs.get() == 0 { before } else { after };

        let locate = |_: &[String]| -> Option<RuntimeBinary> {
            current().map(|_| {
                let path = if installs.get() == 0 {
                    PathBuf::from("/usr/bin/apptainer")
                } else {
                    PathBuf::from(INSTALL_DIR).join("bin").join("apptainer")
                };
                RuntimeBinary {
                    name: "apptainer".to_string(),
                    path,
                }
            })
        };
        let query = |_: &RuntimeBinary, _: &[String]| -> Result<CommandResult> {
            let version = current().unwrap_or_default();
            Ok(CommandResult::success(
                format!("apptainer version {}\n", version),
                String::new(),
                Duration::ZERO,
            ))
        };
        let run_installer = |_: &InstallPlan| -> Result<CommandResult> {
            installs.set(installs.get() + 1);
            installer()
        };

        let checker = RuntimeChecker::new(
            &RuntimeConfig::default(),
            CheckerContext {
                locate: &locate,
                query_version: &query,
            },
        )
        .unwrap();
        let ctx = InstallerContext {
            run_installer: &run_installer,
        };

        let mut ui = MockUI::new();
        let result = ensure_runtime(&checker, &mut ui, &ctx, options);
        Run {
            result,
            ui,
            installs: installs.get(),
        }
    }

    #[test]
    fn satisfied_runtime_skips_install() {
        let r = run(Some("1.3.0"), None, &options(), installer_ok);

        assert_eq!(r.installs, 0);
        assert!(r.ui.has_success("already satisfies the minimum version 1.2.0"));
        match r.result.unwrap() {
            SetupOutcome::AlreadySatisfied { version, .. } => assert_eq!(version, "1.3.0"),
            other => panic!("Expected AlreadySatisfied, got {:?}", other),
        }
    }

    #[test]
    fn outdated_runtime_is_upgraded() {
        let r = run(Some("1.1.5"), Some("1.2.0"), &options(), installer_ok);

        assert_eq!(r.installs, 1);
        assert!(r.ui.has_message("apptainer 1.1.5 is older than 1.2.0; upgrading"));
        assert!(r.ui.has_success("apptainer 1.2.0 installed"));
        match r.result.unwrap() {
            SetupOutcome::Installed {
                previous, version, ..
            } => {
                assert_eq!(previous.as_deref(), Some("1.1.5"));
                assert_eq!(version, "1.2.0");
            }
            other => panic!("Expected Installed, got {:?}", other),
        }
    }

    #[test]
    fn missing_runtime_is_installed() {
        let r = run(None, Some("1.3.4"), &options(), installer_ok);

        assert_eq!(r.installs, 1);
        assert!(r.ui.has_message("apptainer not found; installing into"));
        let outcome = r.result.unwrap();
        assert!(matches!(
            outcome,
            SetupOutcome::Installed { previous: None, .. }
        ));
        assert_eq!(outcome.version(), Some("1.3.4"));
    }

    #[test]
    fn still_outdated_after_install_fails() {
        let r = run(Some("1.1.5"), Some("1.1.5"), &options(), installer_ok);

        assert_eq!(r.installs, 1);
        match r.result.unwrap_err() {
            SetupError::RequirementUnsatisfied {
                runtime,
                installed,
                required,
            } => {
                assert_eq!(runtime, "apptainer");
                assert_eq!(installed.as_deref(), Some("1.1.5"));
                assert_eq!(required, "1.2.0");
            }
            other => panic!("Expected RequirementUnsatisfied, got {:?}", other),
        }
    }

    #[test]
    fn installer_exit_status_is_not_trusted() {
        fn failing() -> Result<CommandResult> {
            Ok(CommandResult::failure(
                Some(1),
                String::new(),
                String::new(),
                Duration::ZERO,
            ))
        }

        let r = run(None, Some("1.2.0"), &options(), failing);
        assert!(r.result.is_ok());
    }

    #[test]
    fn installer_error_falls_through_to_recheck() {
        fn unreachable_source() -> Result<CommandResult> {
            Err(SetupError::InstallerFetch {
                source_ref: "https://example.invalid/install.sh".to_string(),
                message: "connection refused".to_string(),
            })
        }

        let r = run(None, None, &options(), unreachable_source);

        assert!(r.ui.has_warning("Installer did not run"));
        let err = r.result.unwrap_err();
        assert!(err.to_string().contains("(not installed)"));
    }

    #[test]
    fn unrecognized_version_triggers_reinstall() {
        let r = run(Some("1.2.0-rc1"), Some("1.2.0"), &options(), installer_ok);

        assert_eq!(r.installs, 1);
        assert!(r.ui.has_warning("reinstalling into"));
        assert!(r.result.is_ok());
    }

    #[test]
    fn hints_path_when_install_bin_not_on_path() {
        let r = run(None, Some("1.3.0"), &options(), installer_ok);
        assert!(r.ui.has_hint("export PATH=\"/home/user/.local/apptainer/bin:$PATH\""));
    }

    #[test]
    fn no_path_hint_when_already_on_path() {
        let mut opts = options();
        opts.path_hint = None;
        let r = run(None, Some("1.3.0"), &opts, installer_ok);
        assert!(r.ui.hints().is_empty());
    }

    #[test]
    fn no_path_hint_when_binary_lives_elsewhere() {
        let mut opts = options();
        opts.path_hint = Some(PathBuf::from("/opt/elsewhere/bin"));
        let r = run(None, Some("1.3.0"), &opts, installer_ok);
        assert!(r.result.is_ok());
        assert!(r.ui.hints().is_empty());
    }

    #[test]
    fn check_only_never_installs() {
        let mut opts = options();
        opts.check_only = true;
        let r = run(Some("1.1.5"), Some("1.3.0"), &opts, installer_ok);

        assert_eq!(r.installs, 0);
        assert!(matches!(
            r.result,
            Err(SetupError::RequirementUnsatisfied { .. })
        ));
    }

    #[test]
    fn check_only_reports_satisfied_status() {
        let mut opts = options();
        opts.check_only = true;
        let r = run(Some("1.2.0"), None, &opts, installer_ok);

        match r.result.unwrap() {
            SetupOutcome::Checked { status } => assert!(status.is_satisfied()),
            other => panic!("Expected Checked, got {:?}", other),
        }
    }

    #[test]
    fn root_gets_a_warning() {
        let mut opts = options();
        opts.elevated = true;
        let r = run(None, Some("1.2.0"), &opts, installer_ok);
        assert!(r.ui.has_warning("Running as root"));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = SetupOutcome::AlreadySatisfied {
            binary: RuntimeBinary {
                name: "apptainer".to_string(),
                path: PathBuf::from("/usr/bin/apptainer"),
            },
            version: "1.3.0".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "already_satisfied");
        assert_eq!(json["version"], "1.3.0");
        assert_eq!(json["binary"]["name"], "apptainer");
    }
}
