//! apptainer-setup CLI entry point.

use std::process::ExitCode;

use apptainer_setup::cli::{render_json, run_setup, Cli};
use apptainer_setup::ui::{create_ui, should_use_colors, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, so logs do not repeat the status lines
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("apptainer_setup=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apptainer_setup=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("apptainer-setup starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let mut ui = create_ui(output_mode, should_use_colors(cli.no_color), cli.json);

    let result = run_setup(&cli, ui.as_mut());

    if cli.json {
        println!("{}", render_json(&result));
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
