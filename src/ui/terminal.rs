//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{OutputMode, SetupTheme, UserInterface};

/// Writes status lines to a terminal stream and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: SetupTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Status lines on stdout.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme: SetupTheme::for_colors(colors),
            mode,
        }
    }

    /// Status lines on stderr, leaving stdout for machine-readable output.
    pub fn on_stderr(mode: OutputMode, colors: bool) -> Self {
        Self {
            out: Term::stderr(),
            ..Self::new(mode, colors)
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        writeln!(self.out, "{}", self.theme.format_header(title)).ok();
    }

    fn show_hint(&mut self, hint: &str) {
        writeln!(self.out, "  {}", self.theme.hint.apply_to(hint)).ok();
    }
}

/// Create the UI for a run.
///
/// With `json` set, status lines move to stderr so stdout carries only the
/// JSON document.
pub fn create_ui(mode: OutputMode, colors: bool, json: bool) -> Box<dyn UserInterface> {
    if json {
        Box::new(TerminalUI::on_stderr(mode, colors))
    } else {
        Box::new(TerminalUI::new(mode, colors))
    }
}
