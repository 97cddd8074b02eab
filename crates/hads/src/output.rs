//! Styled status lines on stderr.

use std::error::Error;
use std::fmt::Display;

use console::{Style, Term};

/// Writes user-facing status lines to stderr.
pub(crate) struct Output {
    term: Term,
    label: Style,
    done: Style,
    failure: Style,
    banner: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            done: Style::new().green(),
            failure: Style::new().red(),
            banner: Style::new().cyan().bold(),
        }
    }

    /// Headline such as the address being served (cyan bold).
    pub(crate) fn banner(&self, msg: impl Display) {
        self.line(&self.banner.apply_to(msg).to_string());
    }

    /// `label: value` line with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: &dyn Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    /// Plain note.
    pub(crate) fn note(&self, msg: &str) {
        self.line(msg);
    }

    /// Completion message (green).
    pub(crate) fn done(&self, msg: impl Display) {
        self.line(&self.done.apply_to(msg).to_string());
    }

    /// `Error: ...` line (red).
    pub(crate) fn failure(&self, err: &dyn Error) {
        self.line(&self.failure.apply_to(format!("Error: {err}")).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
