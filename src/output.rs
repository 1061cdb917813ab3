//! Console reporting for workspace operations.
//!
//! Every component that produces user-visible progress or warnings receives a
//! [`Reporter`] by reference. Progress goes to stdout, warnings go to stderr
//! with a distinct prefix so they stay visible when stdout is redirected.
//! Warnings are also recorded, which lets callers and tests inspect them
//! after an operation finishes.

use std::cell::RefCell;

use colored::Colorize;

/// Sink for progress messages and warnings.
#[derive(Debug, Default)]
pub struct Reporter {
    /// When `true`, progress output is suppressed. Warnings are still printed.
    quiet: bool,

    /// Every warning emitted so far, in emission order.
    warnings: RefCell<Vec<String>>,
}

impl Reporter {
    /// Create a reporter that prints progress and warnings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable quiet mode.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print a progress line to stdout.
    pub fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }

    /// Print a highlighted heading line to stdout.
    pub fn heading(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref().bold());
        }
    }

    /// Print and record a warning.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        eprintln!("{} {message}", "Warning:".yellow().bold());
        self.warnings.borrow_mut().push(message);
    }

    /// All warnings emitted so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

/// Print an error line to stderr with a red `Error:` prefix.
pub fn print_error(message: impl AsRef<str>) {
    eprintln!("{} {}", "Error:".red().bold(), message.as_ref());
}
