//! Output formatting for CLI
//!
//! Commands talk to the terminal through the [`Ui`] trait so tests can
//! capture what would have been printed.

use console::style;
use indicatif::ProgressBar;

/// Terminal surface used by commands and the runner
pub trait Ui: Send + Sync {
    /// Print a plain line
    fn say(&self, message: &str);

    /// Print a warning line
    fn warn(&self, message: &str);

    /// Report that the command succeeded
    fn ok(&self);

    /// Report that the command failed with `message`
    fn failed(&self, message: &str);

    /// Report a usage failure followed by the command usage
    fn fail_with_usage(&self, message: &str, usage: &str);

    /// Start a progress spinner for a long-running step
    fn progress(&self, message: &str) -> ProgressBar;
}

/// [`Ui`] writing to the real terminal
#[derive(Debug, Default)]
pub struct TerminalUi;

impl Ui for TerminalUi {
    fn say(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", style(message).magenta());
    }

    fn ok(&self) {
        println!("{}", style("OK").green().bold());
        println!();
    }

    fn failed(&self, message: &str) {
        eprintln!("{}", style("FAILED").red().bold());
        eprintln!("{}", message);
    }

    fn fail_with_usage(&self, message: &str, usage: &str) {
        eprintln!("{}", style("FAILED").red().bold());
        eprintln!("{}", usage_text(message, usage));
    }

    fn progress(&self, message: &str) -> ProgressBar {
        spinner(message)
    }
}

/// Highlight a resource or user name
pub fn entity_name(name: &str) -> String {
    style(name).cyan().bold().to_string()
}

/// Text shown for a usage failure
pub fn usage_text(message: &str, usage: &str) -> String {
    if message.is_empty() {
        format!("Incorrect Usage.\n\nUSAGE:\n   {}", usage)
    } else {
        format!("Incorrect Usage. {}\n\nUSAGE:\n   {}", message, usage)
    }
}

/// Create a progress spinner
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
