//! Operator-facing output
//!
//! Every line a run prints goes through here. Progress lines go to stdout
//! and problems to stderr. A detached child has both pointed at its log
//! file, so the log reads the same as a terminal session, escape codes
//! included.

use owo_colors::OwoColorize;
use std::time::Duration;

/// Start of a stage, e.g. `==> Downloading <url> to /mnt/plex/TV/1234.zip`.
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Indented, dimmed line under the current stage.
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// A stage finished: `:: Download completed in 1.20s`.
pub fn finished(stage: &str, elapsed: Duration) {
    info(&format!("{} completed in {:.2?}", stage, elapsed));
}

/// The whole run succeeded.
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Something went wrong but the run continues (notifications).
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// The run is over; printed once by the binary before exiting 1.
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
