//! Terminal progress for the fetch and extract stages
//!
//! A fetch starts as a spinner and turns into a byte bar once the response
//! reports a `Content-Length`. Extraction only spins. indicatif draws to
//! stderr and stays silent when that is not a terminal, which is the case in
//! a detached child logging to a file.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK: Duration = Duration::from_millis(80);

const SPINNER_TEMPLATE: &str = "     {spinner:.cyan} {msg}";
const BYTES_TEMPLATE: &str =
    "     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})";

/// Progress display for one stage. Cleared from the terminal when dropped,
/// whether the stage finished or bailed out with `?`.
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    /// Start a spinner labelled `message`, e.g. `downloading 1234.zip`.
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(SPINNER_CHARS),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(TICK);
        Self { bar }
    }

    /// The body size is known: show a byte bar instead of the spinner.
    pub fn expect_bytes(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template(BYTES_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸━"),
        );
    }

    /// Bytes written so far.
    pub fn advance_to(&self, bytes: u64) {
        self.bar.set_position(bytes);
    }
}

impl Drop for StageProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
