//! Pipeline orchestrator
//!
//! One run moves through `Init → Fetching → Extracting → Done`. A failure in
//! any stage moves it to `Failed` and ends the run; nothing is retried.
//!
//! The decision to go to the background is made once, in `Init`: a
//! foreground process asked to run in the background spawns a detached copy
//! of itself and stops there. The copy is constructed with
//! [`LaunchMode::DetachedChild`] and runs the stages inline.

use crate::core::config::RunConfig;
use crate::core::output;
use crate::detach::{self, LaunchMode, ProcessHandle};
use crate::error::{ConfigError, PipelineError};
use crate::notify::{self, Notifier};
use crate::transfer::{self, TransferResult};
use crate::unpack::{self, ExtractionResult};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Fetching,
    Extracting,
    Done,
    Failed,
}

/// Results of a run that completed in this process.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub transfer: TransferResult,
    pub extraction: ExtractionResult,
}

/// How a successful invocation ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Download and extraction finished here.
    Completed(RunReport),
    /// A detached child took over; its result is only visible in its log.
    Detached(ProcessHandle),
}

/// Sequences fetch, extract and notify for one [`RunConfig`].
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    launch: LaunchMode,
    notifier: Box<dyn Notifier + 'a>,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    /// The notifier follows `config.notify`.
    pub fn new(config: &'a RunConfig, launch: LaunchMode) -> Self {
        Self {
            config,
            launch,
            notifier: notify::for_run(config.notify),
            stage: Stage::Init,
        }
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'a) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Background requested and not already the detached child.
    pub fn should_detach(&self) -> bool {
        self.config.run_in_background && self.launch == LaunchMode::Foreground
    }

    /// Run to completion, or hand off to a detached child.
    pub fn run(&mut self) -> Result<Outcome, PipelineError> {
        self.stage = Stage::Init;
        if self.config.source_url.trim().is_empty() {
            return self.fail(ConfigError::MissingUrl);
        }

        if self.should_detach() {
            let handle = match detach::spawn_detached(self.config) {
                Ok(handle) => handle,
                Err(e) => return self.fail(e),
            };
            output::info(&format!(
                "Process running in background with PID {} (logging to {})",
                handle.pid,
                handle.log_file_path.display()
            ));
            return Ok(Outcome::Detached(handle));
        }

        self.run_inline().map(Outcome::Completed)
    }

    /// Fetch, extract and clean up in this process.
    pub fn run_inline(&mut self) -> Result<RunReport, PipelineError> {
        let config = self.config;

        self.stage = Stage::Fetching;
        let transfer = match transfer::fetch(config, &config.source_url) {
            Ok(t) => t,
            Err(e) => return self.fail(e),
        };
        let archive_name = display_name(&transfer);
        self.notifier.notify(
            "Download completed",
            &format!("File {} downloaded in {:.2?}", archive_name, transfer.elapsed),
        );

        self.stage = Stage::Extracting;
        let mut extraction =
            match unpack::extract(&transfer.local_file_path, &config.destination_dir()) {
                Ok(x) => x,
                Err(e) => return self.fail(e),
            };
        self.notifier.notify(
            "Extraction completed",
            &format!("File {} extracted in {:.2?}", archive_name, extraction.elapsed),
        );

        if config.clean {
            if let Err(e) = unpack::remove_archive(&transfer.local_file_path) {
                return self.fail(e);
            }
            extraction.archive_removed = true;
        }

        self.stage = Stage::Done;
        output::success("Download and extraction completed successfully.");
        Ok(RunReport {
            transfer,
            extraction,
        })
    }

    fn fail<T>(&mut self, err: impl Into<PipelineError>) -> Result<T, PipelineError> {
        self.stage = Stage::Failed;
        Err(err.into())
    }
}

fn display_name(transfer: &TransferResult) -> String {
    transfer
        .local_file_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
