//! Download a put.io zip export and unpack it into a media library
//!
//! A run fetches one archive over HTTP, extracts it under
//! `library_path/library_subpath` and can send Pushover notifications when
//! each step finishes. It can also detach into the background, logging to
//! `download.log`, so a long download survives the terminal that started it.
//!
//! # Example
//!
//! ```no_run
//! use putio_cli::{ConfigInputs, LaunchMode, Pipeline, prompt::NoPrompt};
//!
//! let config = ConfigInputs {
//!     url: Some("https://zips.put.io/zipstream/123456.zip".into()),
//!     library_path: Some("/mnt/plex".into()),
//!     library_subpath: Some("TV".into()),
//!     ..Default::default()
//! }
//! .resolve(&mut NoPrompt)?;
//!
//! Pipeline::new(&config, LaunchMode::Foreground).run()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Environment
//!
//! - `PUTIO_USER`, `PUTIO_PASS` - account credentials (HTTP basic auth)
//! - `PUTIO_LIBRARY_PATH`, `PUTIO_LIBRARY_SUBPATH` - destination
//! - `PUTIO_NOTIFY=1` - send Pushover notifications (`PUSHOVER_TOKEN`, `PUSHOVER_USER`)
//! - `PUTIO_CLEAN=1` - delete the archive after extraction
//! - `PUTIO_BACKGROUND=1` - set on the detached child; not meant to be set by hand

mod core;
pub mod detach;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod transfer;
pub mod unpack;

pub use crate::core::config::{self, ConfigInputs, Credentials, FileConfig, RunConfig};
pub use crate::core::{output, prompt};
pub use detach::{LaunchMode, ProcessHandle};
pub use error::PipelineError;
pub use pipeline::{Outcome, Pipeline, RunReport, Stage};
pub use transfer::TransferResult;
pub use unpack::ExtractionResult;
