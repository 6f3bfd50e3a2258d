//! Error types for each stage of a run.

use std::path::PathBuf;
use thiserror::Error;

/// Problems building a [`RunConfig`](crate::RunConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("URL is required")]
    MissingUrl,

    #[error("library path is required (set --library_path or PUTIO_LIBRARY_PATH)")]
    MissingLibraryPath,

    #[error("library subpath must be relative and stay inside the library: {0}")]
    InvalidSubpath(PathBuf),

    #[error("cannot read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot read {field} from terminal: {source}")]
    Prompt {
        field: &'static str,
        source: std::io::Error,
    },
}

/// Errors raised while downloading the archive.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("cannot build TLS client: {0}")]
    Tls(#[from] rustls::Error),

    #[error("server returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot create file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("download interrupted after {written} bytes: {source}")]
    Stream {
        written: u64,
        source: std::io::Error,
    },
}

/// Errors raised while unpacking the archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("zip read error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive contains unsafe path: {0}")]
    UnsafeEntry(String),

    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write error for {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot set mode {mode:o} on {}: {source}", path.display())]
    Permissions {
        path: PathBuf,
        mode: u32,
        source: std::io::Error,
    },
}

/// Removing the archive failed after it was extracted.
#[derive(Error, Debug)]
#[error("failed to remove archive {}: {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Notification delivery failures. These are logged and never propagated.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("PUSHOVER_TOKEN and PUSHOVER_USER must both be set")]
    MissingCredentials,

    #[error("pushover request failed: {0}")]
    Transport(String),

    #[error("pushover rejected the message: {0}")]
    Rejected(String),
}

/// Errors raised while re-launching as a background process.
#[derive(Error, Debug)]
pub enum DetachError {
    #[error("error opening log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot locate own executable: {0}")]
    CurrentExe(std::io::Error),

    #[error("error starting background process: {0}")]
    Spawn(std::io::Error),
}

/// Any failure that ends a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error downloading file: {0}")]
    Fetch(#[from] FetchError),

    #[error("error extracting file: {0}")]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Cleanup(#[from] CleanupError),

    #[error(transparent)]
    Detach(#[from] DetachError),
}
