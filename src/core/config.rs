//! Run configuration
//!
//! A [`RunConfig`] is built exactly once per process from, in order of
//! precedence: command-line flags, environment variables, the TOML config
//! file and finally the interactive prompt. Components never look at the
//! environment themselves; they only see the finished `RunConfig`.
//!
//! ## Config file
//!
//! ```toml
//! username = "me@example.com"
//! password = "secret"
//! library_path = "/mnt/plex"
//! library_subpath = "TV"
//! ```

use crate::core::prompt::Prompt;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Default log file for background runs, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "download.log";

/// Account credentials sent as HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything one run needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_url: String,
    pub destination_root: PathBuf,
    pub destination_subpath: PathBuf,
    pub credentials: Option<Credentials>,
    pub run_in_background: bool,
    pub skip_cert_validation: bool,
    /// Send completion notifications (`PUTIO_NOTIFY=1`)
    pub notify: bool,
    /// Delete the archive after extraction (`PUTIO_CLEAN=1`)
    pub clean: bool,
    /// Where a detached child's stdout/stderr are appended
    pub log_file: PathBuf,
}

impl RunConfig {
    /// Directory the archive is downloaded to and unpacked into.
    pub fn destination_dir(&self) -> PathBuf {
        self.destination_root.join(&self.destination_subpath)
    }
}

/// Settings read from the TOML config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub library_path: Option<PathBuf>,
    pub library_subpath: Option<PathBuf>,
}

impl FileConfig {
    /// `<config_dir>/putio/config.toml`, e.g. `~/.config/putio/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("putio").join("config.toml"))
    }

    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly named file, or the default one if it exists.
    ///
    /// A missing default file is not an error; a missing explicit one is.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// Raw values gathered from flags and environment, before resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub library_path: Option<PathBuf>,
    pub library_subpath: Option<PathBuf>,
    pub background: bool,
    pub insecure: bool,
    pub notify: bool,
    pub clean: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigInputs {
    /// The URL is checked before anything else so that a missing URL never
    /// touches the network, the filesystem or the terminal.
    pub fn require_url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)
    }

    /// Fill values still unset from the config file.
    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.username = non_empty(self.username).or(file.username);
        self.password = non_empty(self.password).or(file.password);
        self.library_path = non_empty_path(self.library_path).or(file.library_path);
        self.library_subpath = non_empty_path(self.library_subpath).or(file.library_subpath);
        self
    }

    /// Ask for anything still missing, then validate into a [`RunConfig`].
    pub fn resolve(self, prompt: &mut dyn Prompt) -> Result<RunConfig, ConfigError> {
        let source_url = self.require_url()?.to_string();

        let username = match non_empty(self.username) {
            Some(v) => Some(v),
            None => prompt.ask("username", "Enter your Put.io Username")?,
        };
        let password = match non_empty(self.password) {
            Some(v) => Some(v),
            None => prompt.ask("password", "Enter your Put.io Password")?,
        };
        let library_path = match non_empty_path(self.library_path) {
            Some(v) => Some(v),
            None => prompt
                .ask("library path", "Enter the Plex Library path")?
                .map(PathBuf::from),
        };
        let library_subpath = match non_empty_path(self.library_subpath) {
            Some(v) => Some(v),
            None => prompt
                .ask(
                    "library subpath",
                    "Enter the subdirectory to download and unpack to",
                )?
                .map(PathBuf::from),
        };

        let destination_root = library_path.ok_or(ConfigError::MissingLibraryPath)?;
        let destination_subpath = library_subpath.unwrap_or_default();
        validate_subpath(&destination_subpath)?;

        let credentials = match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Ok(RunConfig {
            source_url,
            destination_root,
            destination_subpath,
            credentials,
            run_in_background: self.background,
            skip_cert_validation: self.insecure,
            notify: self.notify,
            clean: self.clean,
            log_file: self
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

/// The subpath must stay under the library root.
fn validate_subpath(subpath: &Path) -> Result<(), ConfigError> {
    let escapes = subpath
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidSubpath(subpath.to_path_buf()));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|v| !v.as_os_str().is_empty())
}
