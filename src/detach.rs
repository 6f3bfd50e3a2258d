//! Re-launching as a detached background process.
//!
//! The parent re-executes its own binary with the same arguments and
//! `PUTIO_BACKGROUND=1` in the child's environment. The child's stdout and
//! stderr are appended to the log file and it gets its own process group, so
//! it is not torn down with the parent's job. The parent never waits on the
//! child.

use crate::core::config::RunConfig;
use crate::error::DetachError;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment marker set on the detached child only.
pub const BACKGROUND_ENV: &str = "PUTIO_BACKGROUND";

/// Whether this process is the one the operator started or the detached copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Foreground,
    DetachedChild,
}

impl LaunchMode {
    /// Interpret the value of [`BACKGROUND_ENV`].
    pub fn from_marker(value: Option<&str>) -> Self {
        match value {
            Some("1") => Self::DetachedChild,
            _ => Self::Foreground,
        }
    }
}

/// A spawned background run. The parent does not manage it further.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub pid: u32,
    pub log_file_path: PathBuf,
}

/// Re-run the current executable in the background with identical arguments.
pub fn spawn_detached(config: &RunConfig) -> Result<ProcessHandle, DetachError> {
    let exe = std::env::current_exe().map_err(DetachError::CurrentExe)?;
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    spawn_with(&exe, &args, config)
}

/// Start `program` detached, logging to `config.log_file`.
///
/// Settings the parent already resolved (possibly by prompting) are handed
/// down through the environment, since the child has no terminal to ask on.
pub fn spawn_with(
    program: &Path,
    args: &[OsString],
    config: &RunConfig,
) -> Result<ProcessHandle, DetachError> {
    let log_error = |source| DetachError::LogFile {
        path: config.log_file.clone(),
        source,
    };
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(log_error)?;
    let log_err = log.try_clone().map_err(log_error)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(log)
        .stderr(log_err)
        .env(BACKGROUND_ENV, "1")
        .env("PUTIO_LIBRARY_PATH", &config.destination_root)
        .env("PUTIO_LIBRARY_SUBPATH", &config.destination_subpath);

    if let Some(creds) = &config.credentials {
        cmd.env("PUTIO_USER", &creds.username)
            .env("PUTIO_PASS", &creds.password);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd.spawn().map_err(DetachError::Spawn)?;

    Ok(ProcessHandle {
        pid: child.id(),
        log_file_path: config.log_file.clone(),
    })
}
