//! Fetcher: stream an archive from a URL into the library directory.
//!
//! The local file takes its name from the last segment of the URL, and the
//! body goes straight to disk while a byte progress bar runs. No retries: a
//! failed download removes the partial file and reports a [`FetchError`].

mod filename;
pub mod tls;

pub use filename::{FALLBACK_NAME, file_name_from_url, sanitize_filename};

use crate::core::config::{Credentials, RunConfig};
use crate::core::output;
use crate::core::progress::StageProgress;
use crate::error::FetchError;
use base64::Engine;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("putio-cli/", env!("CARGO_PKG_VERSION"));

const BUFFER_SIZE: usize = 64 * 1024;

/// A completed download.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub local_file_path: PathBuf,
    pub elapsed: Duration,
    /// Bytes written to `local_file_path`
    pub bytes: u64,
}

/// HTTP client configured for one run.
pub struct Fetcher {
    agent: ureq::Agent,
    credentials: Option<Credentials>,
}

impl Fetcher {
    /// Build the client. With `skip_cert_validation` any server certificate
    /// is accepted.
    pub fn new(config: &RunConfig) -> Result<Self, FetchError> {
        let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
        if config.skip_cert_validation {
            builder = builder.tls_config(tls::insecure_client_config()?);
        }

        Ok(Self {
            agent: builder.build(),
            credentials: config.credentials.clone(),
        })
    }

    /// Download `url` into `dest_dir`, creating the directory if needed.
    pub fn fetch(&self, url: &str, dest_dir: &Path) -> Result<TransferResult, FetchError> {
        std::fs::create_dir_all(dest_dir).map_err(|source| FetchError::CreateDir {
            path: dest_dir.to_path_buf(),
            source,
        })?;

        let filename = file_name_from_url(url);
        let dest = dest_dir.join(&filename);
        output::action(&format!("Downloading {} to {}", url, dest.display()));

        let start = Instant::now();
        let bytes = self.download_with_progress(url, &dest, &filename)?;
        let elapsed = start.elapsed();

        output::detail(&format!("downloaded {} ({} bytes)", filename, bytes));
        output::finished("Download", elapsed);

        Ok(TransferResult {
            local_file_path: dest,
            elapsed,
            bytes,
        })
    }

    fn request(&self, url: &str) -> ureq::Request {
        let request = self.agent.get(url);
        match &self.credentials {
            Some(creds) => {
                let token = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", creds.username, creds.password));
                request.set("Authorization", &format!("Basic {}", token))
            }
            None => request,
        }
    }

    fn download_with_progress(
        &self,
        url: &str,
        dest: &Path,
        filename: &str,
    ) -> Result<u64, FetchError> {
        let progress = StageProgress::spinner(&format!("downloading {}", filename));

        let response = self.request(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(t) => FetchError::Transport {
                url: url.to_string(),
                reason: t.to_string(),
            },
        })?;

        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            progress.expect_bytes(len);
        }

        let mut file = File::create(dest).map_err(|source| FetchError::CreateFile {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut reader = response.into_reader();
        let result = stream_to(&mut reader, &mut file, |total| progress.advance_to(total));
        if result.is_err() {
            drop(file);
            let _ = std::fs::remove_file(dest);
        }
        result
    }
}

/// Copy `reader` into `writer`, reporting the running total after each chunk.
fn stream_to(
    reader: &mut impl Read,
    writer: &mut File,
    mut on_progress: impl FnMut(u64),
) -> Result<u64, FetchError> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|source| FetchError::Stream {
            written: total_bytes,
            source,
        })?;
        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|source| FetchError::Stream {
                written: total_bytes,
                source,
            })?;

        total_bytes += bytes_read as u64;
        on_progress(total_bytes);
    }

    writer.flush().map_err(|source| FetchError::Stream {
        written: total_bytes,
        source,
    })?;
    Ok(total_bytes)
}

/// Download `url` into the configured destination directory.
pub fn fetch(config: &RunConfig, url: &str) -> Result<TransferResult, FetchError> {
    Fetcher::new(config)?.fetch(url, &config.destination_dir())
}
