//! putio CLI - fetch a put.io zip and unpack it into a media library
//!
//! Usage:
//!   putio --url <zip-url> -l /mnt/plex -s TV     Download and extract
//!   putio --url <zip-url> --background            Same, detached, logging to download.log
//!   putio --url <zip-url> --insecure              Skip TLS certificate checks

use anyhow::Result;
use clap::Parser;
use putio_cli::detach::BACKGROUND_ENV;
use putio_cli::prompt::TerminalPrompt;
use putio_cli::{ConfigInputs, FileConfig, LaunchMode, Outcome, Pipeline, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "putio")]
#[command(about = "Download a put.io zip and unpack it into your media library")]
#[command(version)]
struct Cli {
    /// Put.io zip URL
    #[arg(short = 'z', long)]
    url: Option<String>,

    /// Put.io username
    #[arg(short, long, env = "PUTIO_USER")]
    username: Option<String>,

    /// Put.io password
    #[arg(short, long, env = "PUTIO_PASS", hide_env_values = true)]
    password: Option<String>,

    /// Target root directory (i.e. /mnt/Plex)
    #[arg(short = 'l', long = "library_path", env = "PUTIO_LIBRARY_PATH")]
    library_path: Option<PathBuf>,

    /// Target subdirectory (i.e. TV or Music)
    #[arg(short = 's', long = "library_subpath", env = "PUTIO_LIBRARY_SUBPATH")]
    library_subpath: Option<PathBuf>,

    /// Run download and extraction in the background and log output
    #[arg(long)]
    background: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Config file with username, password, library_path, library_subpath
    #[arg(short, long, env = "PUTIO_CONFIG")]
    config: Option<PathBuf>,

    /// Log file for --background runs
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// `NAME=1` turns a feature on; anything else leaves it off.
fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let launch = LaunchMode::from_marker(std::env::var(BACKGROUND_ENV).ok().as_deref());

    let inputs = ConfigInputs {
        url: cli.url,
        username: cli.username,
        password: cli.password,
        library_path: cli.library_path,
        library_subpath: cli.library_subpath,
        background: cli.background,
        insecure: cli.insecure,
        notify: env_flag("PUTIO_NOTIFY"),
        clean: env_flag("PUTIO_CLEAN"),
        log_file: cli.log_file,
    };

    // Bail before reading files or prompting
    inputs.require_url()?;

    let file = FileConfig::discover(cli.config.as_deref())?;
    let config = inputs.with_file(file).resolve(&mut TerminalPrompt)?;

    let outcome = Pipeline::new(&config, launch).run()?;
    Ok(outcome)
}
