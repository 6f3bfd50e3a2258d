//! Interactive collection of missing settings.

use crate::error::ConfigError;
use std::io::{BufRead, IsTerminal, Write};

/// Source of values the operator did not supply through flags, env or file.
pub trait Prompt {
    /// Ask for `field` using `label`. `None` means no answer is available.
    fn ask(&mut self, field: &'static str, label: &str) -> Result<Option<String>, ConfigError>;
}

/// Reads answers from stdin, but only when stdin is a terminal.
///
/// A detached child has a null stdin, so it falls through to `None` instead
/// of blocking on a read nobody will answer.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, field: &'static str, label: &str) -> Result<Option<String>, ConfigError> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return Ok(None);
        }

        let mut stdout = std::io::stdout();
        write!(stdout, "{}: ", label)
            .and_then(|_| stdout.flush())
            .map_err(|source| ConfigError::Prompt { field, source })?;

        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .map_err(|source| ConfigError::Prompt { field, source })?;

        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        Ok((!answer.is_empty()).then_some(answer))
    }
}

/// Never answers. Used when prompting must not happen.
#[derive(Debug, Default)]
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn ask(&mut self, _field: &'static str, _label: &str) -> Result<Option<String>, ConfigError> {
        Ok(None)
    }
}
