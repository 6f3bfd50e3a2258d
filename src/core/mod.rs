//! Configuration and operator-facing output shared by every stage.

pub mod config;
pub mod output;
pub mod progress;
pub mod prompt;
