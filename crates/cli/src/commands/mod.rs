//! CLI subcommands.

pub mod replay;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}
