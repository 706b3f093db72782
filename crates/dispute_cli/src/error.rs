use std::{io, path::PathBuf};

use dispute_agents::{ConfigError, FieldPathError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid field path: {0}")]
    FieldPath(#[from] FieldPathError),
    #[error("invalid transaction: {0}")]
    Transaction(#[source] serde_json::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}
