//! Errors raised while reading or writing Gatus configuration files.
//!
//! Every variant is fatal to the daemon: the reconciliation loop returns
//! it and `main` exits non-zero after logging.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unable to read base config {}: {source}", .path.display())]
    ReadBase {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to parse base config {}: {source}", .path.display())]
    ParseBase {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Base config {} must be a YAML mapping", .path.display())]
    BaseNotMapping { path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Unable to write generated config {}: {source}", .path.display())]
    WriteGenerated {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
