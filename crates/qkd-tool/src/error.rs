//! Errors surfaced by tool commands.

use std::{io, path::PathBuf};

use qkd_crypto::CryptoError;
use thiserror::Error;

/// Tool command failures
#[derive(Error, Debug)]
pub enum ToolError {
    /// Scheme or association could not be built
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Association definition file is not valid JSON
    #[error("invalid definition {path}: {source}")]
    Definition {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Writing the result failed
    #[error("output error: {0}")]
    Output(#[from] io::Error),
}
