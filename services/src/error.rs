//! Typed errors for the services crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Uploaded content that must be text was not valid UTF-8.
    #[error("upload is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A CSS selector failed to compile.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while persisting an upload to temporary storage.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to create temporary upload directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("failed to write upload to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
