//! Error types for Tollgate core operations.
//!
//! Every variant here is a configuration error: it aborts the scan
//! immediately and is never retried.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving what to scan and with which credentials.
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream detection was requested but no preceding step produces an image.
    #[error("Unable to detect any preceding Docker build and publish step.")]
    NoUpstreamDockerStep,

    /// The resolved source image has a blank repository or tag.
    #[error("No valid image specified for scanning.")]
    NoValidImage,

    /// The resolved destination image cannot be pushed.
    #[error("No valid destination image derived for push: {name}")]
    NoValidDestination {
        /// Canonical name of the rejected destination.
        name: String,
    },

    /// A credentials id was configured but the store has no such entry.
    #[error("No credentials found for id \"{id}\"")]
    CredentialsNotFound {
        /// The configured credentials id.
        id: String,
    },

    /// A credentials or pipeline file could not be read.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A credentials or pipeline file could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    FileParse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The pipeline does not contain the requested image scan step.
    #[error("No image scan step found in pipeline{}", id.as_ref().map(|id| format!(" with id \"{id}\"")).unwrap_or_default())]
    ScanStepNotFound {
        /// The requested step id, if any.
        id: Option<String>,
    },
}
