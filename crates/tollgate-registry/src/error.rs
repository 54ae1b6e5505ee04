//! Error types for image push operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for push operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Errors that abort a push.
///
/// A command that runs and exits non-zero is not an error here; only failing
/// to run it at all is.
#[derive(Debug, Error)]
pub enum PushError {
    /// The docker CLI could not be started or communicated with.
    #[error("Error executing docker command `{command}`: {source}")]
    Command {
        /// The command line that failed, without secrets.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The isolated docker config directory could not be created.
    #[error("Failed to create docker config directory in {path}: {source}")]
    ConfigScope {
        /// Parent directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
