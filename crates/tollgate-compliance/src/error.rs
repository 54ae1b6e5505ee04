//! Error types for compliance queries.

use thiserror::Error;

/// Errors raised while talking to the compliance service.
///
/// The poller absorbs all of these; they only escape from the client when
/// it is used directly.
#[derive(Debug, Error)]
pub enum ComplianceError {
    /// The request failed in transport or while reading the body.
    #[error("Compliance request failed: {source}")]
    Request {
        /// Underlying error.
        #[from]
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured endpoint is not a valid URL.
    #[error("Invalid compliance endpoint '{url}': {source}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        url: String,
        /// Parse error.
        #[source]
        source: url::ParseError,
    },

    /// The API keys contain characters that cannot go in a header.
    #[error("API keys cannot be sent as a header: {source}")]
    InvalidApiKeys {
        /// Underlying error.
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// The response body is not a JSON object.
    #[error("Compliance response is not valid JSON: {source}")]
    Json {
        /// Underlying error.
        #[from]
        source: serde_json::Error,
    },
}

/// Result alias for compliance operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
