//! Interpretation of a compliance response body.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::Result;

/// Message the service uses while the scan report is still being built.
pub const REPORT_NOT_READY: &str = "report_not_ready";

/// What a single compliance response says about the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    /// The image satisfies the compliance policy.
    Pass,
    /// The image violates the compliance policy.
    Fail,
    /// The service could not produce a verdict.
    Error {
        /// Human readable reason.
        reason: Option<String>,
        /// Machine readable message, e.g. [`REPORT_NOT_READY`].
        message: Option<String>,
    },
    /// A JSON object without a recognised `status`.
    Malformed {
        /// The body as received.
        raw: String,
    },
}

impl ScanVerdict {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::Json`](crate::ComplianceError::Json) if the
    /// body is not valid JSON. Valid JSON that is not an object, or an
    /// object whose `status` is missing or unknown, is [`Self::Malformed`].
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let Some(object) = value.as_object() else {
            return Ok(Self::malformed(body));
        };

        Ok(match object.get("status").and_then(Value::as_str) {
            Some("pass") => Self::Pass,
            Some("fail") => Self::Fail,
            Some("error") => Self::Error {
                reason: string_field(object, "reason"),
                message: string_field(object, "message"),
            },
            _ => Self::malformed(body),
        })
    }

    fn malformed(body: &str) -> Self {
        Self::Malformed {
            raw: body.to_string(),
        }
    }

    /// Returns `true` for an error whose message says the report is not
    /// ready yet.
    #[must_use]
    pub fn is_report_not_ready(&self) -> bool {
        matches!(self, Self::Error { message: Some(m), .. } if m == REPORT_NOT_READY)
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Passed"),
            Self::Fail => f.write_str("Failed"),
            Self::Error { reason, .. } => f.write_str(reason.as_deref().unwrap_or("error")),
            Self::Malformed { raw } => write!(f, "Invalid response: {raw}"),
        }
    }
}
