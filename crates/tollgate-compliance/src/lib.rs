//! # Tollgate Compliance
//!
//! Asks the policy compliance service whether a pushed image passed, and
//! keeps asking on a fixed interval until it gets an answer or the retry
//! budget is spent.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tollgate_compliance::{ComplianceConfig, HttpComplianceClient, PollConfig, ScanPoller};
//! use tollgate_core::ApiKeys;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpComplianceClient::new(&ComplianceConfig::default())?;
//!     let poller = ScanPoller::new(client, PollConfig::default());
//!
//!     let keys = ApiKeys::new("access", "secret");
//!     let report = poller.poll("3f2a9c1b7d4e", Some(&keys)).await;
//!     println!("passed: {}", report.passed());
//!     Ok(())
//! }
//! ```
//!
//! ## Attempt accounting
//!
//! | Response                              | Effect             |
//! |---------------------------------------|--------------------|
//! | `status: pass` / `status: fail`       | poll ends          |
//! | `status: error`, `report_not_ready`   | not counted        |
//! | `status: error`, anything else        | counted            |
//! | unknown or missing `status`, bad JSON | counted            |
//! | transport failure                     | counted            |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod verdict;

pub use client::{api_keys_header, ComplianceApi, HttpComplianceClient, API_KEYS_HEADER};
pub use config::{
    ComplianceConfig, PollConfig, PollConfigBuilder, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES,
    DEFAULT_POLL_INTERVAL,
};
pub use error::{ComplianceError, Result};
pub use poller::{PollOutcome, PollReport, ScanPoller};
pub use verdict::{ScanVerdict, REPORT_NOT_READY};
