//! Bounded polling of the compliance service.
//!
//! Every attempt either ends the poll (pass or fail) or is classified as
//! counted or uncounted. Counted attempts consume the retry budget; once the
//! budget is spent the poll is [`PollOutcome::Exhausted`]. Nothing that
//! happens inside the loop escapes as an error.

use std::sync::Arc;

use tokio::sync::Notify;
use tollgate_core::ApiKeys;
use tracing::{debug, info, warn};

use crate::client::ComplianceApi;
use crate::config::PollConfig;
use crate::verdict::ScanVerdict;

/// How a poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The service reported a pass.
    Passed,
    /// The service reported a fail.
    Failed,
    /// The retry budget ran out before a verdict.
    Exhausted,
}

/// Summary of a finished poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// How the poll ended.
    pub outcome: PollOutcome,
    /// Requests made, counted or not.
    pub attempts: u32,
    /// Attempts charged against the retry budget.
    pub retries: u32,
}

impl PollReport {
    /// Returns `true` only if the image passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, PollOutcome::Passed)
    }
}

enum Attempt {
    Done(PollOutcome),
    Counted,
    Uncounted,
}

/// Polls a [`ComplianceApi`] until a verdict arrives or the budget runs out.
#[derive(Debug)]
pub struct ScanPoller<A> {
    api: A,
    config: PollConfig,
    interrupt: Arc<Notify>,
}

impl<A: ComplianceApi> ScanPoller<A> {
    /// Creates a poller.
    pub fn new(api: A, config: PollConfig) -> Self {
        Self {
            api,
            config,
            interrupt: Arc::new(Notify::new()),
        }
    }

    /// The poll configuration.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Handle that cuts the current (or next) wait between attempts short.
    ///
    /// Calling `notify_one` on it while the poller sleeps wakes it early;
    /// the poll then continues with the next attempt.
    #[must_use]
    pub fn interrupt_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.interrupt)
    }

    /// Polls until pass, fail or exhaustion.
    ///
    /// An error response whose message is `report_not_ready` is not charged
    /// against the budget, so a service that keeps reporting it keeps the
    /// poll alive indefinitely.
    pub async fn poll(&self, image_id: &str, credentials: Option<&ApiKeys>) -> PollReport {
        let mut attempts = 0;
        let mut retries = 0;

        loop {
            if retries >= self.config.max_retries {
                warn!("Maximum retry attempts ({}) reached.", self.config.max_retries);
                return PollReport {
                    outcome: PollOutcome::Exhausted,
                    attempts,
                    retries,
                };
            }

            attempts += 1;
            match self.attempt(image_id, credentials).await {
                Attempt::Done(outcome) => {
                    return PollReport {
                        outcome,
                        attempts,
                        retries,
                    };
                }
                Attempt::Counted => retries += 1,
                Attempt::Uncounted => {}
            }
            debug!(attempts, retries, "Waiting before next compliance check");

            self.wait().await;
        }
    }

    async fn attempt(&self, image_id: &str, credentials: Option<&ApiKeys>) -> Attempt {
        let body = match self.api.fetch_verdict(image_id, credentials).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Compliance check failed");
                return Attempt::Counted;
            }
        };

        let verdict = match ScanVerdict::parse(&body) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, response = %body, "Unreadable compliance response");
                return Attempt::Counted;
            }
        };

        match &verdict {
            ScanVerdict::Pass => {
                info!("Scan status: Passed");
                Attempt::Done(PollOutcome::Passed)
            }
            ScanVerdict::Fail => {
                info!("Scan status: Failed");
                Attempt::Done(PollOutcome::Failed)
            }
            ScanVerdict::Error { .. } => {
                info!("Scan status: {verdict}");
                if verdict.is_report_not_ready() {
                    Attempt::Uncounted
                } else {
                    Attempt::Counted
                }
            }
            ScanVerdict::Malformed { raw } => {
                warn!("Invalid response: {raw}");
                Attempt::Counted
            }
        }
    }

    async fn wait(&self) {
        tokio::select! {
            () = tokio::time::sleep(self.config.poll_interval) => {}
            () = self.interrupt.notified() => {
                warn!("Wait between compliance checks was interrupted");
            }
        }
    }
}
