//! Configuration for the compliance client and the poller.

use std::time::Duration;

/// Default policy compliance endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://cloud.tenable.com/container-security/api/v1/policycompliance";

/// Default number of counted attempts before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 30;

/// Default delay between attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Policy compliance endpoint; the image id goes in the query string.
    pub endpoint: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("tollgate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ComplianceConfig {
    /// Creates a configuration for `endpoint` with default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Retry budget and pacing for [`ScanPoller`](crate::ScanPoller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Counted attempts allowed before the poll is exhausted.
    pub max_retries: u32,

    /// Delay between attempts.
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> PollConfigBuilder {
        PollConfigBuilder::default()
    }
}

/// Builder for [`PollConfig`].
#[derive(Debug, Default)]
pub struct PollConfigBuilder {
    max_retries: Option<u32>,
    poll_interval: Option<Duration>,
}

impl PollConfigBuilder {
    /// Sets the retry budget.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PollConfig {
        let defaults = PollConfig::default();
        PollConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
        }
    }
}
