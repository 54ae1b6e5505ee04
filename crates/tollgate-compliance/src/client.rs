//! HTTP access to the policy compliance endpoint.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tollgate_core::ApiKeys;
use tracing::debug;
use url::Url;

use crate::config::ComplianceConfig;
use crate::error::{ComplianceError, Result};

/// Header carrying the API key pair.
pub const API_KEYS_HEADER: &str = "x-apikeys";

/// Renders `keys` as the value of the [`API_KEYS_HEADER`] header.
///
/// Callers should check the keys with this before polling: keys that fail
/// here fail on every attempt.
///
/// # Errors
///
/// Returns [`ComplianceError::InvalidApiKeys`] if a key contains characters
/// not allowed in a header value.
pub fn api_keys_header(keys: &ApiKeys) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&keys.header_value())
        .map_err(|source| ComplianceError::InvalidApiKeys { source })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Source of compliance responses for an image.
#[async_trait]
pub trait ComplianceApi: Send + Sync {
    /// Fetches the raw response body for `image_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be
    /// read. A non-success HTTP status is not an error.
    async fn fetch_verdict(&self, image_id: &str, credentials: Option<&ApiKeys>)
        -> Result<String>;
}

/// [`ComplianceApi`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpComplianceClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpComplianceClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(config: &ComplianceConfig) -> Result<Self> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ComplianceError::InvalidEndpoint {
                url: config.endpoint.clone(),
                source,
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| ComplianceError::ClientBuild { source })?;

        Ok(Self { endpoint, http })
    }

    /// The endpoint queried by this client.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The full request URL for `image_id`.
    #[must_use]
    pub fn request_url(&self, image_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("image_id", image_id);
        url
    }
}

#[async_trait]
impl ComplianceApi for HttpComplianceClient {
    async fn fetch_verdict(
        &self,
        image_id: &str,
        credentials: Option<&ApiKeys>,
    ) -> Result<String> {
        let mut request = self.http.get(self.request_url(image_id));

        if let Some(keys) = credentials {
            let value = api_keys_header(keys)?;
            request = request.header(HeaderName::from_static(API_KEYS_HEADER), value);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), image_id, "Compliance response received");

        // Reading the body to the end releases the connection for this attempt.
        Ok(response.text().await?)
    }
}
