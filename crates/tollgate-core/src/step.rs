//! Build steps and the image-producer capability.
//!
//! Upstream detection does not care about concrete step types: any step that
//! hands out an [`ImageProducer`] through [`BuildStep::as_image_producer`] is a
//! candidate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::reference::is_blank;

/// Registry used by a Docker publish step that names none.
pub const DEFAULT_REGISTRY_URL: &str = "https://index.docker.io/v1/";

/// Default destination repository template.
pub const DEFAULT_PUSH_REPOSITORY: &str = "${PUSH_REGISTRY}/${PUSH_REPOSITORY}";

/// Default destination tag template.
pub const DEFAULT_PUSH_TAG: &str = "${PUSH_TAG}";

/// Errors raised while reading image metadata from a step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The configured registry URL does not parse.
    #[error("invalid registry URL '{url}': {source}")]
    InvalidRegistryUrl {
        /// The configured URL.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The configured registry URL has no host component.
    #[error("registry URL '{url}' has no host")]
    MissingHost {
        /// The configured URL.
        url: String,
    },
}

/// A step that builds and publishes a container image.
pub trait ImageProducer {
    /// Repository name, before environment expansion.
    fn repository_name(&self) -> &str;

    /// Repository tag, before environment expansion.
    fn repository_tag(&self) -> &str;

    /// Host (and port, when explicit) of the registry the image is published to.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the registry cannot be determined.
    fn registry_host(&self) -> Result<String, StepError>;
}

/// A step in a build pipeline.
pub trait BuildStep {
    /// Returns the step's image-producer capability, if it has one.
    fn as_image_producer(&self) -> Option<&dyn ImageProducer> {
        None
    }
}

/// Builds an image and publishes it to a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerPublishStep {
    /// Step id.
    pub id: Option<String>,
    /// Registry URL; blank means Docker Hub.
    pub registry: Option<String>,
    /// Repository name; may reference environment variables.
    pub repository: String,
    /// Tag; may reference environment variables.
    pub tag: String,
}

impl DockerPublishStep {
    /// Creates a publish step.
    pub fn new(
        registry: Option<impl Into<String>>,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            registry: registry.map(Into::into),
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// The registry URL actually used, falling back to [`DEFAULT_REGISTRY_URL`].
    #[must_use]
    pub fn effective_registry_url(&self) -> &str {
        self.registry
            .as_deref()
            .filter(|r| !is_blank(r))
            .unwrap_or(DEFAULT_REGISTRY_URL)
    }
}

impl ImageProducer for DockerPublishStep {
    fn repository_name(&self) -> &str {
        &self.repository
    }

    fn repository_tag(&self) -> &str {
        &self.tag
    }

    fn registry_host(&self) -> Result<String, StepError> {
        let raw = self.effective_registry_url().trim();
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };

        let url = Url::parse(&with_scheme).map_err(|source| StepError::InvalidRegistryUrl {
            url: raw.to_string(),
            source,
        })?;
        let host = url.host_str().ok_or_else(|| StepError::MissingHost {
            url: raw.to_string(),
        })?;

        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

impl BuildStep for DockerPublishStep {
    fn as_image_producer(&self) -> Option<&dyn ImageProducer> {
        Some(self)
    }
}

/// Pushes an image to the scanning registry and waits for its compliance verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageScanStep {
    /// Step id.
    pub id: Option<String>,
    /// Take the image from the closest preceding image-producing step.
    pub detect_upstream: bool,
    /// Repository to scan when not detecting upstream.
    pub repository: String,
    /// Tag to scan when not detecting upstream.
    pub tag: String,
    /// Destination repository template on the scanning registry.
    pub push_repository: String,
    /// Destination tag template.
    pub push_tag: String,
    /// Id of the API keys in the credential store.
    pub credentials_id: Option<String>,
}

impl Default for ImageScanStep {
    fn default() -> Self {
        Self {
            id: None,
            detect_upstream: true,
            repository: String::new(),
            tag: String::new(),
            push_repository: DEFAULT_PUSH_REPOSITORY.to_string(),
            push_tag: DEFAULT_PUSH_TAG.to_string(),
            credentials_id: None,
        }
    }
}

impl ImageScanStep {
    /// Scan settings that detect the image from upstream steps.
    #[must_use]
    pub fn detecting() -> Self {
        Self::default()
    }

    /// Scan settings for an explicitly configured image.
    pub fn explicit(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            detect_upstream: false,
            repository: repository.into(),
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sets the destination templates.
    #[must_use]
    pub fn with_push_templates(
        mut self,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        self.push_repository = repository.into();
        self.push_tag = tag.into();
        self
    }

    /// Sets the credentials id.
    #[must_use]
    pub fn with_credentials_id(mut self, id: impl Into<String>) -> Self {
        self.credentials_id = Some(id.into());
        self
    }
}

impl BuildStep for ImageScanStep {}

/// An arbitrary command; never produces an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandStep {
    /// Step id.
    pub id: Option<String>,
    /// Command line, informational only.
    pub run: String,
}

impl BuildStep for CommandStep {}
