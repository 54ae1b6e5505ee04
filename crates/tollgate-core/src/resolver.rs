//! Source and destination image resolution.
//!
//! The source image comes either from the scan step's own settings or from the
//! closest preceding step that produces an image. The destination always
//! lives on the scanning registry and is rendered from templates that can
//! refer to the source through `PUSH_REGISTRY`, `PUSH_REPOSITORY` and
//! `PUSH_TAG`.

use tracing::{info, warn};

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::reference::ImageReference;
use crate::step::{BuildStep, ImageScanStep};

/// Registry that receives images for scanning.
pub const DEFAULT_SCANNING_REGISTRY: &str = "registry.cloud.tenable.com";

/// Variable exposing the source registry (empty when it has none).
pub const VAR_PUSH_REGISTRY: &str = "PUSH_REGISTRY";
/// Variable exposing the source repository.
pub const VAR_PUSH_REPOSITORY: &str = "PUSH_REPOSITORY";
/// Variable exposing the source tag.
pub const VAR_PUSH_TAG: &str = "PUSH_TAG";

/// Resolves the image to scan and where to push it.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    scanning_registry: String,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SCANNING_REGISTRY)
    }
}

impl ReferenceResolver {
    /// Creates a resolver targeting `scanning_registry`.
    pub fn new(scanning_registry: impl Into<String>) -> Self {
        Self {
            scanning_registry: scanning_registry.into(),
        }
    }

    /// The registry destinations are placed on.
    #[must_use]
    pub fn scanning_registry(&self) -> &str {
        &self.scanning_registry
    }

    /// Resolves the image to scan.
    ///
    /// `steps` is the whole pipeline and `current` the position of the scan
    /// step in it; only steps strictly before `current` are considered for
    /// upstream detection.
    ///
    /// # Errors
    ///
    /// - [`Error::NoUpstreamDockerStep`] if detection finds no producing step.
    /// - [`Error::NoValidImage`] if the resolved image has a blank repository.
    pub fn resolve_source<S: BuildStep>(
        &self,
        settings: &ImageScanStep,
        steps: &[S],
        current: usize,
        env: &Environment,
    ) -> Result<ImageReference> {
        let image = if settings.detect_upstream {
            info!("Detecting preceding Docker build and publish step");
            let image = detect_upstream(steps, current, env).ok_or(Error::NoUpstreamDockerStep)?;
            info!("Docker build and publish step detected");
            image
        } else {
            ImageReference::create(
                None::<String>,
                env.expand(&settings.repository),
                Some(env.expand(&settings.tag)),
            )
        };

        if !image.is_valid() {
            return Err(Error::NoValidImage);
        }

        info!("Image to be scanned: {image}");
        Ok(image)
    }

    /// Derives the destination reference on the scanning registry.
    ///
    /// The result is not validated.
    #[must_use]
    pub fn resolve_destination(
        &self,
        source: &ImageReference,
        settings: &ImageScanStep,
        env: &Environment,
    ) -> ImageReference {
        let env = env.with_overrides([
            (VAR_PUSH_REGISTRY, source.registry().unwrap_or_default()),
            (VAR_PUSH_REPOSITORY, source.repository()),
            (VAR_PUSH_TAG, source.tag()),
        ]);

        let repository = env.expand(&settings.push_repository);
        ImageReference::create(
            Some(self.scanning_registry.as_str()),
            trim_slashes(&repository),
            Some(env.expand(&settings.push_tag)),
        )
    }
}

/// Strips leading and trailing runs of `/`.
///
/// # Examples
///
/// ```
/// use tollgate_core::resolver::trim_slashes;
///
/// assert_eq!(trim_slashes("/foo/bar/"), "foo/bar");
/// assert_eq!(trim_slashes("//a//"), "a");
/// assert_eq!(trim_slashes("///"), "");
/// ```
#[must_use]
pub fn trim_slashes(s: &str) -> &str {
    s.trim_matches('/')
}

/// Returns the image of the last producing step before `current`.
fn detect_upstream<S: BuildStep>(
    steps: &[S],
    current: usize,
    env: &Environment,
) -> Option<ImageReference> {
    let mut candidate = None;

    for (position, step) in steps.iter().enumerate().take(current) {
        let Some(producer) = step.as_image_producer() else {
            continue;
        };

        match producer.registry_host() {
            Ok(host) => {
                candidate = Some(ImageReference::create(
                    Some(env.expand(&host)),
                    env.expand(producer.repository_name()),
                    Some(env.expand(producer.repository_tag())),
                ));
            }
            Err(e) => {
                warn!(
                    step = position,
                    error = %e,
                    "Error detecting registry info from preceding Docker build and publish step"
                );
            }
        }
    }

    candidate
}
