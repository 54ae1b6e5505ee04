//! Pipeline definitions.
//!
//! A pipeline is an ordered list of steps loaded from YAML:
//!
//! ```yaml
//! steps:
//!   - type: docker-publish
//!     id: build
//!     registry: https://registry.example.com
//!     repository: team/app
//!     tag: ${BUILD_NUMBER}
//!   - type: command
//!     run: make test
//!   - type: image-scan
//!     id: scan
//!     credentials_id: tio
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::step::{BuildStep, CommandStep, DockerPublishStep, ImageProducer, ImageScanStep};

/// One step of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PipelineStep {
    /// Builds and publishes an image.
    DockerPublish(DockerPublishStep),
    /// Scans an image.
    ImageScan(ImageScanStep),
    /// Runs something unrelated to images.
    Command(CommandStep),
}

impl PipelineStep {
    /// The step id, if one was given.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::DockerPublish(step) => step.id.as_deref(),
            Self::ImageScan(step) => step.id.as_deref(),
            Self::Command(step) => step.id.as_deref(),
        }
    }
}

impl BuildStep for PipelineStep {
    fn as_image_producer(&self) -> Option<&dyn ImageProducer> {
        match self {
            Self::DockerPublish(step) => step.as_image_producer(),
            Self::ImageScan(step) => step.as_image_producer(),
            Self::Command(step) => step.as_image_producer(),
        }
    }
}

/// An ordered list of build steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Steps in declared order.
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Loads a pipeline from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| Error::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds an image scan step and its position.
    ///
    /// With an `id`, the step with that id is returned; without one, the first
    /// image scan step is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScanStepNotFound`] if no matching scan step exists.
    pub fn scan_step(&self, id: Option<&str>) -> Result<(usize, &ImageScanStep)> {
        self.steps
            .iter()
            .enumerate()
            .find_map(|(position, step)| match step {
                PipelineStep::ImageScan(scan) if id.is_none() || scan.id.as_deref() == id => {
                    Some((position, scan))
                }
                _ => None,
            })
            .ok_or_else(|| Error::ScanStepNotFound {
                id: id.map(ToString::to_string),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: &str = r"
steps:
  - type: docker-publish
    id: build
    registry: https://registry.example.com
    repository: team/app
    tag: ${BUILD_NUMBER}
  - type: command
    run: make test
  - type: image-scan
    id: scan
    credentials_id: tio
  - type: image-scan
    id: rescan
    detect_upstream: false
    repository: team/other
";

    #[test]
    fn test_parse_pipeline() {
        let pipeline: Pipeline = serde_yaml::from_str(PIPELINE).unwrap();
        assert_eq!(pipeline.steps.len(), 4);
        assert_eq!(pipeline.steps[0].id(), Some("build"));
        assert!(pipeline.steps[0].as_image_producer().is_some());
        assert!(pipeline.steps[1].as_image_producer().is_none());

        let PipelineStep::ImageScan(scan) = &pipeline.steps[2] else {
            panic!("expected image scan step");
        };
        assert!(scan.detect_upstream);
        assert_eq!(scan.credentials_id.as_deref(), Some("tio"));
        assert_eq!(scan.push_tag, crate::step::DEFAULT_PUSH_TAG);
    }

    #[test]
    fn test_scan_step_lookup() {
        let pipeline: Pipeline = serde_yaml::from_str(PIPELINE).unwrap();

        let (position, step) = pipeline.scan_step(None).unwrap();
        assert_eq!(position, 2);
        assert_eq!(step.id.as_deref(), Some("scan"));

        let (position, step) = pipeline.scan_step(Some("rescan")).unwrap();
        assert_eq!(position, 3);
        assert!(!step.detect_upstream);

        assert!(matches!(
            pipeline.scan_step(Some("nope")),
            Err(Error::ScanStepNotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tollgate.yaml");
        std::fs::write(&path, PIPELINE).unwrap();

        let pipeline = Pipeline::load(&path).unwrap();
        assert_eq!(pipeline.steps.len(), 4);

        assert!(matches!(
            Pipeline::load(dir.path().join("missing.yaml")),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_unknown_step_type_is_rejected() {
        let result: std::result::Result<Pipeline, _> =
            serde_yaml::from_str("steps:\n  - type: deploy\n");
        assert!(result.is_err());
    }
}
