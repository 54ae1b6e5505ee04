//! # Tollgate Core
//!
//! Core types for Tollgate, which pushes container images to a scanning
//! registry and waits for a compliance verdict.
//!
//! This crate owns everything that happens before any external command or
//! network call:
//!
//! - [`ImageReference`] - the `(registry?, repository, tag)` triple and its canonical name
//! - [`Environment`] - immutable variables with `${NAME}` expansion
//! - [`ApiKeys`] and [`CredentialStore`] - credentials looked up by id
//! - [`Pipeline`], [`BuildStep`] and [`ImageProducer`] - the ordered steps
//!   that upstream detection inspects
//! - [`ReferenceResolver`] - source and destination resolution
//!
//! ## Example
//!
//! ```rust
//! use tollgate_core::{Environment, ImageScanStep, PipelineStep, ReferenceResolver};
//! use tollgate_core::step::DockerPublishStep;
//!
//! let steps = vec![
//!     PipelineStep::DockerPublish(DockerPublishStep::new(
//!         Some("https://registry.example.com"),
//!         "team/app",
//!         "${BUILD_NUMBER}",
//!     )),
//!     PipelineStep::ImageScan(ImageScanStep::detecting()),
//! ];
//! let env: Environment = [("BUILD_NUMBER", "42")].into_iter().collect();
//!
//! let resolver = ReferenceResolver::default();
//! let settings = ImageScanStep::detecting();
//! let source = resolver.resolve_source(&settings, &steps, 1, &env)?;
//! let destination = resolver.resolve_destination(&source, &settings, &env);
//!
//! assert_eq!(source.name(), "registry.example.com/team/app:42");
//! assert_eq!(
//!     destination.name(),
//!     "registry.cloud.tenable.com/registry.example.com/team/app:42"
//! );
//! # Ok::<(), tollgate_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod reference;
pub mod resolver;
pub mod step;


pub use credentials::{
    resolve_credentials, ApiKeys, CredentialStore, FileCredentialStore, InMemoryCredentialStore,
};
pub use environment::Environment;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineStep};
pub use reference::ImageReference;
pub use resolver::ReferenceResolver;
pub use step::{BuildStep, ImageProducer, ImageScanStep, StepError};
