//! # Tollgate Registry
//!
//! Pushes a resolved image to the scanning registry through the docker CLI
//! and reports the local image id the compliance service is keyed on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tollgate_core::ImageReference;
//! use tollgate_registry::{ImagePusher, PushConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pusher = ImagePusher::new(PushConfig::default());
//!
//!     let source = ImageReference::create(None::<String>, "team/app", Some("1.0"));
//!     let destination =
//!         ImageReference::create(Some("registry.cloud.tenable.com"), "team/app", Some("1.0"));
//!
//!     let pushed = pusher.push(&source, &destination, None).await?;
//!     println!("{:?}", pushed.image_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Sequence
//!
//! ```text
//! mkdtemp ──► login? ──► tag ──► push ──► images -q ──► rm -r
//!    │          (non-fatal)        (streamed)   (first line)    (best effort)
//!    └───────────── --config <dir> on every command ─────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod command;
mod config;
mod docker;
mod error;
mod pusher;

pub use command::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use config::{PushConfig, PushConfigBuilder, DEFAULT_DOCKER_BINARY};
pub use docker::DockerCli;
pub use error::{PushError, Result};
pub use pusher::{ImagePusher, PushedImage};
