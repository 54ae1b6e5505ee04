//! Scan command implementation.
//!
//! Resolves the image, pushes it to the scanning registry and waits for the
//! compliance verdict. The exit status is the verdict.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tollgate_compliance::{api_keys_header, ComplianceApi, PollReport, ScanPoller};
use tollgate_core::ApiKeys;
use tollgate_registry::{CommandRunner, ImagePusher};

use super::options::{ComplianceArgs, CredentialArgs, DockerArgs, Resolution, TargetArgs};
use super::poll::{exit_code, print_report};

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub docker: DockerArgs,

    #[command(flatten)]
    pub poll: ComplianceArgs,
}

/// Runs the scan command.
///
/// # Errors
///
/// Returns an error if:
/// - The image or its destination cannot be resolved
/// - The configured credentials do not exist
/// - Docker cannot be run
pub async fn execute(args: ScanArgs) -> Result<ExitCode> {
    let resolution = args.target.resolve()?;
    let credentials = args
        .credentials
        .load(resolution.credentials_id.as_deref())?;

    let pusher = ImagePusher::new(args.docker.config());
    let poller = ScanPoller::new(args.poll.client()?, args.poll.config());

    let report = scan(&resolution, credentials.as_ref(), &pusher, &poller).await?;
    print_report(&report);
    Ok(exit_code(&report))
}

/// Pushes the resolved image and polls for its verdict.
pub async fn scan<R, A>(
    resolution: &Resolution,
    credentials: Option<&ApiKeys>,
    pusher: &ImagePusher<R>,
    poller: &ScanPoller<A>,
) -> Result<PollReport>
where
    R: CommandRunner,
    A: ComplianceApi,
{
    resolution.ensure_pushable()?;
    if let Some(keys) = credentials {
        api_keys_header(keys).context("API keys cannot be sent to the compliance service")?;
    }

    let pushed = pusher
        .push(&resolution.source, &resolution.destination, credentials)
        .await
        .context("Failed to push image to the scanning registry")?;

    // An unknown id still gets polled; the service answers with an error.
    let image_id = pushed.image_id.unwrap_or_default();

    info!(image = %resolution.destination, "Waiting for compliance verdict");
    Ok(poller.poll(&image_id, credentials).await)
}
