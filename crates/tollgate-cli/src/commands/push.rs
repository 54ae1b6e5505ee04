//! Push command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use tollgate_registry::ImagePusher;

use super::options::{CredentialArgs, DockerArgs, TargetArgs};

/// Arguments for the push command.
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub docker: DockerArgs,
}

/// Runs the push command and prints the pushed image id.
pub async fn execute(args: PushArgs) -> Result<ExitCode> {
    let resolution = args.target.resolve()?;
    resolution.ensure_pushable()?;
    let credentials = args
        .credentials
        .load(resolution.credentials_id.as_deref())?;

    let pusher = ImagePusher::new(args.docker.config());
    let pushed = pusher
        .push(&resolution.source, &resolution.destination, credentials.as_ref())
        .await
        .context("Failed to push image to the scanning registry")?;

    println!("{}", pushed.reference);
    if let Some(id) = &pushed.image_id {
        println!("{id}");
    }
    Ok(ExitCode::SUCCESS)
}
