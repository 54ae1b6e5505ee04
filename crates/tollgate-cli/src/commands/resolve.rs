//! Resolve command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::options::{Resolution, TargetArgs};

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the resolve command.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runs the resolve command.
pub fn run(args: &ResolveArgs) -> Result<ExitCode> {
    let resolution = args.target.resolve()?;
    info!(source = %resolution.source, destination = %resolution.destination, "Resolved");

    println!("{}", render(&resolution, &args.format)?);
    Ok(ExitCode::SUCCESS)
}

fn render(resolution: &Resolution, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!(
            "Source:      {}\nDestination: {}",
            resolution.source, resolution.destination
        ),
        OutputFormat::Json => serde_json::to_string_pretty(resolution)?,
    })
}
