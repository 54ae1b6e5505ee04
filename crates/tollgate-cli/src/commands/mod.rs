//! CLI commands and argument parsing.

pub mod options;
pub mod poll;
pub mod push;
pub mod resolve;
pub mod scan;

use clap::{Parser, Subcommand};

/// Tollgate - push images to a scanning registry and gate builds on compliance
#[derive(Parser)]
#[command(name = "tollgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Push an image for scanning and wait for its compliance verdict
    Scan(scan::ScanArgs),

    /// Show the image that would be scanned and where it would be pushed
    Resolve(resolve::ResolveArgs),

    /// Push an image to the scanning registry without polling
    Push(push::PushArgs),

    /// Poll the compliance verdict for an already pushed image
    Poll(poll::PollArgs),

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_with_pipeline() {
        let cli = Cli::try_parse_from([
            "tollgate",
            "scan",
            "--pipeline",
            "pipeline.yaml",
            "--step",
            "scan",
            "--env",
            "BUILD_NUMBER=42",
            "--max-retries",
            "5",
        ])
        .unwrap();

        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.target.step.as_deref(), Some("scan"));
        assert_eq!(args.target.env, vec![("BUILD_NUMBER".to_string(), "42".to_string())]);
        assert_eq!(args.poll.max_retries, 5);
    }

    #[test]
    fn test_repository_conflicts_with_pipeline() {
        let result = Cli::try_parse_from([
            "tollgate",
            "resolve",
            "--pipeline",
            "pipeline.yaml",
            "--repository",
            "team/app",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_poll_requires_image_id() {
        assert!(Cli::try_parse_from(["tollgate", "poll"]).is_err());
        assert!(Cli::try_parse_from(["tollgate", "poll", "--image-id", "abc"]).is_ok());
    }
}
