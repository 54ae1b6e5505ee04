//! Tollgate CLI - push a built image to the scanning registry and gate on its compliance verdict.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

/// Exit status when the run aborts on an error.
const EXIT_ABORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output on stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tollgate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => commands::scan::execute(args).await,
        Commands::Resolve(args) => commands::resolve::run(&args),
        Commands::Push(args) => commands::push::execute(args).await,
        Commands::Poll(args) => commands::poll::execute(args).await,
        Commands::Version => {
            println!("tollgate {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        ExitCode::from(EXIT_ABORTED)
    })
}
