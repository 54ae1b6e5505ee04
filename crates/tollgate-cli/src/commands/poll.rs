//! Poll command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use tollgate_compliance::{api_keys_header, PollOutcome, PollReport, ScanPoller};

use super::options::{ComplianceArgs, CredentialArgs};

/// Arguments for the poll command.
#[derive(Args, Debug)]
pub struct PollArgs {
    /// Image id reported by docker for the pushed image
    #[arg(long)]
    pub image_id: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub poll: ComplianceArgs,
}

/// Runs the poll command.
pub async fn execute(args: PollArgs) -> Result<ExitCode> {
    let credentials = args.credentials.load(None)?;
    if let Some(keys) = &credentials {
        api_keys_header(keys).context("API keys cannot be sent to the compliance service")?;
    }
    let poller = ScanPoller::new(args.poll.client()?, args.poll.config());

    let report = poller.poll(&args.image_id, credentials.as_ref()).await;
    print_report(&report);
    Ok(exit_code(&report))
}

/// Exit status for a finished poll: success only if the image passed.
pub fn exit_code(report: &PollReport) -> ExitCode {
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints a one-line summary of the poll.
pub fn print_report(report: &PollReport) {
    println!("{}", summary(report));
}

fn summary(report: &PollReport) -> String {
    let outcome = match report.outcome {
        PollOutcome::Passed => "passed",
        PollOutcome::Failed => "failed",
        PollOutcome::Exhausted => "gave up waiting",
    };
    format!(
        "Compliance check {outcome} after {} attempt(s), {} counted",
        report.attempts, report.retries
    )
}
