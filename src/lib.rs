//! dupefinder - content-based duplicate file finder
//!
//! Files under a directory are enumerated, bucketed by exact size, and only
//! files sharing a size are hashed (BLAKE3, streamed in 8 KiB chunks). Files
//! with equal size and digest form duplicate groups. Scans report progress
//! through [`progress::ProgressSink`] and can be stopped from any thread
//! through a [`signal::StopHandle`].
//!
//! The library entry point is [`duplicates::DuplicateFinder`]; [`run_app`]
//! drives it for the command-line binary.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use cli::{Cli, Commands, OutputFormat, ScanArgs};
use config::Config;
use duplicates::{DuplicateFinder, ScanOutcome, ScanResult};
use error::ExitCode;
use output::{JsonOutput, TextOutput};
use progress::{Progress, ProgressSink};

/// Run the command-line application.
///
/// Returns the exit code for a scan that started; errors mean the scan could
/// not start (or its report could not be written).
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing or non-directory
/// root, or a failed write of the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let Commands::Scan(args) = cli.command;
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    log::debug!("Effective configuration: {:?}", config);

    run_scan(&args, &config, cli.quiet)
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let stop = signal::install_handler().context("Failed to install Ctrl+C handler")?;
    let progress: Arc<dyn ProgressSink> = Arc::new(Progress::new(quiet));

    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_stop_handle(stop)
            .with_progress(progress),
    );

    let outcome = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Could not start scan of {}", args.path.display()))?;
    let code = ExitCode::from_outcome(&outcome);

    match outcome {
        ScanOutcome::Cancelled { processed, total } => {
            eprintln!("Scan stopped by user after {processed} of {total} files");
        }
        ScanOutcome::Completed(result) => {
            print_report(&result, args)?;
            if let Some(ref path) = args.export {
                output::export_to_file(&result, path, args.keep)
                    .with_context(|| format!("Failed to export results to {}", path.display()))?;
            }
            if !quiet {
                eprintln!("{}", status_line(&result));
            }
        }
    }

    Ok(code)
}

fn print_report(result: &ScanResult, args: &ScanArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.output {
        OutputFormat::Json => {
            let output = match args.keep {
                Some(policy) => JsonOutput::with_keep_policy(result, policy),
                None => JsonOutput::new(result),
            };
            output.write_to(&mut out, true)?;
        }
        OutputFormat::Text => {
            let output = TextOutput::new(result);
            match args.keep {
                Some(policy) => output.with_keep_policy(policy).write_to(&mut out)?,
                None => output.write_to(&mut out)?,
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// One-line summary of a completed scan.
#[must_use]
pub fn status_line(result: &ScanResult) -> String {
    let summary = &result.summary;
    let mut line = if result.is_empty() {
        format!(
            "Scan complete: no duplicates among {} files",
            summary.total_files
        )
    } else {
        format!(
            "Scan complete: {} duplicate files in {} groups, {} reclaimable ({:.1}% of scanned bytes)",
            summary.duplicate_files,
            summary.duplicate_groups,
            summary.wasted_display(),
            summary.wasted_percentage()
        )
    };

    let unreadable = summary.skipped_entries + summary.failed_hashes;
    if unreadable > 0 {
        line.push_str(&format!(" ({unreadable} unreadable entries skipped)"));
    }
    line
}
