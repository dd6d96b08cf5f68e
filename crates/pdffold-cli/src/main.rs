//! pdffold - Merge every PDF in a folder into a single document.
//!
//! Discovers the PDFs, puts them into reading order, merges the readable ones
//! and reports what was skipped.

mod cli;

use clap::Parser;
use std::process;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdffold::config::Config;
use pdffold::error::PdfFoldError;
use pdffold::output::{
    NoProgress, OutputFormatter, ProgressBar, ProgressSink, display_preview, display_summary,
};
use pdffold::pipeline::{self, CancelFlag, RunSummary};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start the async runtime: {err}");
            process::exit(1);
        }
    };

    let cancel = CancelFlag::new();
    let result = runtime.block_on(async {
        watch_ctrl_c(cancel.clone());
        run(cli, &cancel).await
    });

    shut_down(runtime);

    // Handle errors
    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Stop the runtime without joining blocking loads that outlived their
/// timeout. Such a thread only holds a read-only document.
fn shut_down(runtime: Runtime) {
    runtime.shutdown_background();
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Raise `cancel` on the first Ctrl-C.
fn watch_ctrl_c(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping after the current file");
            cancel.cancel();
        }
    });
}

/// Main application logic.
async fn run(cli: Cli, cancel: &CancelFlag) -> Result<(), PdfFoldError> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.is_verbose() {
        formatter.section(&format!("{} v{}", pdffold::NAME, pdffold::VERSION));
        formatter.blank_line();
    }

    formatter.info(&format!("Scanning {}...", config.root.display()));
    let plan = match pipeline::plan(&config).await {
        Ok(plan) => plan,
        Err(err) => {
            suggest_recursive(&config, &formatter, &err);
            return Err(err);
        }
    };

    display_preview(&formatter, &plan.files);

    let total = plan.files.len();
    let mut sink: Box<dyn ProgressSink> = if formatter.should_print() {
        Box::new(ProgressBar::auto(total))
    } else {
        Box::new(NoProgress)
    };

    let summary = pipeline::execute(plan, &config, sink.as_mut(), cancel).await?;
    drop(sink);

    report(&config, &formatter, &summary)
}

/// Print the summary as text or JSON.
fn report(
    config: &Config,
    formatter: &OutputFormatter,
    summary: &RunSummary,
) -> Result<(), PdfFoldError> {
    if config.json {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| PdfFoldError::other(format!("Failed to serialize summary: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    formatter.blank_line();
    display_summary(formatter, summary);

    if summary.dry_run {
        formatter.info("  Run without --dry-run to create the merged PDF");
    }

    Ok(())
}

/// Nothing matched at the top level; the PDFs may be in subfolders.
fn suggest_recursive(config: &Config, formatter: &OutputFormatter, err: &PdfFoldError) {
    if matches!(err, PdfFoldError::NoMergeableFiles { candidates: 0 }) && !config.recursive {
        formatter.warning("No PDF files found. Use --recursive to include subfolders.");
    }
}
