mod cli;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::Cli;
use crate::config::PartialPipelineConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use clap::Parser;
use mdprep::engine::progress::ProgressReporter;
use mdprep::engine::tools::{Collaborators, preflight};
use mdprep::workflows::batch::{BatchDriver, BatchSummary};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task;
use tracing::{debug, error, info, warn};

/// Exit status of a run cut short by a second Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 mdprep v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let input_root = match &cli.input_root {
        Some(path) => path.clone(),
        None => prompt_input_root(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let pipeline_config = PartialPipelineConfig::discover(cli.config.as_deref())?
        .merge_with_cli(&cli)?;
    debug!("Resolved pipeline configuration: {:?}", pipeline_config);

    if cli.skip_checks {
        warn!("Skipping the external dependency check.");
    } else {
        preflight::check_dependencies(&pipeline_config)?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_task = {
        let cancel = cancel.clone();
        task::spawn(async move {
            if watch_interrupts(&cancel, tokio::signal::ctrl_c).await {
                eprintln!("\nSecond interrupt received; exiting now.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
    };

    let progress_handler = CliProgressHandler::new();
    let callback = progress_handler.get_callback();
    let batch_cancel = cancel.clone();
    let summary = task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(callback);
        let tools = Collaborators::from_config(&pipeline_config);
        BatchDriver::new(&pipeline_config, &tools, &reporter)
            .with_cancellation(&batch_cancel)
            .run(&input_root)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Batch task failed: {}", e)))??;

    signal_task.abort();
    print_summary(&summary);

    if cli.strict && !summary.all_succeeded() {
        warn!("Strict mode: reporting failure because not every job succeeded.");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Sets `cancel` on the first interrupt so the batch stops after the
/// current job. Returns `true` once a second interrupt arrives, and `false`
/// if interrupts cannot be received at all.
async fn watch_interrupts<F, Fut>(cancel: &AtomicBool, mut interrupted: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupted().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        return false;
    }
    cancel.store(true, Ordering::SeqCst);
    warn!("Interrupt received; cancelling the batch.");
    eprintln!("\nInterrupt received; stopping after the current job. Press Ctrl-C again to quit now.");

    interrupted().await.is_ok()
}

/// Asks the operator for the input root. Surrounding quotes, as left by
/// pasting a path from a file manager, are removed.
fn prompt_input_root(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    write!(output, "Directory with prediction outputs: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let path = line.trim().trim_matches(['"', '\'']);
    if path.is_empty() {
        return Err(CliError::Argument("no input directory given".to_string()));
    }
    Ok(PathBuf::from(path))
}

fn print_summary(summary: &BatchSummary) {
    println!("\n--- PREPARATION FINISHED ---");
    println!(
        "{} succeeded, {} failed, {} skipped ({} total)",
        summary.succeeded(),
        summary.failed(),
        summary.skipped.len(),
        summary.total()
    );
    for job_id in &summary.skipped {
        println!("    - {} not started", job_id);
    }
}
