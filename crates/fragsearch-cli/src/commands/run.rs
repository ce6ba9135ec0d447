use crate::cli::SearchArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use fragsearch::engine::progress::ProgressReporter;
use fragsearch::workflows;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(args: SearchArgs, cancel: CancellationToken) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let config = build_config(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting fragment search against {} database(s)...",
        config.request.databases.len()
    );
    info!("Invoking the fragment replacement workflow...");

    let summary = workflows::replace::run(
        &config.request,
        &config.search,
        &config.decomposer,
        &reporter,
        &cancel,
    )
    .await?;

    info!(
        "Workflow finished: {} fragment(s), {} job(s), {} row(s).",
        summary.fragments.len(),
        summary.total_jobs(),
        summary.rows_written
    );

    if summary.failed() > 0 {
        warn!(
            "{} of {} search(es) failed; see {:?}.",
            summary.failed(),
            summary.total_jobs(),
            summary.log_path
        );
        println!(
            "Warning: {} of {} search(es) did not succeed. Details are in {}.",
            summary.failed(),
            summary.total_jobs(),
            summary.log_path.display()
        );
    }

    if summary.rows_written == 0 {
        println!(
            "No hits found. An empty table was written to: {}",
            summary.output_path.display()
        );
    } else {
        println!(
            "✓ {} hit(s) from {} search(es) written to: {}",
            summary.rows_written,
            summary.succeeded(),
            summary.output_path.display()
        );
    }
    println!("  Run log: {}", summary.log_path.display());

    Ok(())
}
