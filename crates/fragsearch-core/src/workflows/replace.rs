use crate::core::decompose::Decomposer;
use crate::core::io::structure_file::write_structure_to_path;
use crate::core::models::fragment::Fragment;
use crate::core::models::job::Job;
use crate::engine::aggregator::{HeaderState, ResultAggregator};
use crate::engine::config::{SearchConfig, SearchRequest};
use crate::engine::error::EngineError;
use crate::engine::extract::FragmentExtractor;
use crate::engine::invoker::{JobStatus, SearchInvoker};
use crate::engine::jobs::{JobTemplate, build_jobs};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::run_log::RunLog;
use crate::engine::summary::{JobOutcome, RunSummary};
use futures_util::stream::{self, StreamExt};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

const QUERY_FILE: &str = "core.smi";

/// Runs the full fragment search for `request`.
///
/// The run log at `config.log_path` is open for the whole run and records why the run
/// ended, including when it aborts. The combined table is built at `<output>.partial` and
/// renamed to `config.output_path` only once every job has been folded, so an interrupted
/// run never leaves a file that looks complete.
#[instrument(skip_all, name = "fragment_search_workflow")]
pub async fn run(
    request: &SearchRequest,
    config: &SearchConfig,
    decomposer: &dyn Decomposer,
    reporter: &ProgressReporter<'_>,
    cancel: &CancellationToken,
) -> Result<RunSummary, EngineError> {
    validate_request(request)?;
    fs::create_dir_all(&config.work_dir).map_err(|e| setup_error(&config.work_dir, e))?;
    let anchored_config = anchored(config)?;
    let config = &anchored_config;
    let log = RunLog::create(&config.log_path).map_err(|e| setup_error(&config.log_path, e))?;

    let result = execute(request, config, decomposer, reporter, cancel, &log).await;
    match &result {
        Ok(summary) => log.line(format!(
            "Finished: {} of {} job(s) succeeded, {} row(s) written to {}",
            summary.succeeded(),
            summary.total_jobs(),
            summary.rows_written,
            summary.output_path.display()
        )),
        Err(e) => log.line(format!("Aborted: {}", e)),
    }
    result
}

/// Decomposes and builds the job list without writing files or starting any search.
pub fn plan(
    request: &SearchRequest,
    config: &SearchConfig,
    decomposer: &dyn Decomposer,
) -> Result<(Vec<Fragment>, Vec<Job>), EngineError> {
    validate_request(request)?;
    let anchored_config = anchored(config)?;
    let config = &anchored_config;
    let (_, fragments) =
        FragmentExtractor::new(decomposer).extract(&request.core, &request.scaffold, None)?;
    let jobs = build_jobs(&fragments, &request.databases, &template(request, config), None);
    Ok((fragments, jobs))
}

async fn execute(
    request: &SearchRequest,
    config: &SearchConfig,
    decomposer: &dyn Decomposer,
    reporter: &ProgressReporter<'_>,
    cancel: &CancellationToken,
    log: &RunLog,
) -> Result<RunSummary, EngineError> {
    // === Phase 1: Decomposition ===
    reporter.report(Progress::PhaseStart {
        name: "Decomposing core",
    });
    let (core, fragments) = off_runtime(|| {
        FragmentExtractor::new(decomposer).extract(&request.core, &request.scaffold, Some(log))
    })?;
    reporter.report(Progress::PhaseFinish);
    if cancel.is_cancelled() {
        let total = fragments.len() * request.databases.len();
        log.line("Cancelled: interrupted during decomposition, no search started");
        warn!("Run cancelled before any of {} job(s) started.", total);
        return Err(EngineError::Cancelled {
            completed: 0,
            total,
        });
    }

    // === Phase 2: Transient inputs and job list ===
    reporter.report(Progress::PhaseStart {
        name: "Preparing search inputs",
    });
    let template = template(request, config);
    write_structure_to_path(&core, &template.query_path)
        .map_err(|e| setup_error(&template.query_path, e))?;
    let mut transient_inputs = vec![template.query_path.clone()];
    for fragment in &fragments {
        let path = config.work_dir.join(fragment.file_name());
        write_structure_to_path(&fragment.structure, &path).map_err(|e| setup_error(&path, e))?;
        transient_inputs.push(path);
    }
    let jobs = build_jobs(&fragments, &request.databases, &template, Some(log));
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Dispatch and streaming aggregation ===
    let partial_path = partial_path_for(&config.output_path);
    let partial_file = File::create(&partial_path).map_err(|e| EngineError::AggregationIo {
        path: partial_path.display().to_string(),
        source: e,
    })?;
    let mut aggregator = ResultAggregator::new(
        partial_file,
        partial_path.display().to_string(),
        config.header_rows,
        !config.execution.keep_intermediates,
    );

    info!(
        "Dispatching {} job(s) with up to {} in flight.",
        jobs.len(),
        config.execution.workers
    );
    reporter.report(Progress::DispatchStart {
        total_jobs: jobs.len() as u64,
    });

    let invoker = SearchInvoker::new(config, Some(log));
    let mut outcomes = Vec::with_capacity(jobs.len());
    {
        let mut results = stream::iter(jobs.iter())
            .map(|job| invoker.invoke(job, cancel))
            .buffered(config.execution.workers.max(1));

        let mut job_iter = jobs.iter();
        while let Some(result) = results.next().await {
            let Some(job) = job_iter.next() else { break };
            if result.status == JobStatus::Cancelled {
                break;
            }

            let contribution = aggregator.fold(&result)?;
            log.line(format!(
                "{}: {} ({} row(s))",
                result.prefix, result.status, contribution.rows
            ));
            reporter.report(Progress::JobFolded {
                prefix: result.prefix.clone(),
                succeeded: result.status.is_success(),
                rows: contribution.rows,
            });
            outcomes.push(JobOutcome::new(
                &result,
                job.database.as_str(),
                contribution.rows,
                contribution.supplied_header,
            ));
        }
    }
    reporter.report(Progress::DispatchFinish);

    if outcomes.len() < jobs.len() {
        aggregator.finish()?;
        log.line(format!(
            "Cancelled: partial table with {} completed job(s) left at {}",
            outcomes.len(),
            partial_path.display()
        ));
        warn!(
            "Run cancelled after {} of {} job(s).",
            outcomes.len(),
            jobs.len()
        );
        return Err(EngineError::Cancelled {
            completed: outcomes.len(),
            total: jobs.len(),
        });
    }

    // === Phase 4: Finalize ===
    reporter.report(Progress::PhaseStart {
        name: "Finalizing combined table",
    });
    let header_written = aggregator.state() == HeaderState::HeaderFixed;
    let rows_written = aggregator.rows_written();
    let file = aggregator.finish()?;
    file.sync_all()
        .and_then(|_| fs::rename(&partial_path, &config.output_path))
        .map_err(|e| EngineError::AggregationIo {
            path: config.output_path.display().to_string(),
            source: e,
        })?;

    let summary = RunSummary {
        core: request.core.clone(),
        scaffold: request.scaffold.clone(),
        fragments: fragments
            .iter()
            .map(|f| f.structure.notation().to_string())
            .collect(),
        databases: request.databases.iter().map(|d| d.to_string()).collect(),
        output_path: config.output_path.clone(),
        log_path: config.log_path.clone(),
        header_written,
        rows_written,
        jobs: outcomes,
    };
    write_manifest(&summary);

    if !config.execution.keep_intermediates {
        for path in &transient_inputs {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove transient input {:?}: {}", path, e);
            }
        }
    }
    reporter.report(Progress::PhaseFinish);

    info!(
        "Workflow complete: {} of {} job(s) succeeded, {} row(s) written.",
        summary.succeeded(),
        summary.total_jobs(),
        summary.rows_written
    );
    Ok(summary)
}

/// Runs a blocking step without stalling the other tasks of a multi-threaded runtime.
/// On a current-thread runtime the step runs in place.
fn off_runtime<T>(step: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(step)
        }
        _ => step(),
    }
}

fn validate_request(request: &SearchRequest) -> Result<(), EngineError> {
    if request.nproc == 0 {
        return Err(EngineError::InvalidRequest(
            "processor budget per job must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Rewrites the work dir, and an executable given as a relative path, to absolute paths.
///
/// Each search runs with the work dir as its current directory, so every path it receives
/// must still resolve from there.
fn anchored(config: &SearchConfig) -> Result<SearchConfig, EngineError> {
    let work_dir =
        std::path::absolute(&config.work_dir).map_err(|e| setup_error(&config.work_dir, e))?;
    let executable = if config.executable.components().count() > 1 {
        std::path::absolute(&config.executable).map_err(|e| setup_error(&config.executable, e))?
    } else {
        config.executable.clone()
    };
    Ok(SearchConfig {
        work_dir,
        executable,
        ..config.clone()
    })
}

fn template(request: &SearchRequest, config: &SearchConfig) -> JobTemplate {
    JobTemplate {
        work_dir: config.work_dir.clone(),
        query_path: config.work_dir.join(QUERY_FILE),
        extra_params: request.extra_args(),
        nproc: request.nproc,
    }
}

fn write_manifest(summary: &RunSummary) {
    let path = summary.manifest_path();
    let written = summary
        .to_manifest()
        .map_err(|e| e.to_string())
        .and_then(|text| fs::write(&path, text).map_err(|e| e.to_string()));
    if let Err(e) = written {
        warn!("Failed to write run manifest {:?}: {}", path, e);
    }
}

/// Where the combined table lives until the run completes.
pub fn partial_path_for(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output_path.with_file_name(name)
}

fn setup_error(path: &Path, source: std::io::Error) -> EngineError {
    EngineError::Setup {
        path: path.display().to_string(),
        source,
    }
}
