use super::run_log::RunLog;
use crate::core::models::fragment::Fragment;
use crate::core::models::job::{DatabaseRef, Job, JobId};
use std::path::PathBuf;
use tracing::debug;

/// Settings shared by every job of a run.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub work_dir: PathBuf,
    pub query_path: PathBuf,
    pub extra_params: Vec<String>,
    pub nproc: usize,
}

/// Builds one job per (fragment, database) pair, fragment-major and database-minor.
///
/// This order is the row order of the combined table. Prefix uniqueness follows from the
/// index pair, so no deduplication happens here. Databases are listed in `log` when given.
pub fn build_jobs(
    fragments: &[Fragment],
    databases: &[DatabaseRef],
    template: &JobTemplate,
    log: Option<&RunLog>,
) -> Vec<Job> {
    if let Some(log) = log {
        log.listing("DB List", databases);
    }

    let jobs: Vec<Job> = fragments
        .iter()
        .flat_map(|fragment| {
            let fragment_path = template.work_dir.join(fragment.file_name());
            databases.iter().enumerate().map(move |(db_index, database)| {
                let id = JobId::new(fragment.index, db_index);
                Job {
                    id,
                    prefix: id.prefix(),
                    query_path: template.query_path.clone(),
                    fragment_path: fragment_path.clone(),
                    database: database.clone(),
                    extra_params: template.extra_params.clone(),
                    nproc: template.nproc,
                }
            })
        })
        .collect();

    debug!(
        "Built {} job(s) from {} fragment(s) and {} database(s).",
        jobs.len(),
        fragments.len(),
        databases.len()
    );
    jobs
}
