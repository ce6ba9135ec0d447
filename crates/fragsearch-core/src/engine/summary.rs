use super::invoker::{JobResult, JobStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutcome {
    pub prefix: String,
    pub fragment: usize,
    pub database: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub rows: usize,
    pub supplied_header: bool,
    pub elapsed_secs: f64,
}

impl JobOutcome {
    pub fn new(result: &JobResult, database: &str, rows: usize, supplied_header: bool) -> Self {
        Self {
            prefix: result.prefix.clone(),
            fragment: result.id.fragment,
            database: database.to_string(),
            status: result.status.clone(),
            rows,
            supplied_header,
            elapsed_secs: result.elapsed.as_secs_f64(),
        }
    }
}

/// What a finished run produced. Serialized next to the combined table as an audit manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub core: String,
    pub scaffold: String,
    pub fragments: Vec<String>,
    pub databases: Vec<String>,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub header_written: bool,
    pub rows_written: usize,
    pub jobs: Vec<JobOutcome>,
}

impl RunSummary {
    pub fn total_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total_jobs() - self.succeeded()
    }

    pub fn manifest_path(&self) -> PathBuf {
        manifest_path_for(&self.output_path)
    }

    pub fn to_manifest(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

pub fn manifest_path_for(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".manifest.toml");
    output_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::job::JobId;
    use std::time::Duration;

    fn summary() -> RunSummary {
        let ok = JobResult {
            id: JobId::new(0, 0),
            prefix: "frag000_db000".to_string(),
            status: JobStatus::Succeeded,
            output: None,
            elapsed: Duration::from_millis(1500),
        };
        let failed = JobResult {
            id: JobId::new(0, 1),
            prefix: "frag000_db001".to_string(),
            status: JobStatus::Failed { code: Some(2) },
            output: None,
            elapsed: Duration::from_millis(10),
        };
        RunSummary {
            core: "c1ccccc1C(=O)O".to_string(),
            scaffold: "c1ccccc1".to_string(),
            fragments: vec!["C(=O)O".to_string()],
            databases: vec!["/db/a".to_string(), "/db/b".to_string()],
            output_path: PathBuf::from("/run/res.csv"),
            log_path: PathBuf::from("/run/log.dat"),
            header_written: true,
            rows_written: 3,
            jobs: vec![
                JobOutcome::new(&ok, "/db/a", 3, true),
                JobOutcome::new(&failed, "/db/b", 0, false),
            ],
        }
    }

    #[test]
    fn counts_successes_and_failures() {
        let summary = summary();
        assert_eq!(summary.total_jobs(), 2);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn manifest_sits_next_to_output() {
        assert_eq!(
            summary().manifest_path(),
            PathBuf::from("/run/res.csv.manifest.toml")
        );
    }

    #[test]
    fn manifest_records_each_job_status() {
        let manifest = summary().to_manifest().unwrap();
        assert!(manifest.contains("rows_written = 3"));
        assert!(manifest.contains("[[jobs]]"));
        assert!(manifest.contains("status = \"succeeded\""));
        assert!(manifest.contains("status = \"failed\""));
        assert!(manifest.contains("code = 2"));
    }
}
