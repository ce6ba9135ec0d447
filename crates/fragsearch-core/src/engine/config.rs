use crate::core::io::table::DEFAULT_HEADER_ROWS;
use crate::core::models::job::DatabaseRef;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OUTPUT_FILE: &str = "res.csv";
pub const DEFAULT_LOG_FILE: &str = "log.dat";
pub const DEFAULT_LICENSE_ENV_VAR: &str = "OE_LICENSE";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Property floors passed to every search. Zero means no filtering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterFloors {
    pub min_mol_wt: f64,
    pub min_psa: f64,
    pub min_heavy_atoms: u32,
}

impl FilterFloors {
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-minMolWt".to_string(),
            format!("{:?}", self.min_mol_wt),
            "-minpsa".to_string(),
            self.min_psa.to_string(),
            "-minHvyAtom".to_string(),
            self.min_heavy_atoms.to_string(),
        ]
    }
}

/// License file exported to each search process, and only to that process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseConfig {
    pub env_var: String,
    pub path: PathBuf,
}

impl LicenseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: DEFAULT_LICENSE_ENV_VAR.to_string(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub workers: usize,
    pub timeout: Option<Duration>,
    pub keep_intermediates: bool,
}

/// Everything that stays fixed for the lifetime of a run. Built once, shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub executable: PathBuf,
    pub work_dir: PathBuf,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub license: Option<LicenseConfig>,
    pub floors: FilterFloors,
    pub header_rows: usize,
    pub execution: ExecutionConfig,
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    executable: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    license: Option<LicenseConfig>,
    floors: Option<FilterFloors>,
    header_rows: Option<usize>,
    workers: Option<usize>,
    timeout: Option<Duration>,
    keep_intermediates: Option<bool>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }
    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(path.into());
        self
    }
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }
    pub fn license(mut self, license: Option<LicenseConfig>) -> Self {
        self.license = license;
        self
    }
    pub fn floors(mut self, floors: FilterFloors) -> Self {
        self.floors = Some(floors);
        self
    }
    pub fn header_rows(mut self, rows: usize) -> Self {
        self.header_rows = Some(rows);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = Some(keep);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let executable = self
            .executable
            .ok_or(ConfigError::MissingParameter("executable"))?;

        let workers = self.workers.unwrap_or(1);
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "workers",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidValue {
                parameter: "timeout",
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        let work_dir = self.work_dir.unwrap_or_else(|| PathBuf::from("."));
        let output_path = self
            .output_path
            .unwrap_or_else(|| work_dir.join(DEFAULT_OUTPUT_FILE));
        let log_path = self
            .log_path
            .unwrap_or_else(|| work_dir.join(DEFAULT_LOG_FILE));

        Ok(SearchConfig {
            executable,
            work_dir,
            output_path,
            log_path,
            license: self.license,
            floors: self.floors.unwrap_or_default(),
            header_rows: self.header_rows.unwrap_or(DEFAULT_HEADER_ROWS),
            execution: ExecutionConfig {
                workers,
                timeout: self.timeout,
                keep_intermediates: self.keep_intermediates.unwrap_or(false),
            },
        })
    }
}

/// One fragment search request, as accepted from the command line or an embedding caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub core: String,
    pub scaffold: String,
    pub databases: Vec<DatabaseRef>,
    pub nproc: usize,
    pub extra_params: Option<String>,
}

impl SearchRequest {
    /// Free-form parameters for the search executable, split on whitespace and otherwise
    /// passed through untouched.
    pub fn extra_args(&self) -> Vec<String> {
        self.extra_params
            .as_deref()
            .map(|params| params.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_fails_without_executable() {
        let result = SearchConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("executable")));
    }

    #[test]
    fn build_applies_defaults_relative_to_work_dir() {
        let config = SearchConfigBuilder::new()
            .executable("/opt/brood/bin/brood")
            .work_dir("/scratch/run1")
            .build()
            .unwrap();

        assert_eq!(config.output_path, PathBuf::from("/scratch/run1/res.csv"));
        assert_eq!(config.log_path, PathBuf::from("/scratch/run1/log.dat"));
        assert_eq!(config.header_rows, 2);
        assert_eq!(config.execution.workers, 1);
        assert_eq!(config.execution.timeout, None);
        assert!(!config.execution.keep_intermediates);
        assert_eq!(config.floors, FilterFloors::default());
        assert!(config.license.is_none());
    }

    #[test]
    fn build_rejects_zero_workers_and_zero_timeout() {
        let zero_workers = SearchConfigBuilder::new()
            .executable("brood")
            .workers(0)
            .build();
        assert!(matches!(
            zero_workers,
            Err(ConfigError::InvalidValue {
                parameter: "workers",
                ..
            })
        ));

        let zero_timeout = SearchConfigBuilder::new()
            .executable("brood")
            .timeout(Some(Duration::ZERO))
            .build();
        assert!(matches!(
            zero_timeout,
            Err(ConfigError::InvalidValue {
                parameter: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn zero_floors_render_as_no_filtering_flags() {
        assert_eq!(
            FilterFloors::default().to_args(),
            vec!["-minMolWt", "0.0", "-minpsa", "0", "-minHvyAtom", "0"]
        );
    }

    #[test]
    fn extra_args_split_on_whitespace() {
        let request = SearchRequest {
            core: "c1ccccc1C(=O)O".to_string(),
            scaffold: "c1ccccc1".to_string(),
            databases: vec![],
            nproc: 1,
            extra_params: Some("  -maxHits 50\t-verbose ".to_string()),
        };
        assert_eq!(request.extra_args(), vec!["-maxHits", "50", "-verbose"]);

        let none = SearchRequest {
            extra_params: None,
            ..request
        };
        assert!(none.extra_args().is_empty());
    }
}
