use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileSearchConfig {
    pub executable: Option<PathBuf>,
    pub databases: Option<Vec<String>>,
    pub nproc: Option<usize>,
    #[serde(rename = "other-params")]
    pub other_params: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileLicenseConfig {
    #[serde(rename = "env-var")]
    pub env_var: Option<String>,
    pub path: Option<PathBuf>,
    pub candidates: Option<Vec<PathBuf>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileFilterConfig {
    #[serde(rename = "min-mol-wt")]
    pub min_mol_wt: Option<f64>,
    #[serde(rename = "min-psa")]
    pub min_psa: Option<f64>,
    #[serde(rename = "min-heavy-atoms")]
    pub min_heavy_atoms: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileExecutionConfig {
    pub workers: Option<usize>,
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "keep-intermediates")]
    pub keep_intermediates: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileOutputConfig {
    #[serde(rename = "work-dir")]
    pub work_dir: Option<PathBuf>,
    pub table: Option<PathBuf>,
    #[serde(rename = "run-log")]
    pub run_log: Option<PathBuf>,
    #[serde(rename = "header-rows")]
    pub header_rows: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileDecomposerConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub python: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub search: Option<FileSearchConfig>,
    pub license: Option<FileLicenseConfig>,
    pub filters: Option<FileFilterConfig>,
    pub execution: Option<FileExecutionConfig>,
    pub output: Option<FileOutputConfig>,
    pub decomposer: Option<FileDecomposerConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
