use super::config::ConfigError;
use thiserror::Error;

/// Which input of a request a structure error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureRole {
    Core,
    Scaffold,
    Fragment,
}

impl std::fmt::Display for StructureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureRole::Core => f.write_str("core"),
            StructureRole::Scaffold => f.write_str("scaffold"),
            StructureRole::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors that abort a run. Per-job failures are never represented here; they are
/// recorded in each job's result and the run carries on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid {role} structure '{notation}': {reason}")]
    InvalidStructure {
        role: StructureRole,
        notation: String,
        reason: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to prepare '{path}': {source}")]
    Setup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write combined table '{path}': {source}")]
    AggregationIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Run cancelled after {completed} of {total} job(s)")]
    Cancelled { completed: usize, total: usize },
}
