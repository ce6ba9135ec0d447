use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// An opaque reference to a search database, usually a path understood by the executable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DatabaseRef(String);

impl DatabaseRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatabaseRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DatabaseRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identity of a job: which fragment is searched against which database.
///
/// Everything a job produces on disk is named from this pair, so a job's files can be
/// recovered from the two indices alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId {
    pub fragment: usize,
    pub database: usize,
}

impl JobId {
    pub fn new(fragment: usize, database: usize) -> Self {
        Self { fragment, database }
    }

    pub fn prefix(&self) -> String {
        format!("frag{:03}_db{:03}", self.fragment, self.database)
    }

    /// Name of the table the search executable writes for this prefix.
    pub fn output_file_name(&self) -> String {
        format!("{}.csv", self.prefix())
    }

    pub fn console_file_name(&self) -> String {
        format!("{}.log", self.prefix())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// One unit of work: one fragment searched against one database.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub prefix: String,
    pub query_path: PathBuf,
    pub fragment_path: PathBuf,
    pub database: DatabaseRef,
    pub extra_params: Vec<String>,
    pub nproc: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_encodes_both_indices_with_fixed_width() {
        assert_eq!(JobId::new(0, 0).prefix(), "frag000_db000");
        assert_eq!(JobId::new(0, 1).prefix(), "frag000_db001");
        assert_eq!(JobId::new(12, 345).prefix(), "frag012_db345");
    }

    #[test]
    fn file_names_derive_from_prefix() {
        let id = JobId::new(3, 4);
        assert_eq!(id.output_file_name(), "frag003_db004.csv");
        assert_eq!(id.console_file_name(), "frag003_db004.log");
        assert_eq!(id.to_string(), "frag003_db004");
    }

    #[test]
    fn job_ids_order_fragment_major() {
        let mut ids = vec![JobId::new(1, 0), JobId::new(0, 1), JobId::new(0, 0)];
        ids.sort();
        assert_eq!(
            ids,
            vec![JobId::new(0, 0), JobId::new(0, 1), JobId::new(1, 0)]
        );
    }
}
