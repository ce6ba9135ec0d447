//! # Engine Module
//!
//! The stateful machinery of a fragment search run.
//!
//! ## Overview
//!
//! A run turns a decomposition into a set of jobs, executes each job with the external
//! search executable, and folds every job's table into the combined table in job order.
//! Per-job failures are recorded and never stop the remaining jobs.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Immutable run settings and the search request
//! - **Error Handling** ([`error`]) - Errors that abort a run
//! - **Extraction** ([`extract`]) - Structure validation and fragment indexing
//! - **Job Building** ([`jobs`]) - The fragment × database cross product
//! - **Invocation** ([`invoker`]) - One external search process per job, with timeout and cancellation
//! - **Aggregation** ([`aggregator`]) - Streaming merge with a single header row
//! - **Run Log** ([`run_log`]) - Serialized, append-only audit trail
//! - **Progress Monitoring** ([`progress`]) - Events for front ends
//! - **Summary** ([`summary`]) - Per-job outcomes and the run manifest

pub mod aggregator;
pub mod config;
pub mod error;
pub mod extract;
pub mod invoker;
pub mod jobs;
pub mod progress;
pub mod run_log;
pub mod summary;
