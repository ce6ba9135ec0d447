//! # fragsearch Core Library
//!
//! Fragment-replacement search: a query structure is decomposed against a scaffold into
//! residual fragments, every (fragment, database) pair is searched with an external
//! structure-search executable, and the per-job tables are merged into one combined table.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that each concern can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Immutable models (`Structure`, `Fragment`, `Job`),
//!   structure-file and per-job table I/O, and the decomposition seam (`Decomposer`).
//!
//! - **[`engine`]: The Logic Core.** Configuration, the error taxonomy, the run log, job
//!   building, the external search invoker and the streaming result aggregator.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the complete
//!   decompose, fan out and merge procedure.

pub mod core;
pub mod engine;
pub mod workflows;
