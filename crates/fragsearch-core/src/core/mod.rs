//! # Core Module
//!
//! Stateless building blocks of the fragment search workflow.
//!
//! - **Models** ([`models`]) - Line-notation structures, fragments, database references and jobs
//! - **I/O** ([`io`]) - Single-line structure files and per-job search tables
//! - **Decomposition** ([`decompose`]) - The seam to the external cheminformatics capability

pub mod decompose;
pub mod io;
pub mod models;
