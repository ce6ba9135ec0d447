//! # Workflows Module
//!
//! High-level entry points that run a complete fragment search.
//!
//! ## Overview
//!
//! A workflow owns the whole pipeline: decomposition, transient input files, job dispatch,
//! streaming aggregation, the run log and final cleanup. Callers supply a request, an
//! immutable configuration and a decomposition capability, and get back a summary.
//!
//! - **Fragment Replacement Search** ([`replace`]) - Search every fragment of a core against
//!   every configured database and merge the hits.

pub mod replace;
