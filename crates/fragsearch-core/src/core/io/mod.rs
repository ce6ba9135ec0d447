//! # I/O Module
//!
//! File formats exchanged with the external search executable.
//!
//! - [`structure_file`] - Writes a structure as a single-line input file, without a shell
//! - [`table`] - Reads a per-job search table and splits its header block from its data rows

pub mod structure_file;
pub mod table;
