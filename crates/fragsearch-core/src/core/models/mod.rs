//! # Core Models Module
//!
//! Immutable data describing one fragment search run.
//!
//! ## Key Components
//!
//! - [`structure`] - A validated chemical line-notation string
//! - [`fragment`] - A residual piece of the core, with its position in the decomposition
//! - [`job`] - One fragment searched against one database, and its identity
//!
//! ```ignore
//! use fragsearch::core::models::structure::Structure;
//!
//! let core = Structure::parse("c1ccccc1C(=O)O")?;
//! assert_eq!(core.notation(), "c1ccccc1C(=O)O");
//! ```

pub mod fragment;
pub mod job;
pub mod structure;
