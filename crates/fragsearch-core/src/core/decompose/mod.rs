//! # Decomposition Module
//!
//! The seam to the external cheminformatics capability that removes a scaffold from a core
//! and returns the disconnected residue pieces as line notations.
//!
//! - [`Decomposer`] - The contract; any matching closure implements it
//! - [`command::CommandDecomposer`] - Delegates to a helper program over argv and stdout

pub mod command;

use crate::core::models::structure::Structure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("Failed to launch decomposition helper '{program}': {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("Decomposition helper exited with {status}: {stderr}")]
    HelperFailed { status: String, stderr: String },
    #[error("Decomposition helper produced non UTF-8 output")]
    InvalidOutput,
    #[error("{0}")]
    Rejected(String),
}

/// Removes `scaffold` from `core` and returns the residual fragments as line notations,
/// in the order the decomposition yields them.
pub trait Decomposer {
    fn decompose(&self, core: &Structure, scaffold: &Structure)
    -> Result<Vec<String>, DecomposeError>;
}

impl<F> Decomposer for F
where
    F: Fn(&Structure, &Structure) -> Result<Vec<String>, DecomposeError>,
{
    fn decompose(
        &self,
        core: &Structure,
        scaffold: &Structure,
    ) -> Result<Vec<String>, DecomposeError> {
        self(core, scaffold)
    }
}

/// Splits a dot-disconnected line notation into its pieces, dropping empty ones.
pub fn split_disconnected(notation: &str) -> Vec<String> {
    notation
        .trim()
        .split('.')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
