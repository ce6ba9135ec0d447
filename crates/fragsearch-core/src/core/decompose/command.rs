use super::{DecomposeError, Decomposer, split_disconnected};
use crate::core::models::structure::Structure;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `<program> <args..> <core> <scaffold>` and reads the residue from stdout.
///
/// The helper prints the residue as one dot-disconnected line notation; empty output means
/// the scaffold covers the whole core. A non-zero exit means either input could not be
/// parsed. No shell is involved, so structure strings are passed as plain argv entries.
#[derive(Debug, Clone)]
pub struct CommandDecomposer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandDecomposer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Decomposer for CommandDecomposer {
    fn decompose(
        &self,
        core: &Structure,
        scaffold: &Structure,
    ) -> Result<Vec<String>, DecomposeError> {
        debug!(
            "Running decomposition helper {:?} for core '{}' and scaffold '{}'",
            self.program, core, scaffold
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(core.notation())
            .arg(scaffold.notation())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DecomposeError::Launch {
                program: self.program.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DecomposeError::HelperFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| DecomposeError::InvalidOutput)?;
        Ok(split_disconnected(&stdout))
    }
}
