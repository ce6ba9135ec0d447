use super::error::{EngineError, StructureRole};
use super::run_log::RunLog;
use crate::core::decompose::Decomposer;
use crate::core::models::fragment::Fragment;
use crate::core::models::structure::Structure;
use tracing::{debug, info};

/// Parses the request structures and turns the decomposition output into indexed fragments.
pub struct FragmentExtractor<'a> {
    decomposer: &'a dyn Decomposer,
}

impl<'a> FragmentExtractor<'a> {
    pub fn new(decomposer: &'a dyn Decomposer) -> Self {
        Self { decomposer }
    }

    /// Validates both inputs, decomposes, and lists the fragments in `log` (when given).
    ///
    /// Fragment order is the decomposer's order.
    pub fn extract(
        &self,
        core: &str,
        scaffold: &str,
        log: Option<&RunLog>,
    ) -> Result<(Structure, Vec<Fragment>), EngineError> {
        let core_structure = parse_structure(core, StructureRole::Core)?;
        let scaffold_structure = parse_structure(scaffold, StructureRole::Scaffold)?;

        let pieces = self
            .decomposer
            .decompose(&core_structure, &scaffold_structure)
            .map_err(|e| EngineError::InvalidStructure {
                role: StructureRole::Core,
                notation: core.to_string(),
                reason: e.to_string(),
            })?;

        let fragments = pieces
            .iter()
            .enumerate()
            .map(|(index, piece)| {
                parse_structure(piece, StructureRole::Fragment)
                    .map(|structure| Fragment::new(index, structure))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Decomposed core '{}' against scaffold '{}' into {} fragment(s).",
            core,
            scaffold,
            fragments.len()
        );
        for fragment in &fragments {
            debug!("Fragment {}: {}", fragment.index, fragment.structure);
        }

        if let Some(log) = log {
            log.listing("Fragments", fragments.iter().map(|f| &f.structure));
        }

        Ok((core_structure, fragments))
    }
}

fn parse_structure(notation: &str, role: StructureRole) -> Result<Structure, EngineError> {
    Structure::parse(notation).map_err(|e| EngineError::InvalidStructure {
        role,
        notation: notation.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decompose::DecomposeError;
    use tempfile::tempdir;

    fn fixed(
        pieces: &'static [&'static str],
    ) -> impl Fn(&Structure, &Structure) -> Result<Vec<String>, DecomposeError> {
        move |_, _| Ok(pieces.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn fragments_keep_decomposer_order() {
        let decomposer = fixed(&["[*:1]N", "[*:2]C(=O)O", "[*:3]Cl"]);
        let (_, fragments) = FragmentExtractor::new(&decomposer)
            .extract("Nc1cc(Cl)ccc1C(=O)O", "c1ccccc1", None)
            .unwrap();

        let notations: Vec<_> = fragments.iter().map(|f| f.structure.notation()).collect();
        assert_eq!(notations, vec!["[*:1]N", "[*:2]C(=O)O", "[*:3]Cl"]);
        let indices: Vec<_> = fragments.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn invalid_core_fails_before_decomposition() {
        let decomposer = |_: &Structure, _: &Structure| -> Result<Vec<String>, DecomposeError> {
            panic!("decomposer must not run for an invalid core")
        };
        let err = FragmentExtractor::new(&decomposer)
            .extract("c1ccccc1C(=O", "c1ccccc1", None)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InvalidStructure {
                role: StructureRole::Core,
                ..
            }
        ));
    }

    #[test]
    fn invalid_scaffold_is_reported_as_scaffold() {
        let decomposer = fixed(&[]);
        let err = FragmentExtractor::new(&decomposer)
            .extract("c1ccccc1C(=O)O", "", None)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InvalidStructure {
                role: StructureRole::Scaffold,
                ..
            }
        ));
    }

    #[test]
    fn decomposer_failure_is_invalid_structure() {
        let decomposer = |_: &Structure, _: &Structure| -> Result<Vec<String>, DecomposeError> {
            Err(DecomposeError::Rejected("scaffold not found in core".to_string()))
        };
        let err = FragmentExtractor::new(&decomposer)
            .extract("CCO", "c1ccccc1", None)
            .unwrap_err();

        match err {
            EngineError::InvalidStructure { reason, .. } => {
                assert!(reason.contains("scaffold not found"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fragments_are_listed_in_run_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.dat");
        let log = RunLog::create(&path).unwrap();
        let decomposer = fixed(&["C(=O)O"]);

        FragmentExtractor::new(&decomposer)
            .extract("c1ccccc1C(=O)O", "c1ccccc1", Some(&log))
            .unwrap();
        drop(log);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Fragments:\n   0: C(=O)O\n"
        );
    }
}
