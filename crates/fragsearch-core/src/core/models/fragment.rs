use super::structure::Structure;

/// A residual piece of the core left after removing the scaffold.
///
/// The index is the fragment's position in the decomposition output. Downstream job
/// identity and output file names are derived from it, so fragments are never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub index: usize,
    pub structure: Structure,
}

impl Fragment {
    pub fn new(index: usize, structure: Structure) -> Self {
        Self { index, structure }
    }

    /// File name of the single-line structure file handed to the search executable.
    pub fn file_name(&self) -> String {
        format!("frag{:03}.smi", self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_zero_padded_by_index() {
        let fragment = Fragment::new(7, Structure::parse("C(=O)O").unwrap());
        assert_eq!(fragment.file_name(), "frag007.smi");
    }

    #[test]
    fn file_name_widens_past_three_digits() {
        let fragment = Fragment::new(1234, Structure::parse("C").unwrap());
        assert_eq!(fragment.file_name(), "frag1234.smi");
    }
}
