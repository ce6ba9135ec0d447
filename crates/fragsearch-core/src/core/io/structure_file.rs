use crate::core::models::structure::Structure;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes `structure` to `writer` as one newline-terminated line.
pub fn write_structure_to(structure: &Structure, writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(structure.notation().as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Creates (or truncates) `path` and writes `structure` into it.
///
/// The notation is written byte-for-byte; nothing is ever interpreted by a shell.
pub fn write_structure_to_path<P: AsRef<Path>>(structure: &Structure, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_structure_to(structure, &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_notation_as_single_line() {
        let mut buffer = Vec::new();
        let structure = Structure::parse("c1ccccc1C(=O)O").unwrap();
        write_structure_to(&structure, &mut buffer).unwrap();
        assert_eq!(buffer, b"c1ccccc1C(=O)O\n");
    }

    #[test]
    fn shell_metacharacters_are_written_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.smi");
        let structure = Structure::parse("C'$(touch_pwned)'").unwrap();

        write_structure_to_path(&structure, &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "C'$(touch_pwned)'\n"
        );
        assert!(!dir.path().join("touch_pwned").exists());
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frag000.smi");
        std::fs::write(&path, "stale contents\nsecond line\n").unwrap();

        write_structure_to_path(&Structure::parse("CO").unwrap(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "CO\n");
    }
}
