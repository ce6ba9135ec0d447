use csv::ByteRecord;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

/// Number of leading records the search executable emits before any hit.
pub const DEFAULT_HEADER_ROWS: usize = 2;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to open table '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Malformed CSV in '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// A per-job search table, split into its header block and its data rows.
///
/// Records are kept as raw bytes: the columns belong to the search executable and are
/// never interpreted here. The header block is counted in CSV records, not text lines:
/// blank lines are skipped by the reader, and a quoted field may span several lines.
/// Rows are re-serialized on output, so quoting and line endings follow the csv writer
/// rather than the executable.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTable {
    records: Vec<ByteRecord>,
    header_rows: usize,
}

impl SearchTable {
    pub fn read_from(reader: impl Read, header_rows: usize) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let records = csv_reader
            .byte_records()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            records,
            header_rows,
        })
    }

    /// Reads the table at `path`. An absent file is `Ok(None)`: the executable writes no
    /// table when a search finds nothing, which is not an error.
    pub fn read_from_path(path: &Path, header_rows: usize) -> Result<Option<Self>, TableError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TableError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        Self::read_from(file, header_rows)
            .map(Some)
            .map_err(|e| TableError::Csv {
                path: path.display().to_string(),
                source: e,
            })
    }

    /// True when at least one record follows the header block.
    pub fn has_data(&self) -> bool {
        self.records.len() > self.header_rows
    }

    /// The column title row, present only for tables that carry data.
    pub fn header(&self) -> Option<&ByteRecord> {
        if self.has_data() {
            self.records.first()
        } else {
            None
        }
    }

    pub fn data_rows(&self) -> &[ByteRecord] {
        self.records.get(self.header_rows..).unwrap_or(&[])
    }
}
