use super::error::EngineError;
use super::invoker::JobResult;
use crate::core::io::table::SearchTable;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Whether the combined table's single header row has been written yet.
///
/// `AwaitingHeader` moves to `HeaderFixed` on the first job table that has at least one
/// data row below its header block. `HeaderFixed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    AwaitingHeader,
    HeaderFixed,
}

/// What one job added to the combined table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contribution {
    pub rows: usize,
    pub supplied_header: bool,
}

/// Streams per-job tables into one combined table, in the order results are folded.
///
/// Records are copied field for field, not byte for byte: quoting and line endings in the
/// combined table are the csv writer's own.
pub struct ResultAggregator<W: Write> {
    writer: csv::Writer<W>,
    destination: String,
    header_rows: usize,
    state: HeaderState,
    rows_written: usize,
    remove_consumed: bool,
}

impl<W: Write> ResultAggregator<W> {
    /// `destination` names the combined table in error messages. When `remove_consumed`
    /// is set, each job table is deleted once it has been read.
    pub fn new(
        writer: W,
        destination: impl Into<String>,
        header_rows: usize,
        remove_consumed: bool,
    ) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .has_headers(false)
                .from_writer(writer),
            destination: destination.into(),
            header_rows,
            state: HeaderState::AwaitingHeader,
            rows_written: 0,
            remove_consumed,
        }
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Appends the data rows of `result`'s table. Absent, unreadable and header-only
    /// tables contribute nothing and leave the header state untouched.
    pub fn fold(&mut self, result: &JobResult) -> Result<Contribution, EngineError> {
        let Some(path) = result.output.as_deref() else {
            return Ok(Contribution::default());
        };

        let table = match SearchTable::read_from_path(path, self.header_rows) {
            Ok(Some(table)) => table,
            Ok(None) => {
                warn!("Table for {} vanished before aggregation.", result.prefix);
                return Ok(Contribution::default());
            }
            Err(e) => {
                warn!("Skipping table for {}: {}", result.prefix, e);
                return Ok(Contribution::default());
            }
        };

        let mut contribution = Contribution::default();
        if let Some(header) = table.header() {
            if self.state == HeaderState::AwaitingHeader {
                debug!("Header fixed from {}.", result.prefix);
                self.writer
                    .write_byte_record(header)
                    .map_err(|e| self.io_error(e))?;
                self.state = HeaderState::HeaderFixed;
                contribution.supplied_header = true;
            }
            for row in table.data_rows() {
                self.writer
                    .write_byte_record(row)
                    .map_err(|e| self.io_error(e))?;
            }
            contribution.rows = table.data_rows().len();
            self.rows_written += contribution.rows;
        }

        if self.remove_consumed {
            remove_consumed(path);
        }
        Ok(contribution)
    }

    /// Pushes everything folded so far to the underlying writer. Only whole records are
    /// ever written.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        self.writer.flush().map_err(|e| EngineError::AggregationIo {
            path: self.destination.clone(),
            source: e,
        })
    }

    pub fn finish(mut self) -> Result<W, EngineError> {
        self.flush()?;
        let destination = self.destination;
        self.writer
            .into_inner()
            .map_err(|e| EngineError::AggregationIo {
                path: destination,
                source: io::Error::new(e.error().kind(), e.error().to_string()),
            })
    }

    fn io_error(&self, e: csv::Error) -> EngineError {
        EngineError::AggregationIo {
            path: self.destination.clone(),
            source: io::Error::other(e),
        }
    }
}

fn remove_consumed(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove consumed table {:?}: {}", path, e);
    }
}
