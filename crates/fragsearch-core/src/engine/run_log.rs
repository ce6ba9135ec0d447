use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only audit log of one run: fragment and database listings, every search command
/// line, and per-job outcomes.
///
/// Each entry is written and flushed under one lock, so entries from concurrent jobs never
/// interleave within a line. The file is closed when the log is dropped. Write failures are
/// reported through `tracing` and never interrupt the run.
pub struct RunLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl RunLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `title:` followed by one ` <index>: <item>` line per item.
    pub fn listing<I, T>(&self, title: &str, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let mut entry = format!("{}:\n", title);
        for (i, item) in items.into_iter().enumerate() {
            entry.push_str(&format!(" {:3}: {}\n", i, item));
        }
        self.write_entry(&entry);
    }

    pub fn command(&self, argv: &[String]) {
        self.write_entry(&format!("{:?}\n", argv));
    }

    pub fn line(&self, message: impl Display) {
        self.write_entry(&format!("{}\n", message));
    }

    fn write_entry(&self, entry: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            warn!("Run log mutex was poisoned. Dropping entry: {}", entry.trim_end());
            return;
        };
        if let Err(e) = writer
            .write_all(entry.as_bytes())
            .and_then(|_| writer.flush())
        {
            warn!("Failed to write to run log {:?}: {}", self.path, e);
        }
    }
}
