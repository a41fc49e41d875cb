//! File-backed reservation store.
//!
//! Each committed transaction is appended to a JSON-lines journal as one line
//! holding the whole record batch, and fsynced before it becomes visible. The
//! journal is replayed on open so reservations survive a restart.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use super::ledger::{Journal, Ledger};
use super::{ReservationStore, StoreTx};
use crate::core::{ReservationRecord, StoreError};
use crate::util::serde::{ResourceId, TimeWindow};

struct JsonlJournal {
    file: Mutex<File>,
}

impl Journal for JsonlJournal {
    fn append(&self, records: &[ReservationRecord]) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(records)?;
        line.push('\n');

        let mut file = self.file.lock();
        let prev_len = file.metadata()?.len();
        if let Err(e) = file.write_all(line.as_bytes()).and_then(|()| file.sync_data()) {
            // Cut off whatever part of the batch reached the file.
            if let Err(trunc) = file.set_len(prev_len) {
                tracing::error!("failed to truncate journal after write error: {trunc}");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Durable store persisting reservations as JSON lines, one line per
/// committed transaction.
pub struct FileStore {
    path: PathBuf,
    ledger: Ledger,
    journal: JsonlJournal,
}

impl FileStore {
    /// Open (or create) the journal at `path` and replay it.
    ///
    /// # Errors
    ///
    /// I/O failures, or a journal line that is not a valid batch. A trailing
    /// partial line from an interrupted write is dropped as a whole.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }

        let ledger = Ledger::new();
        let (batches, torn) = Self::replay(&path)?;
        let count: usize = batches.iter().map(Vec::len).sum();
        tracing::info!("replayed {count} reservation(s) from {}", path.display());
        if torn {
            Self::rewrite(&path, &batches)?;
        }
        ledger.apply(batches.into_iter().flatten());

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            ledger,
            journal: JsonlJournal {
                file: Mutex::new(file),
            },
        })
    }

    /// Journal location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the journal into committed batches. The flag is set when a torn
    /// trailing line was dropped.
    fn replay(path: &Path) -> Result<(Vec<Vec<ReservationRecord>>, bool), StoreError> {
        if !path.exists() {
            return Ok((Vec::new(), false));
        }
        let reader = BufReader::new(File::open(path)?);
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let last = lines.len().saturating_sub(1);
        let mut batches = Vec::with_capacity(lines.len());
        let mut torn = false;
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Vec<ReservationRecord>>(line) {
                Ok(batch) => batches.push(batch),
                Err(e) if idx == last => {
                    tracing::warn!("dropping torn trailing journal batch: {e}");
                    torn = true;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok((batches, torn))
    }

    /// Replace the journal with exactly `batches` so later appends start on a
    /// clean line boundary.
    fn rewrite(path: &Path, batches: &[Vec<ReservationRecord>]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        for batch in batches {
            writeln!(file, "{}", serde_json::to_string(batch)?)?;
        }
        file.sync_data()?;
        Ok(())
    }
}

impl ReservationStore for FileStore {
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError> {
        Ok(Box::new(self.ledger.begin(timeout, Some(&self.journal as &dyn Journal))?))
    }

    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        Ok(self.ledger.overlapping(resource, range))
    }

    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError> {
        Ok(self.ledger.resources())
    }
}
