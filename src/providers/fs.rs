use std::path::{Path, PathBuf};

use super::RecordSource;
use crate::error::RetrievalError;
use crate::MessageRecord;

/// Filesystem-backed record store writing one JSONL file under a root
/// directory. All I/O is synchronous `std::fs`: `find_pending` is called
/// from the workflow fiber and must not suspend.
#[derive(Clone)]
pub struct FsRecordStore {
    root: PathBuf,
    records_file: PathBuf,
}

impl FsRecordStore {
    /// Create a new store rooted at the given directory path.
    /// If `reset_on_create` is true, delete any existing data under the root first.
    pub fn new(root: impl AsRef<Path>, reset_on_create: bool) -> Self {
        let path = root.as_ref().to_path_buf();
        if reset_on_create {
            let _ = std::fs::remove_dir_all(&path);
        }
        let records_file = path.join("records.jsonl");
        // best-effort create
        let _ = std::fs::create_dir_all(&path);
        let _ = std::fs::OpenOptions::new().create(true).append(true).open(&records_file);
        Self { root: path, records_file }
    }

    /// Append one record as a JSONL line.
    pub fn insert(&self, record: &MessageRecord) -> std::io::Result<()> {
        use std::io::Write as _;
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_file)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Remove the root directory and all contents.
    pub fn reset(&self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

impl RecordSource for FsRecordStore {
    /// Read the records file and decode each line, stopping at `batch_size`.
    /// A line that fails to decode fails the whole query: a ledger page
    /// with unreadable entries is a malformed store, not a shorter page.
    fn find_pending(&self, batch_size: usize) -> Result<Vec<MessageRecord>, RetrievalError> {
        let data = std::fs::read_to_string(&self.records_file)?;
        let mut out = Vec::new();
        for line in data.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if out.len() == batch_size {
                break;
            }
            out.push(serde_json::from_str::<MessageRecord>(line)?);
        }
        Ok(out)
    }
}
