//! Record-source providers.
//!
//! The dispatch coordinator sees the store only through [`RecordSource`]:
//! one paginated query, no cursor continuation, no replied marker. How
//! records are persisted, notarized, or consumed is the store's business.

use crate::error::RetrievalError;
use crate::MessageRecord;
use std::sync::Mutex;

pub mod fs;

/// Durable, queryable store of message records.
///
/// `find_pending` runs on the calling workflow's fiber and must not
/// suspend; implementations do synchronous I/O or none at all. The store
/// keeps no replied marker, so a record already answered may appear again
/// in a later cycle.
pub trait RecordSource: Send + Sync {
    /// Return up to `batch_size` records in insertion order. Records
    /// beyond the batch are left for a later cycle.
    fn find_pending(&self, batch_size: usize) -> Result<Vec<MessageRecord>, RetrievalError>;
}

/// In-memory record store for tests and embedding.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<MessageRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: MessageRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSource for InMemoryRecordStore {
    fn find_pending(&self, batch_size: usize) -> Result<Vec<MessageRecord>, RetrievalError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().take(batch_size).cloned().collect())
    }
}
