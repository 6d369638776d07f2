use crate::RecordId;
use thiserror::Error;

/// The record-source query failed. Not retried by this crate; surfaced to
/// the caller of the dispatch cycle as-is.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The store could not be reached or read.
    #[error("record store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    /// A stored record could not be decoded.
    #[error("malformed record in store: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The scheduling contract between the dispatch coordinator and the host
/// executor was broken. This is a lifecycle or programming defect, not a
/// transient condition; nothing here is retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulingViolation {
    /// Work was submitted to an executor that is not running.
    #[error("reply executor is not accepting work")]
    ExecutorStopped,
    /// The executor dropped a reply operation without producing an outcome.
    #[error("reply operation {0} abandoned before completion")]
    OperationAbandoned(u64),
}

/// Failure of one `reply_to_all_pending` cycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    /// An individual reply operation failed. Under the fail-fast policy
    /// this aborts the whole aggregate; replies submitted after `record`
    /// still run to completion but their outcomes are discarded.
    #[error("reply to record {record} failed: {reason}")]
    ReplyFailed { record: RecordId, reason: String },
    /// A reply was still pending when the aggregate deadline passed. The
    /// underlying operation is not cancelled.
    #[error("reply to record {record} missed the dispatch deadline")]
    DeadlineExceeded { record: RecordId },
    #[error(transparent)]
    Scheduling(#[from] SchedulingViolation),
}
