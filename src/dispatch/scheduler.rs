//! The narrow seam between the dispatch coordinator and the host
//! executor: submit units of work, then gather every outcome through one
//! suspension point.

use crate::error::{DispatchError, SchedulingViolation};
use crate::runtime::{ReplyExecutor, ReplyJob};
use crate::{Confirmation, MessageRecord, RecordId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Correlates one submitted reply operation with its eventual outcome.
///
/// Dropping a handle detaches the operation: it still runs on the
/// executor, but its outcome becomes unobservable.
pub struct ReplyHandle {
    id: u64,
    record: RecordId,
    rx: oneshot::Receiver<Result<Confirmation, String>>,
}

impl ReplyHandle {
    /// Correlation id assigned at submission.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Identifier of the record this reply answers.
    pub fn record(&self) -> RecordId {
        self.record
    }
}

/// Checkpoint-safe scheduling of reply operations.
///
/// Exactly two operations are exposed to the coordinator. `submit` never
/// suspends and never spawns anything on the calling fiber; `await_all`
/// is the single suspension point of a dispatch cycle. Completion is
/// signalled, never polled: each handle resolves through its `oneshot`
/// channel, so no counter is ever busy-waited on.
pub struct AsyncOperationScheduler {
    executor: Arc<ReplyExecutor>,
    deadline: Option<Duration>,
    next_op_id: AtomicU64,
}

impl AsyncOperationScheduler {
    pub fn new(executor: Arc<ReplyExecutor>) -> Self {
        Self {
            executor,
            deadline: None,
            next_op_id: AtomicU64::new(1),
        }
    }

    /// Bound every `await_all` call by `deadline`. A reply still pending
    /// when it passes fails the aggregate with `DeadlineExceeded`; the
    /// underlying operation keeps running on the executor.
    pub fn with_deadline(executor: Arc<ReplyExecutor>, deadline: Duration) -> Self {
        Self {
            executor,
            deadline: Some(deadline),
            next_op_id: AtomicU64::new(1),
        }
    }

    /// Register one reply operation with the executor and return its
    /// handle. Synchronous: the calling fiber is never suspended here.
    pub fn submit(
        &self,
        response: MessageRecord,
        original: MessageRecord,
    ) -> Result<ReplyHandle, SchedulingViolation> {
        let id = self.next_op_id.fetch_add(1, Ordering::Relaxed);
        let record = original.id;
        let (done, rx) = oneshot::channel();
        self.executor.submit(ReplyJob {
            id,
            response,
            original,
            done,
        })?;
        debug!(op = id, record = %record, "reply operation submitted");
        Ok(ReplyHandle { id, record, rx })
    }

    /// Gather every outcome, suspending the calling fiber exactly once.
    ///
    /// Outcomes come back in submission order regardless of completion
    /// order. All submitted operations run concurrently on the executor,
    /// so the wall-clock cost approaches the slowest single reply, not
    /// the sum. Fail-fast: the first failure aborts the aggregate;
    /// handles after it are abandoned (their operations still run to
    /// completion, unobserved).
    pub async fn await_all(&self, handles: Vec<ReplyHandle>) -> Result<Vec<Confirmation>, DispatchError> {
        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);
        let mut confirmations = Vec::with_capacity(handles.len());
        for handle in handles {
            let ReplyHandle { id, record, rx } = handle;
            let outcome = match deadline {
                Some(at) => match tokio::time::timeout_at(at, rx).await {
                    Ok(received) => received,
                    Err(_elapsed) => return Err(DispatchError::DeadlineExceeded { record }),
                },
                None => rx.await,
            };
            match outcome {
                Ok(Ok(confirmation)) => confirmations.push(confirmation),
                Ok(Err(reason)) => return Err(DispatchError::ReplyFailed { record, reason }),
                Err(_dropped) => return Err(SchedulingViolation::OperationAbandoned(id).into()),
            }
        }
        Ok(confirmations)
    }
}
