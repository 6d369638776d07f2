//! The dispatch coordinator: one cycle of reply-to-everything-pending.
//!
//! A cycle retrieves one page of records, filters to the local party,
//! builds a response per record, submits every reply through the
//! scheduler adapter, and then either gathers the outcomes in submission
//! order or walks away. Retrieval, filtering, and response building run
//! synchronously on the workflow fiber; the only suspension point is
//! [`AsyncOperationScheduler::await_all`].

use crate::error::DispatchError;
use crate::providers::RecordSource;
use crate::response::build_response;
use crate::{Confirmation, MessageRecord, Party, RetrievalError};
use std::sync::Arc;
use tracing::{debug, info};

pub mod scheduler;
pub use scheduler::{AsyncOperationScheduler, ReplyHandle};

/// Page size of a dispatch cycle when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// How a cycle treats the outcomes of the replies it submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Wait for every reply and return confirmations in submission order.
    /// Fail-fast on the first failed reply.
    #[default]
    AwaitAll,
    /// Submit every reply and return immediately. Completion and failure
    /// of individual replies are unobservable to the caller.
    FireAndForget,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Single-page retrieval size. Records beyond it are not processed in
    /// this cycle; there is no implicit continuation.
    pub batch_size: usize,
    pub mode: DispatchMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            mode: DispatchMode::AwaitAll,
        }
    }
}

/// Result of one dispatch cycle.
#[derive(Debug)]
pub enum AggregateOutcome {
    /// Every reply completed; confirmations are in submission order.
    Completed(Vec<Confirmation>),
    /// Replies were submitted detached; nothing further is observable.
    Detached { submitted: usize },
}

/// Coordinates one party's reply dispatch.
///
/// Holds no outcome state across invocations: in-flight outcomes live
/// only for the duration of one `reply_to_all_pending` call, and a crash
/// mid-dispatch loses their tracking. The coordinator does not mark
/// records as replied, so concurrent or repeated cycles may answer the
/// same record again.
pub struct ReplyDispatcher {
    source: Arc<dyn RecordSource>,
    scheduler: AsyncOperationScheduler,
    identity: Party,
    config: DispatchConfig,
}

impl ReplyDispatcher {
    pub fn new(source: Arc<dyn RecordSource>, scheduler: AsyncOperationScheduler, identity: Party) -> Self {
        Self::with_config(source, scheduler, identity, DispatchConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn RecordSource>,
        scheduler: AsyncOperationScheduler,
        identity: Party,
        config: DispatchConfig,
    ) -> Self {
        Self {
            source,
            scheduler,
            identity,
            config,
        }
    }

    /// Reply to every pending record addressed to the local party.
    ///
    /// Under `AwaitAll` the returned confirmations are ordered like the
    /// filtered record sequence, and the first failed reply aborts the
    /// call with its error. Under `FireAndForget` the call returns as
    /// soon as every reply is enqueued.
    pub async fn reply_to_all_pending(&self) -> Result<AggregateOutcome, DispatchError> {
        let inbound = self.pending_for_us()?;
        info!(party = %self.identity, count = inbound.len(), "dispatching replies");

        let mut handles = Vec::with_capacity(inbound.len());
        for record in inbound {
            let response = build_response(&record);
            debug!(record = %record.id, sender = %record.sender, "submitting reply");
            handles.push(self.scheduler.submit(response, record)?);
        }

        match self.config.mode {
            DispatchMode::AwaitAll => {
                let confirmations = self.scheduler.await_all(handles).await?;
                Ok(AggregateOutcome::Completed(confirmations))
            }
            DispatchMode::FireAndForget => {
                let submitted = handles.len();
                // Dropping the handles detaches the operations.
                drop(handles);
                Ok(AggregateOutcome::Detached { submitted })
            }
        }
    }

    /// One page of records, filtered to those addressed to us. Runs on
    /// the calling fiber and must not suspend.
    fn pending_for_us(&self) -> Result<Vec<MessageRecord>, RetrievalError> {
        let page = self.source.find_pending(self.config.batch_size)?;
        Ok(page
            .into_iter()
            .filter(|record| record.recipient == self.identity)
            .collect())
    }
}
