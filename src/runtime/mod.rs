//! Host-side execution of reply operations.
//!
//! The workflow fiber never runs a reply itself. It hands each one to a
//! [`ReplyExecutor`], the host runtime's async-operation mechanism (a
//! fixed-size pool of worker tasks), and gets back a completion signal per
//! operation. The executor is process-wide: started once, shared via
//! `Arc`, passed to the coordinator as a dependency, and shut down
//! explicitly. It is never recreated per dispatch cycle.

use crate::error::SchedulingViolation;
use crate::{Confirmation, MessageRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Opaque async unit of work that performs the reply handshake with the
/// remote party named by `response.recipient` and yields the
/// counterparty's confirmation.
#[async_trait]
pub trait ReplyInvoker: Send + Sync {
    async fn invoke(&self, response: MessageRecord, original: MessageRecord) -> Result<Confirmation, String>;
}

/// Function wrapper that implements `ReplyInvoker`.
pub struct FnReplyInvoker<F, Fut>(pub F)
where
    F: Fn(MessageRecord, MessageRecord) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<Confirmation, String>> + Send + 'static;

#[async_trait]
impl<F, Fut> ReplyInvoker for FnReplyInvoker<F, Fut>
where
    F: Fn(MessageRecord, MessageRecord) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<Confirmation, String>> + Send + 'static,
{
    async fn invoke(&self, response: MessageRecord, original: MessageRecord) -> Result<Confirmation, String> {
        (self.0)(response, original).await
    }
}

/// One queued reply operation and the channel its outcome travels back on.
pub(crate) struct ReplyJob {
    pub id: u64,
    pub response: MessageRecord,
    pub original: MessageRecord,
    pub done: oneshot::Sender<Result<Confirmation, String>>,
}

/// Fixed-size pool of worker tasks draining a shared job queue.
///
/// Enqueueing is synchronous and never suspends the submitting fiber;
/// invocation and any network I/O happen entirely on the workers.
pub struct ReplyExecutor {
    tx: mpsc::UnboundedSender<ReplyJob>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ReplyExecutor {
    pub const DEFAULT_WORKERS: usize = 8;

    /// Start the executor with the default worker count.
    pub fn start(invoker: Arc<dyn ReplyInvoker>) -> Arc<Self> {
        Self::start_with_workers(invoker, Self::DEFAULT_WORKERS)
    }

    /// Start the executor with an explicit worker count (at least one).
    pub fn start_with_workers(invoker: Arc<dyn ReplyInvoker>, workers: usize) -> Arc<Self> {
        // Install a default subscriber if none set (ok to call many times)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .try_init();

        let (tx, rx) = mpsc::unbounded_channel::<ReplyJob>();
        let rx = Arc::new(Mutex::new(rx));
        let mut joins = Vec::new();
        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let invoker = invoker.clone();
            joins.push(tokio::spawn(async move {
                loop {
                    let job = { rx.lock().await.recv().await };
                    let Some(ReplyJob { id, response, original, done }) = job else {
                        break;
                    };
                    debug!(worker, op = id, record = %original.id, "executing reply operation");
                    let outcome = invoker.invoke(response, original).await;
                    if done.send(outcome).is_err() {
                        // Receiver gone: a detached (fire-and-forget) operation.
                        debug!(worker, op = id, "reply outcome unobserved");
                    }
                }
            }));
        }
        Arc::new(Self {
            tx,
            workers: Mutex::new(joins),
        })
    }

    /// Enqueue one reply operation. Synchronous; fails only when the
    /// executor has been shut down.
    pub(crate) fn submit(&self, job: ReplyJob) -> Result<(), SchedulingViolation> {
        self.tx.send(job).map_err(|_| SchedulingViolation::ExecutorStopped)
    }

    /// Stop every worker and wait for them to finish unwinding. After this
    /// returns, submissions fail with `ExecutorStopped` and any in-flight
    /// operation is abandoned.
    pub async fn shutdown(self: Arc<Self>) {
        let mut workers = self.workers.lock().await;
        for j in workers.drain(..) {
            j.abort();
            // Await the aborted task so the queue receiver is observably
            // dropped before we return.
            let _ = j.await;
        }
    }
}
