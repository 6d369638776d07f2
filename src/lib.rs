//! Reply dispatch for ledger messages inside a cooperative workflow host.
//!
//! A party's node periodically runs a dispatch cycle: read one page of
//! message records from a durable store, keep the ones addressed to the
//! local party, and answer each of them through the host runtime's
//! async-operation mechanism. The crate provides:
//!
//! - Public data model: [`MessageRecord`], [`Party`], [`RecordId`],
//!   [`Confirmation`]
//! - The pure response builder in [`response`]
//! - Record-source providers (in-memory and filesystem) in [`providers`]
//! - The reply executor and invoker seam in [`runtime`]
//! - The dispatch coordinator and its scheduler adapter in [`dispatch`]
//!
//! The hard constraint everything here is built around: the dispatch cycle
//! runs on a single cooperatively scheduled fiber that may suspend only at
//! declared points. Submitting a reply never suspends; awaiting the batch
//! suspends exactly once, in
//! [`AsyncOperationScheduler::await_all`](dispatch::AsyncOperationScheduler::await_all).
//! All true parallelism happens on the executor's workers, never on the
//! calling fiber.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod dispatch;
pub mod error;
pub mod providers;
pub mod response;
pub mod runtime;

pub use dispatch::{
    AggregateOutcome, AsyncOperationScheduler, DispatchConfig, DispatchMode, ReplyDispatcher, ReplyHandle,
};
pub use error::{DispatchError, RetrievalError, SchedulingViolation};
pub use response::build_response;
pub use runtime::{FnReplyInvoker, ReplyExecutor, ReplyInvoker};

/// Identity of a message participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party(String);

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Party {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Party {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a [`MessageRecord`]. Immutable once minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Mint a fresh identifier.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One message on the ledger: who sent it, who it is addressed to, and
/// its text. Replying produces a *new* record via
/// [`response::build_response`]; the original is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: RecordId,
    pub sender: Party,
    pub recipient: Party,
    pub content: String,
}

impl MessageRecord {
    /// A record never names the same party on both ends.
    pub fn new(sender: Party, recipient: Party, content: impl Into<String>) -> Self {
        debug_assert_ne!(sender, recipient, "sender and recipient must differ");
        Self {
            id: RecordId::fresh(),
            sender,
            recipient,
            content: content.into(),
        }
    }
}

/// Completed result of one reply operation: which record was answered,
/// the response record as delivered, and the counterparty's opaque
/// signature over the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Identifier of the original record that was answered.
    pub record: RecordId,
    /// The response record as it went out.
    pub response: MessageRecord,
    /// Counterparty attestation; opaque to this crate.
    pub signature: String,
}
