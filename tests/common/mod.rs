#![allow(dead_code)]

use async_trait::async_trait;
use mailroom::{Confirmation, MessageRecord, ReplyInvoker};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn record(sender: &str, recipient: &str, content: &str) -> MessageRecord {
    MessageRecord::new(sender.into(), recipient.into(), content)
}

/// Scriptable reply invoker: a base latency, per-content latency
/// overrides, and contents whose replies fail. Counts invocations that
/// ran to an outcome.
pub struct StubInvoker {
    latency: Duration,
    latency_by_content: HashMap<String, Duration>,
    fail_on: HashSet<String>,
    completed: AtomicUsize,
}

impl StubInvoker {
    pub fn instant() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            latency_by_content: HashMap::new(),
            fail_on: HashSet::new(),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn latency_for(mut self, content: &str, latency: Duration) -> Self {
        self.latency_by_content.insert(content.to_string(), latency);
        self
    }

    pub fn fail_on(mut self, content: &str) -> Self {
        self.fail_on.insert(content.to_string());
        self
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyInvoker for StubInvoker {
    async fn invoke(&self, response: MessageRecord, original: MessageRecord) -> Result<Confirmation, String> {
        let latency = self
            .latency_by_content
            .get(&original.content)
            .copied()
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&original.content) {
            return Err(format!("remote party rejected reply to {}", original.id));
        }
        Ok(Confirmation {
            record: original.id,
            signature: format!("countersigned:{}", response.id),
            response,
        })
    }
}

/// Poll `cond` until it holds or `timeout_ms` elapses.
pub async fn wait_until(mut cond: impl FnMut() -> bool, timeout_ms: u64) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_millis(timeout_ms);
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
