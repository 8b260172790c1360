//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AiAgent, DirectorySnapshot, DomainError};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Time source. Injected so expiry and join timestamps are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Snapshot port. Load and persist the whole directory dataset.
#[async_trait::async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Load the stored snapshot. `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<DirectorySnapshot>, DomainError>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &DirectorySnapshot) -> Result<(), DomainError>;
}

/// Assistant port. Produces the agent's reply to a student prompt.
#[async_trait::async_trait]
pub trait AssistantPort: Send + Sync {
    async fn respond(&self, agent: &AiAgent, prompt: &str) -> Result<String, DomainError>;
}
