//! In-memory record store
//!
//! Keeps the record set in process memory only. Useful for development servers and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::{Result, record::Snapshot};

/// A record store that lives in a `RwLock`. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.write().await = snapshot.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "inmemory".to_string()
    }
}
