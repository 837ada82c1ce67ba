//! Record store abstraction
//!
//! A store reads and overwrites the whole record set. There are no partial updates and no
//! transactions; callers that mutate must serialize their read-compute-write cycles, which
//! [`crate::Hub`] does.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{Result, record::Snapshot};

pub mod errors;
pub mod file;
pub mod memory;

pub use errors::StoreError;
pub use file::JsonFileStore;
pub use memory::InMemoryStore;

/// Full-read/full-overwrite persistence for the record set.
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Read every record.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace every record with `snapshot`.
    async fn persist(&self, snapshot: &Snapshot) -> Result<()>;

    /// Short label for logs and health output, e.g. `json:users.json`.
    fn describe(&self) -> String;
}
