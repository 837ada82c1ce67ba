//! JSON file persistence
//!
//! The record file is a pretty-printed JSON array of user records, the same `users.json` format
//! earlier deployments of the service wrote.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{RecordStore, StoreError};
use crate::{Result, record::Snapshot};

/// A record store backed by one JSON file.
///
/// A missing or empty file reads as an empty record set. Writes go to a sibling temporary file
/// that is then renamed over the original, so readers see either the old or the new set.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) if json.trim().is_empty() => Ok(Snapshot::new()),
            Ok(json) => serde_json::from_str(&json).map_err(|source| {
                crate::Error::from(StoreError::DeserializationFailed {
                    path: self.path.clone(),
                    source,
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::new()),
            Err(source) => Err(StoreError::FileIo {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|source| StoreError::SerializationFailed { source })?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|source| StoreError::FileIo {
                path: temp.clone(),
                source,
            })?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|source| StoreError::FileIo {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            records = snapshot.len(),
            "Record file written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
