//! Record store error types.
//!
//! Any of these aborts the operation that hit it. A failed persist never leaves a partially
//! written record file behind.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the record set.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("File I/O error on {}", path.display())]
    FileIo {
        /// The file being read or written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization of {} failed", path.display())]
    DeserializationFailed {
        /// The file that could not be parsed
        path: PathBuf,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the write.
    #[error("Write rejected: {reason}")]
    WriteRejected {
        /// Why the store rejected it
        reason: String,
    },
}

impl StoreError {
    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Check if this error is related to the JSON encoding of records.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. } | StoreError::DeserializationFailed { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
