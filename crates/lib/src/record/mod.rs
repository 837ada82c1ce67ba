//! User records and the record set
//!
//! A [`Snapshot`] is the unit the rest of the crate works with: stores load and persist whole
//! snapshots, and the membership engine maps one snapshot to the next.

pub mod errors;
pub mod snapshot;
pub mod types;

pub use errors::RecordError;
pub use snapshot::Snapshot;
pub use types::{Device, Track, UserRecord};
