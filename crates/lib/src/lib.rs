//!
//! YSpotify: listening groups for students.
//! This library provides the membership and leadership engine plus the collaborators around it.
//!
//! ## Core Concepts
//!
//! * **Records (`record::UserRecord`)**: One per registered person, holding credentials, the linked
//!   Spotify token, the last-known listening state and the (at most one) group membership.
//! * **Snapshots (`record::Snapshot`)**: The whole record set, read and written wholesale.
//! * **Membership engine (`membership`)**: Pure functions that turn a snapshot plus an event
//!   (join, unlink) into the next snapshot while keeping exactly one leader per non-empty group.
//! * **Stores (`store::RecordStore`)**: Full-read/full-overwrite persistence of snapshots.
//! * **Identity adapter (`identity`)**: Fetches display name, active device and current track
//!   from Spotify, and links accounts through OAuth.
//! * **Hub (`hub::Hub`)**: Serializes every read-compute-write cycle behind one writer lock and
//!   exposes the request-level operations.

pub mod account;
pub mod hub;
pub mod identity;
pub mod membership;
pub mod record;
pub mod session;
pub mod store;

pub use hub::{Hub, SignIn};
pub use membership::{GroupCatalog, LeaderSelector, RandomSelector, SeededSelector};
pub use record::{Device, Snapshot, Track, UserRecord};
pub use session::SessionUser;

/// Result type used throughout the YSpotify library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the YSpotify library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured account errors from the account module
    #[error(transparent)]
    Account(account::AccountError),

    /// Structured identity adapter errors from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),

    /// Structured membership errors from the membership module
    #[error(transparent)]
    Membership(membership::MembershipError),

    /// Structured record invariant errors from the record module
    #[error(transparent)]
    Record(record::RecordError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Account(_) => "account",
            Error::Identity(_) => "identity",
            Error::Membership(_) => "membership",
            Error::Record(_) => "record",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Membership(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Account(account::AccountError::UsernameTaken { .. }))
    }

    /// Check if the request itself was malformed (missing or invalid input).
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Account(err) => err.is_invalid_input(),
            Error::Membership(err) => err.is_invalid_input(),
            _ => false,
        }
    }

    /// Check if the credentials presented by the caller were rejected.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Error::Account(account::AccountError::InvalidCredentials))
    }

    /// Check if the identity provider rejected the linked token.
    ///
    /// Callers react to this by sending the user through the link flow again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Identity(err) if err.is_unauthorized())
    }

    /// Check if this error came from reading or writing the record store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error indicates the record set violates a membership invariant.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Error::Record(_))
    }
}
