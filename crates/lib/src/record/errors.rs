//! Error types for record invariants
//!
//! These are raised when a snapshot breaks one of the membership rules. A write is refused when the
//! mutation introduced the violation; violations already present in the loaded file are carried.

use thiserror::Error;

/// Violations of the record-set invariants.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecordError {
    /// Two records share a username.
    #[error("Duplicate username in record set: {username}")]
    DuplicateUsername {
        /// The repeated username
        username: String,
    },

    /// A record is flagged as leader without belonging to any group.
    #[error("User '{username}' is marked leader but belongs to no group")]
    LeaderWithoutGroup {
        /// The offending user
        username: String,
    },

    /// More than one member of a group is flagged as leader.
    #[error("Group '{group}' has {} leaders: {leaders:?}", .leaders.len())]
    MultipleLeaders {
        /// The group with conflicting leaders
        group: String,
        /// Usernames of every member flagged as leader
        leaders: Vec<String>,
    },

    /// A stored record lists more than one group.
    #[error("User record lists {count} groups; at most one is allowed")]
    TooManyGroups {
        /// Number of groups found in the stored array
        count: usize,
    },
}

impl RecordError {
    /// Get the group involved in this violation, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            RecordError::MultipleLeaders { group, .. } => Some(group),
            _ => None,
        }
    }
}

impl From<RecordError> for crate::Error {
    fn from(err: RecordError) -> Self {
        crate::Error::Record(err)
    }
}
