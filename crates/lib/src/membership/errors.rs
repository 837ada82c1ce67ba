//! Error types for the membership engine
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MembershipError {
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Group name cannot be empty")]
    EmptyGroupName,

    #[error("Unknown group: {name}")]
    UnknownGroup { name: String },
}

impl MembershipError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MembershipError::UserNotFound { .. } | MembershipError::UnknownGroup { .. }
        )
    }

    /// Check if the request carried unusable input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MembershipError::EmptyGroupName)
    }
}

impl From<MembershipError> for crate::Error {
    fn from(err: MembershipError) -> Self {
        crate::Error::Membership(err)
    }
}
