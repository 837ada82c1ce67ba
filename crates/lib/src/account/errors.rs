//! Error types for accounts
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Username already exists: {username}")]
    UsernameTaken { username: String },

    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },
}

impl AccountError {
    /// Check if the request carried unusable input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AccountError::MissingCredentials)
    }
}

impl From<AccountError> for crate::Error {
    fn from(err: AccountError) -> Self {
        crate::Error::Account(err)
    }
}
