//! Error types for the identity adapter
//!
//! Every failure of a Spotify call ends up as one of these. Only [`IdentityError::Unauthorized`]
//! changes what the caller does next (send the user through the link flow again); the rest are
//! logged and tolerated.

use std::time::Duration;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Spotify rejected the token.
    #[error("Spotify rejected the access token at {endpoint}")]
    Unauthorized { endpoint: String },

    /// The account has no active playback device.
    #[error("No active playback device")]
    NoActiveDevice,

    /// The call did not finish in time.
    #[error("Spotify call to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    /// Spotify answered with an unexpected HTTP status.
    #[error("Spotify returned HTTP {status} for {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// The request could not be sent or the connection failed.
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    /// The response body did not have the expected shape.
    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// OAuth client credentials are missing from the configuration.
    #[error("Spotify client credentials are not configured")]
    NotConfigured,
}

impl IdentityError {
    /// Check if the token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, IdentityError::Unauthorized { .. })
    }

    /// Check if the call ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, IdentityError::Timeout { .. })
    }

    /// Map a reqwest failure for `endpoint` into an identity error.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            IdentityError::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            }
        } else if err.is_decode() {
            IdentityError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        } else {
            IdentityError::Request {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
