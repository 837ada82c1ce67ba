//! Session projection
//!
//! The slice of a [`UserRecord`] that request handlers keep in a web session. It mirrors the
//! engine's decisions and never recomputes them.

use serde::{Deserialize, Serialize};

use crate::record::{Device, Track, UserRecord, types::single_group};

/// Caller-facing summary of a user record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
    /// Whether a Spotify token is stored
    pub spotify_linked: bool,
    pub leader: bool,
    pub spotify_username: Option<String>,
    pub active_device: Option<Device>,
    pub current_track: Option<Track>,
    #[serde(default, with = "single_group")]
    pub group: Option<String>,
}

impl SessionUser {
    /// Whether the user currently belongs to a group.
    pub fn has_group(&self) -> bool {
        self.group.is_some()
    }
}

impl From<&UserRecord> for SessionUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            spotify_linked: record.is_linked(),
            leader: record.is_leader,
            spotify_username: record.spotify_username.clone(),
            active_device: record.active_device.clone(),
            current_track: record.current_track.clone(),
            group: record.group.clone(),
        }
    }
}
