//! Core data types for user records
//!
//! Field names follow the `users.json` file shared with earlier deployments of the service, so
//! existing record files load unchanged.

use serde::{Deserialize, Deserializer, Serialize};

/// One registered person.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique username (login identifier), immutable after creation
    pub username: String,

    /// Password digest, opaque to the membership engine
    #[serde(rename = "password")]
    pub password_hash: String,

    /// Spotify access token; presence means the account link is active
    #[serde(rename = "spotifyAccountToken", default)]
    pub spotify_token: Option<String>,

    /// The group this user belongs to, stored as a zero- or one-element array
    #[serde(default, with = "single_group")]
    pub group: Option<String>,

    /// Leader flag, only meaningful while `group` is set
    #[serde(rename = "isLeader", default)]
    pub is_leader: bool,

    /// Last-known Spotify display name
    #[serde(rename = "spotifyUsername", default)]
    pub spotify_username: Option<String>,

    /// Last-known active playback device
    #[serde(rename = "activeDevice", default)]
    pub active_device: Option<Device>,

    /// Last-known track, `null` when nothing was playing
    #[serde(
        rename = "currentTrack",
        default,
        deserialize_with = "deserialize_track"
    )]
    pub current_track: Option<Track>,
}

impl UserRecord {
    /// Create a fresh record as written at signup: no group, not leader, no identity link.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            spotify_token: None,
            group: None,
            is_leader: false,
            spotify_username: None,
            active_device: None,
            current_track: None,
        }
    }

    /// Whether the Spotify account link is active.
    pub fn is_linked(&self) -> bool {
        self.spotify_token.is_some()
    }

    /// Whether this user belongs to `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }

    /// Whether this user leads `group`.
    pub fn leads(&self, group: &str) -> bool {
        self.is_leader && self.in_group(group)
    }
}

/// A Spotify playback device, as returned by the devices endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_private_session: bool,
    #[serde(default)]
    pub is_restricted: bool,
    pub name: String,
    #[serde(default)]
    pub supports_volume: bool,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// A track that was playing when the identity adapter last looked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Artist names joined with `", "`
    pub artist: String,
    pub album: String,
}

/// Older record files stored `[]` or `{ "message": ... }` when nothing was playing.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTrack {
    Track(Track),
    Other(serde::de::IgnoredAny),
}

fn deserialize_track<'de, D>(deserializer: D) -> Result<Option<Track>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StoredTrack>::deserialize(deserializer)? {
        Some(StoredTrack::Track(track)) => Some(track),
        Some(StoredTrack::Other(_)) | None => None,
    })
}

/// Serde adapter between `Option<String>` and the `group` array of the record file.
pub(crate) mod single_group {
    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

    use crate::record::RecordError;

    pub fn serialize<S>(group: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(group.iter().len()))?;
        for name in group {
            seq.serialize_element(name)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut groups = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        match groups.len() {
            0 => Ok(None),
            1 => Ok(groups.pop()),
            count => Err(serde::de::Error::custom(RecordError::TooManyGroups {
                count,
            })),
        }
    }
}
