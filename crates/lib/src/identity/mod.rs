//! Identity sync adapter
//!
//! The membership engine stores what Spotify reports about a user but never interprets it. This
//! module defines the capabilities it consumes ([`IdentityProvider`]), the OAuth link flow
//! ([`AccountLinker`]) and an HTTP implementation of both ([`SpotifyClient`]).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Result,
    record::{Device, Track},
};

pub mod errors;
pub mod spotify;

pub use errors::IdentityError;
pub use spotify::{SpotifyClient, SpotifyConfig};

/// Read access to a user's Spotify state, given their access token.
///
/// Implementations bound every call in time and report a rejected token as
/// [`IdentityError::Unauthorized`].
#[async_trait]
pub trait IdentityProvider: Send + Sync + Debug {
    /// The user's display name.
    async fn fetch_display_name(&self, token: &str) -> Result<String>;

    /// The device currently marked active, or [`IdentityError::NoActiveDevice`].
    async fn fetch_active_device(&self, token: &str) -> Result<Device>;

    /// The track being played right now, `None` when playback is stopped.
    async fn fetch_current_track(&self, token: &str) -> Result<Option<Track>>;
}

/// The OAuth authorization-code flow that produces an access token.
#[async_trait]
pub trait AccountLinker: Send + Sync + Debug {
    /// URL to send the browser to. `state` comes back unchanged on the callback.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Trade the callback `code` for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String>;
}
