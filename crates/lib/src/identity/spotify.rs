//! Spotify Web API client
//!
//! Implements [`IdentityProvider`] against the profile, devices and currently-playing endpoints,
//! and [`AccountLinker`] against the accounts service. Every request carries the configured
//! timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use super::{AccountLinker, IdentityError, IdentityProvider};
use crate::{
    Result,
    record::{Device, Track},
};

const PROFILE_ENDPOINT: &str = "/v1/me";
const DEVICES_ENDPOINT: &str = "/v1/me/player/devices";
const PLAYING_ENDPOINT: &str = "/v1/me/player/currently-playing";
const AUTHORIZE_ENDPOINT: &str = "/authorize";
const TOKEN_ENDPOINT: &str = "/api/token";

/// OAuth scopes requested when linking an account.
pub const DEFAULT_SCOPES: [&str; 8] = [
    "user-read-private",
    "user-read-email",
    "user-read-playback-state",
    "user-read-currently-playing",
    "playlist-modify-public",
    "playlist-modify-private",
    "playlist-read-private",
    "user-library-read",
];

/// Connection settings for [`SpotifyClient`].
#[derive(Clone, Debug)]
pub struct SpotifyConfig {
    /// OAuth client id; linking is disabled without it
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Where Spotify sends the browser back to after authorization
    pub redirect_uri: Option<String>,
    /// Base URL of the Web API
    pub api_base: String,
    /// Base URL of the accounts service
    pub accounts_base: String,
    pub scopes: Vec<String>,
    /// Upper bound for each HTTP call
    pub timeout: Duration,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_base: "https://api.spotify.com".to_string(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// HTTP client for the Spotify Web API and accounts service.
#[derive(Clone, Debug)]
pub struct SpotifyClient {
    config: SpotifyConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct Profile {
    id: String,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct DeviceList {
    devices: Vec<Device>,
}

#[derive(Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    is_playing: bool,
    item: Option<PlayingItem>,
}

#[derive(Deserialize)]
struct PlayingItem {
    name: String,
    #[serde(default)]
    artists: Vec<Named>,
    album: Option<Named>,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Request {
                endpoint: "client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Whether the OAuth link flow can run with this configuration.
    pub fn can_link(&self) -> bool {
        self.config.client_id.is_some()
            && self.config.client_secret.is_some()
            && self.config.redirect_uri.is_some()
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.api_base.trim_end_matches('/'))
    }

    fn accounts_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.accounts_base.trim_end_matches('/'))
    }

    /// Authenticated GET against the Web API, with 401 mapped to `Unauthorized`.
    async fn get(&self, endpoint: &str, token: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(self.api_url(endpoint))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::from_reqwest(endpoint, e, self.config.timeout))?;
        check_status(endpoint, response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| IdentityError::from_reqwest(endpoint, e, self.config.timeout).into())
    }
}

fn check_status(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(IdentityError::Unauthorized {
            endpoint: endpoint.to_string(),
        }
        .into()),
        status if !status.is_success() => Err(IdentityError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        }
        .into()),
        _ => Ok(response),
    }
}

#[async_trait]
impl IdentityProvider for SpotifyClient {
    async fn fetch_display_name(&self, token: &str) -> Result<String> {
        let response = self.get(PROFILE_ENDPOINT, token).await?;
        let profile: Profile = self.decode(PROFILE_ENDPOINT, response).await?;
        Ok(profile.display_name.unwrap_or(profile.id))
    }

    async fn fetch_active_device(&self, token: &str) -> Result<Device> {
        let response = self.get(DEVICES_ENDPOINT, token).await?;
        let list: DeviceList = self.decode(DEVICES_ENDPOINT, response).await?;
        list.devices
            .into_iter()
            .find(|d| d.is_active)
            .ok_or_else(|| IdentityError::NoActiveDevice.into())
    }

    async fn fetch_current_track(&self, token: &str) -> Result<Option<Track>> {
        let response = self.get(PLAYING_ENDPOINT, token).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let playing: CurrentlyPlaying = self.decode(PLAYING_ENDPOINT, response).await?;
        if !playing.is_playing {
            return Ok(None);
        }
        Ok(playing.item.map(|item| Track {
            title: item.name,
            artist: item
                .artists
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
                .join(", "),
            album: item.album.map(|a| a.name).unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl AccountLinker for SpotifyClient {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let (Some(client_id), Some(redirect_uri)) = (
            self.config.client_id.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) else {
            return Err(IdentityError::NotConfigured.into());
        };
        let scope = self.config.scopes.join(" ");

        let url = Url::parse_with_params(
            &self.accounts_url(AUTHORIZE_ENDPOINT),
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("scope", scope.as_str()),
                ("redirect_uri", redirect_uri),
                ("state", state),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| IdentityError::InvalidResponse {
            endpoint: AUTHORIZE_ENDPOINT.to_string(),
            reason: format!("invalid accounts base URL: {e}"),
        })?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) else {
            return Err(IdentityError::NotConfigured.into());
        };

        let response = self
            .http
            .post(self.accounts_url(TOKEN_ENDPOINT))
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::from_reqwest(TOKEN_ENDPOINT, e, self.config.timeout))?;
        let response = check_status(TOKEN_ENDPOINT, response)?;
        let token: TokenResponse = self.decode(TOKEN_ENDPOINT, response).await?;
        Ok(token.access_token)
    }
}
