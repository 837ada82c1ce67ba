use std::{sync::Arc, time::Duration};

use yspotify::{
    Error,
    identity::{AccountLinker, IdentityError, IdentityProvider, SpotifyClient, SpotifyConfig},
};

use super::fake_spotify::{self, CLIENT_ID, CLIENT_SECRET};
use crate::helpers::*;

async fn client_with_timeout(timeout: Duration) -> SpotifyClient {
    let base = fake_spotify::spawn().await;
    SpotifyClient::new(SpotifyConfig {
        client_id: Some(CLIENT_ID.to_string()),
        client_secret: Some(CLIENT_SECRET.to_string()),
        redirect_uri: Some("http://localhost:3000/callback".to_string()),
        api_base: base.clone(),
        accounts_base: base,
        timeout,
        ..SpotifyConfig::default()
    })
    .unwrap()
}

async fn client() -> SpotifyClient {
    client_with_timeout(Duration::from_secs(5)).await
}

fn identity_error(err: Error) -> IdentityError {
    match err {
        Error::Identity(err) => err,
        other => panic!("expected identity error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_display_name() {
    let client = client().await;
    assert_eq!(
        client.fetch_display_name("good").await.unwrap(),
        "Alice Example"
    );
    // Falls back to the account id.
    assert_eq!(client.fetch_display_name("noname").await.unwrap(), "alice01");
}

#[tokio::test]
async fn test_active_device_is_selected() {
    let client = client().await;
    let device = client.fetch_active_device("good").await.unwrap();
    assert_eq!(device.name, "Laptop");
    assert!(device.is_active);
    assert_eq!(device.device_type, "Computer");
    assert_eq!(device.volume_percent, Some(65));

    let err = identity_error(client.fetch_active_device("idle").await.unwrap_err());
    assert!(matches!(err, IdentityError::NoActiveDevice));
}

#[tokio::test]
async fn test_current_track() {
    let client = client().await;
    let track = client.fetch_current_track("good").await.unwrap().unwrap();
    assert_eq!(track.title, "Harder, Better, Faster, Stronger");
    assert_eq!(track.artist, "Daft Punk, Kanye West");
    assert_eq!(track.album, "Discovery");

    assert_eq!(client.fetch_current_track("idle").await.unwrap(), None);
    assert_eq!(client.fetch_current_track("paused").await.unwrap(), None);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let client = client().await;
    let err = client.fetch_display_name("expired").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(client.fetch_active_device("expired").await.unwrap_err().is_unauthorized());
    assert!(client.fetch_current_track("expired").await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_server_errors_and_bad_bodies() {
    let client = client().await;

    let err = identity_error(client.fetch_display_name("broken").await.unwrap_err());
    assert!(matches!(
        err,
        IdentityError::UnexpectedStatus { status: 500, .. }
    ));

    let err = identity_error(client.fetch_display_name("garbage").await.unwrap_err());
    assert!(matches!(err, IdentityError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let client = client_with_timeout(Duration::from_millis(200)).await;
    let err = identity_error(client.fetch_display_name("slow").await.unwrap_err());
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_exchange_code() {
    let client = client().await;
    assert_eq!(
        client.exchange_code("abc").await.unwrap(),
        "access-for-abc"
    );

    let err = identity_error(client.exchange_code("bad-code").await.unwrap_err());
    assert!(matches!(
        err,
        IdentityError::UnexpectedStatus { status: 400, .. }
    ));
}

#[tokio::test]
async fn test_hub_sign_in_through_http_client() {
    let client = Arc::new(client().await);
    let hub = setup_hub_with_users(&["alice"]).await;
    let token = client.exchange_code("xyz").await.unwrap();
    assert_eq!(token, "access-for-xyz");

    // The stand-in only knows a few fixed tokens.
    hub.link_identity("alice", "good").await.unwrap();
    let result = hub.sign_in("alice", "pw", client.as_ref()).await.unwrap();

    assert!(!result.relink_required);
    let session = result.session;
    assert_eq!(session.spotify_username.as_deref(), Some("Alice Example"));
    assert_eq!(session.active_device.unwrap().name, "Laptop");
    assert_eq!(session.current_track.unwrap().artist, "Daft Punk, Kanye West");
}
