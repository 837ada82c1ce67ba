use std::sync::Arc;

use tempfile::TempDir;
use yspotify::store::JsonFileStore;

use crate::helpers::*;

#[tokio::test]
async fn test_signup_creates_blank_record() {
    let hub = setup_hub();
    let session = hub.signup("alice", "secret").await.unwrap();

    assert_eq!(session.username, "alice");
    assert!(!session.spotify_linked);
    assert!(!session.leader);
    assert!(!session.has_group());
    assert_eq!(session.spotify_username, None);

    let snapshot = hub.snapshot().await.unwrap();
    let record = snapshot.get("alice").unwrap();
    assert_ne!(record.password_hash, "secret");
    assert!(record.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let hub = setup_hub_with_users(&["alice"]).await;
    let err = hub.signup("alice", "another").await.unwrap_err();
    assert!(err.is_conflict());

    // The original password still works.
    hub.authenticate("alice", "pw").await.unwrap();
}

#[tokio::test]
async fn test_authenticate_rejects_wrong_password_and_unknown_user() {
    let hub = setup_hub_with_users(&["alice"]).await;
    assert!(
        hub.authenticate("alice", "wrong")
            .await
            .unwrap_err()
            .is_invalid_credentials()
    );
    assert!(
        hub.authenticate("nobody", "pw")
            .await
            .unwrap_err()
            .is_invalid_credentials()
    );
    assert!(hub.authenticate("", "pw").await.unwrap_err().is_invalid_input());
}

#[tokio::test]
async fn test_legacy_password_digest_signs_in() {
    let mut alice = user("alice");
    alice.password_hash =
        "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8".to_string();
    let hub = setup_hub_with_records(vec![alice]);

    let record = hub.authenticate("alice", "password").await.unwrap();
    assert_eq!(record.username, "alice");
}

#[tokio::test]
async fn test_link_identity_stores_token() {
    let hub = setup_hub_with_users(&["alice"]).await;
    let session = hub.link_identity("alice", "BQD-token").await.unwrap();
    assert!(session.spotify_linked);

    let snapshot = hub.snapshot().await.unwrap();
    assert_eq!(
        snapshot.get("alice").unwrap().spotify_token.as_deref(),
        Some("BQD-token")
    );
    assert!(hub.link_identity("ghost", "t").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_state_survives_restart_with_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    {
        let hub = setup_hub_with_store(Arc::new(JsonFileStore::new(&path)));
        hub.signup("alice", "pw").await.unwrap();
        hub.signup("bob", "pw").await.unwrap();
        hub.join_group("alice", "Groupe B").await.unwrap();
        hub.join_group("bob", "Groupe B").await.unwrap();
    }

    let hub = setup_hub_with_store(Arc::new(JsonFileStore::new(&path)));
    let alice = hub.session_for("alice").await.unwrap();
    assert!(alice.leader);
    assert_eq!(alice.group.as_deref(), Some("Groupe B"));
    hub.authenticate("bob", "pw").await.unwrap();
    assert_leadership_invariants(&hub.snapshot().await.unwrap());
}
