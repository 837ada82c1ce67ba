use std::fs;

use tempfile::TempDir;
use yspotify::{
    Error, Snapshot,
    store::{JsonFileStore, RecordStore, StoreError},
};

use crate::helpers::*;

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("users.json"))
}

#[tokio::test]
async fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut alice = linked(member("alice", "Groupe A", true), "tok");
    alice.active_device = Some(device("Phone"));
    alice.current_track = Some(track("Intro"));
    let snapshot = Snapshot::from(vec![alice, member("bob", "Groupe A", false), user("carol")]);

    store.persist(&snapshot).await.unwrap();
    assert!(store.path().exists());

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, snapshot);

    // A fresh handle on the same path sees the same records.
    let reopened = JsonFileStore::new(store.path());
    assert_eq!(reopened.load().await.unwrap(), snapshot);
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_empty_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "  \n").unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "{ not json").unwrap();

    let err = store.load().await.unwrap_err();
    assert!(err.is_store_error());
    assert!(matches!(
        err,
        Error::Store(StoreError::DeserializationFailed { .. })
    ));
}

#[tokio::test]
async fn test_persist_overwrites_everything() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .persist(&Snapshot::from(vec![user("alice"), user("bob")]))
        .await
        .unwrap();
    store
        .persist(&Snapshot::from(vec![user("carol")]))
        .await
        .unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains("carol"));

    // No temporary file is left next to the record file.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("users.json")]);
}

#[tokio::test]
async fn test_persist_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("missing").join("users.json"));

    let err = store.persist(&Snapshot::new()).await.unwrap_err();
    match err {
        Error::Store(err) => assert!(err.is_io_error()),
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_legacy_record_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let legacy = r#"[
      {
        "username": "alice",
        "password": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
        "spotifyAccountToken": "BQD-token",
        "group": ["Groupe A"],
        "isLeader": true,
        "spotifyUsername": "Alice",
        "activeDevice": {
          "id": "abc",
          "is_active": true,
          "is_private_session": false,
          "is_restricted": false,
          "name": "Alice's MacBook",
          "supports_volume": true,
          "type": "Computer",
          "volume_percent": 80
        },
        "currentTrack": { "message": "Aucune musique en cours de lecture" }
      },
      {
        "username": "bob",
        "password": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
        "spotifyAccountToken": null,
        "group": [],
        "isLeader": false,
        "spotifyUsername": null,
        "activeDevice": null,
        "currentTrack": []
      },
      {
        "username": "carol",
        "password": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
      }
    ]"#;
    fs::write(store.path(), legacy).unwrap();

    let snapshot = store.load().await.unwrap();
    assert_eq!(snapshot.len(), 3);
    snapshot.validate().unwrap();

    let alice = snapshot.get("alice").unwrap();
    assert!(alice.leads("Groupe A"));
    assert!(alice.is_linked());
    assert_eq!(alice.active_device.as_ref().unwrap().volume_percent, Some(80));
    assert_eq!(alice.current_track, None);

    let bob = snapshot.get("bob").unwrap();
    assert_eq!(bob.group, None);
    assert_eq!(bob.current_track, None);

    let carol = snapshot.get("carol").unwrap();
    assert!(!carol.is_linked());
    assert!(!carol.is_leader);

    // Legacy SHA-256 passwords still verify.
    yspotify::account::verify_password("password", &alice.password_hash).unwrap();
}

#[tokio::test]
async fn test_group_is_written_as_array() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .persist(&Snapshot::from(vec![
            member("alice", "Groupe B", true),
            user("bob"),
        ]))
        .await
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw[0]["group"], serde_json::json!(["Groupe B"]));
    assert_eq!(raw[0]["isLeader"], serde_json::json!(true));
    assert_eq!(raw[1]["group"], serde_json::json!([]));
    assert!(raw[1]["spotifyAccountToken"].is_null());
}
