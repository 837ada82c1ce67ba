use std::sync::Arc;

use yspotify::{Snapshot, store::InMemoryStore};

use crate::helpers::*;

#[tokio::test]
async fn test_failed_persist_reports_store_error() {
    let snapshot = Snapshot::from(vec![member("alice", "Groupe A", true), user("bob")]);
    let hub = setup_hub_with_store(Arc::new(ReadOnlyStore::with_snapshot(snapshot.clone())));

    let err = hub.join_group("bob", "Groupe A").await.unwrap_err();
    assert!(err.is_store_error());
    let err = hub.signup("carol", "pw").await.unwrap_err();
    assert!(err.is_store_error());

    assert_eq!(hub.snapshot().await.unwrap(), snapshot);
}

#[tokio::test]
async fn test_no_op_join_does_not_write() {
    // A read-only store only fails when something is written.
    let snapshot = Snapshot::from(vec![member("alice", "Groupe A", true)]);
    let hub = setup_hub_with_store(Arc::new(ReadOnlyStore::with_snapshot(snapshot)));

    let session = hub.join_group("alice", "Groupe A").await.unwrap();
    assert!(session.leader);
}

#[tokio::test]
async fn test_inherited_double_leaders_do_not_block_other_writes() {
    // Older deployments left both the old and the promoted leader flagged.
    let records = vec![
        member("alice", "Groupe A", true),
        member("carol", "Groupe A", true),
        member("bob", "Groupe B", true),
        user("dave"),
    ];
    let hub = setup_hub_with_records(records);

    hub.signup("erin", "pw").await.unwrap();
    let session = hub.join_group("dave", "Groupe C").await.unwrap();
    assert!(session.leader);

    // Joining the affected group adds no third leader.
    let session = hub.join_group("erin", "Groupe A").await.unwrap();
    assert!(!session.leader);

    let snapshot = hub.snapshot().await.unwrap();
    assert_eq!(snapshot.member_count("Groupe A"), 3);
    assert_eq!(snapshot.leader_of("Groupe C").unwrap().username, "dave");
    assert!(snapshot.validate().unwrap_err().is_integrity_error());

    // One of the two leaving clears the conflict without a promotion.
    hub.join_group("carol", "Groupe D").await.unwrap();
    let snapshot = hub.snapshot().await.unwrap();
    assert_eq!(snapshot.leader_of("Groupe A").unwrap().username, "alice");
    assert_leadership_invariants(&snapshot);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_lose_no_update() {
    let names: Vec<String> = (0..24).map(|i| format!("user{i:02}")).collect();
    let records = names.iter().map(|n| user(n)).collect::<Vec<_>>();
    let hub = Arc::new(setup_hub_with_records(records));

    let mut handles = Vec::new();
    for (i, name) in names.iter().cloned().enumerate() {
        let hub = Arc::clone(&hub);
        let group = ["Groupe A", "Groupe B", "Groupe C"][i % 3];
        handles.push(tokio::spawn(async move {
            hub.join_group(&name, group).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = hub.snapshot().await.unwrap();
    for group in ["Groupe A", "Groupe B", "Groupe C"] {
        assert_eq!(snapshot.member_count(group), 8);
    }
    assert_leadership_invariants(&snapshot);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_one_leader_per_group() {
    let names: Vec<String> = (0..12).map(|i| format!("user{i:02}")).collect();
    let hub = Arc::new(setup_hub_with_records(
        names.iter().map(|n| user(n)).collect(),
    ));

    let mut handles = Vec::new();
    for (i, name) in names.into_iter().enumerate() {
        let hub = Arc::clone(&hub);
        handles.push(tokio::spawn(async move {
            for round in 0..5 {
                let group = ["Groupe A", "Groupe B", "Groupe C", "Groupe D"][(i + round) % 4];
                hub.join_group(&name, group).await.unwrap();
                if round == 3 && i % 4 == 0 {
                    hub.unlink_identity(&name).await.unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_leadership_invariants(&hub.snapshot().await.unwrap());
}

#[tokio::test]
async fn test_concurrent_signups_of_same_name_admit_one() {
    let hub = Arc::new(setup_hub_with_store(Arc::new(InMemoryStore::new())));

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move { hub.signup("alice", &format!("pw{i}")).await })
        })
        .collect();

    let mut admitted = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(err) => assert!(err.is_conflict()),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(hub.snapshot().await.unwrap().len(), 1);
}
