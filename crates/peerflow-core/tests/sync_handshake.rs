//! Sync handshake scenarios: request/accept/reject, symmetric peer
//! derivation, masked not-found, and pair removal.

use std::sync::Arc;

use peerflow_core::{Engine, EngineError};
use peerflow_domain::{SyncDecision, SyncRequestId, SyncStatus, User, UserId};
use peerflow_store::MemoryStore;

fn engine() -> Engine {
    Engine::new(Arc::new(MemoryStore::new()))
}

async fn register(engine: &Engine, name: &str) -> User {
    engine
        .accounts()
        .register(name.to_string(), None)
        .await
        .expect("register")
}

async fn peer_ids(engine: &Engine, user: UserId) -> Vec<UserId> {
    engine
        .handshake()
        .synced_peers(user)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect()
}

#[tokio::test]
async fn accept_derives_symmetric_peers() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let request = engine.handshake().request(alice.id, bob.id).await.unwrap();
    assert_eq!(request.status, SyncStatus::Pending);
    assert!(request.responded_at.is_none());

    let resolved = engine
        .handshake()
        .respond(request.id, bob.id, SyncDecision::Accept)
        .await
        .unwrap();
    assert_eq!(resolved.status, SyncStatus::Accepted);
    assert!(resolved.responded_at.is_some());

    assert_eq!(peer_ids(&engine, alice.id).await, vec![bob.id]);
    assert_eq!(peer_ids(&engine, bob.id).await, vec![alice.id]);
}

#[tokio::test]
async fn reject_leaves_no_peers_and_allows_rerequest() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let request = engine.handshake().request(alice.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(request.id, bob.id, SyncDecision::Reject)
        .await
        .unwrap();

    assert!(peer_ids(&engine, alice.id).await.is_empty());
    assert!(peer_ids(&engine, bob.id).await.is_empty());

    // No lockout: a fresh request opens a new pending handshake.
    let retry = engine.handshake().request(alice.id, bob.id).await.unwrap();
    assert_ne!(retry.id, request.id);
    assert_eq!(retry.status, SyncStatus::Pending);
}

#[tokio::test]
async fn respond_by_wrong_user_masks_as_not_found() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let carol = register(&engine, "carol").await;

    let request = engine.handshake().request(alice.id, bob.id).await.unwrap();

    // Neither a third party nor the requester may resolve it, and the
    // error is indistinguishable from an unknown id.
    for intruder in [carol.id, alice.id] {
        let err = engine
            .handshake()
            .respond(request.id, intruder, SyncDecision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    // Still pending for the real addressee.
    let incoming = engine.handshake().incoming(bob.id).await.unwrap();
    assert_eq!(incoming.len(), 1);
}

#[tokio::test]
async fn respond_to_unknown_request_is_not_found() {
    let engine = engine();
    let bob = register(&engine, "bob").await;

    let err = engine
        .handshake()
        .respond(SyncRequestId(404), bob.id, SyncDecision::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn resolved_request_admits_no_further_transitions() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let request = engine.handshake().request(alice.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(request.id, bob.id, SyncDecision::Accept)
        .await
        .unwrap();

    let err = engine
        .handshake()
        .respond(request.id, bob.id, SyncDecision::Reject)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidSyncTransition {
            current: SyncStatus::Accepted,
            ..
        }
    ));

    // The accepted relation is untouched.
    assert_eq!(peer_ids(&engine, alice.id).await, vec![bob.id]);
}

#[tokio::test]
async fn remove_clears_pair_for_both_sides() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let request = engine.handshake().request(alice.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(request.id, bob.id, SyncDecision::Accept)
        .await
        .unwrap();

    // Either side may sever; the argument order does not matter.
    let removed = engine.handshake().remove(bob.id, alice.id).await.unwrap();
    assert_eq!(removed, 1);

    assert!(peer_ids(&engine, alice.id).await.is_empty());
    assert!(peer_ids(&engine, bob.id).await.is_empty());
}

#[tokio::test]
async fn remove_also_cancels_pending_requests() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    engine.handshake().request(alice.id, bob.id).await.unwrap();
    let removed = engine.handshake().remove(alice.id, bob.id).await.unwrap();
    assert_eq!(removed, 1);

    assert!(engine.handshake().incoming(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_sweeps_every_record_for_the_pair() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    // A rejected handshake in one direction, then a pending one in the
    // other direction.
    let first = engine.handshake().request(alice.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(first.id, bob.id, SyncDecision::Reject)
        .await
        .unwrap();
    engine.handshake().request(bob.id, alice.id).await.unwrap();

    let removed = engine.handshake().remove(alice.id, bob.id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(engine.handshake().incoming(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn incoming_lists_only_pending_requests_addressed_to_user() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let carol = register(&engine, "carol").await;

    // Pending to bob, accepted to bob, pending FROM bob.
    engine.handshake().request(alice.id, bob.id).await.unwrap();
    let accepted = engine.handshake().request(carol.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(accepted.id, bob.id, SyncDecision::Accept)
        .await
        .unwrap();
    engine.handshake().request(bob.id, carol.id).await.unwrap();

    let incoming = engine.handshake().incoming(bob.id).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].from_user_id, alice.id);
}

#[tokio::test]
async fn peers_deduplicate_across_multiple_accepted_records() {
    let engine = engine();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    // Two accepted handshakes between the same pair, opposite directions.
    let ab = engine.handshake().request(alice.id, bob.id).await.unwrap();
    engine
        .handshake()
        .respond(ab.id, bob.id, SyncDecision::Accept)
        .await
        .unwrap();
    let ba = engine.handshake().request(bob.id, alice.id).await.unwrap();
    engine
        .handshake()
        .respond(ba.id, alice.id, SyncDecision::Accept)
        .await
        .unwrap();

    assert_eq!(peer_ids(&engine, alice.id).await, vec![bob.id]);
    assert_eq!(peer_ids(&engine, bob.id).await, vec![alice.id]);
}
