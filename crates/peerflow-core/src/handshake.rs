//! Sync handshake: the pairwise calendar-sync state machine.
//!
//! Pending -> Accepted | Rejected, both terminal. An Accepted record
//! makes the two users synced peers in both directions. Independent of
//! the review workflow; shares only the record store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use peerflow_domain::{SyncDecision, SyncRequest, SyncRequestId, SyncStatus, User, UserId};
use peerflow_store::{NewSyncRequest, RecordStore, StorageError, SyncStore, UserStore};

use crate::error::{EngineError, Result};

/// Request/accept/reject state machine over pairwise user relations.
#[derive(Clone)]
pub struct SyncHandshake {
    store: Arc<dyn RecordStore>,
}

impl SyncHandshake {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Open a pending request from one user to another. A rejected or
    /// removed handshake can simply be re-requested; nothing locks the
    /// pair out.
    pub async fn request(&self, from: UserId, to: UserId) -> Result<SyncRequest> {
        let request = self
            .store
            .insert_sync_request(NewSyncRequest {
                from_user_id: from,
                to_user_id: to,
            })
            .await?;

        info!(request_id = %request.id, from = %from, to = %to, "sync requested");
        Ok(request)
    }

    /// Resolve a pending request as its addressee.
    ///
    /// An unknown id and an id addressed to someone else produce the
    /// same `NotFound` - the existence of other users' requests is not
    /// revealed. A request that is already terminal fails
    /// `InvalidSyncTransition`.
    pub async fn respond(
        &self,
        request_id: SyncRequestId,
        acting_user: UserId,
        decision: SyncDecision,
    ) -> Result<SyncRequest> {
        let mut request = self.store.sync_request(request_id).await?;

        if request.to_user_id != acting_user {
            return Err(EngineError::NotFound {
                collection: "sync_requests",
                id: request_id.0,
            });
        }
        if request.status != SyncStatus::Pending {
            return Err(EngineError::InvalidSyncTransition {
                request_id,
                current: request.status,
            });
        }

        request.status = decision.resolved_status();
        request.responded_at = Some(Utc::now());
        self.store.update_sync_request(&request).await?;

        info!(request_id = %request_id, status = %request.status, "sync request resolved");
        Ok(request)
    }

    /// Pending requests addressed to a user.
    pub async fn incoming(&self, user_id: UserId) -> Result<Vec<SyncRequest>> {
        Ok(self.store.pending_sync_requests_for(user_id).await?)
    }

    /// Every user connected to `user_id` through an Accepted request,
    /// whichever side initiated. Symmetric by construction; dangling
    /// peer ids are silently skipped.
    pub async fn synced_peers(&self, user_id: UserId) -> Result<Vec<User>> {
        let requests = self.store.sync_requests_involving(user_id).await?;

        let mut seen = HashSet::new();
        let mut peers = Vec::new();
        for request in requests {
            if request.status != SyncStatus::Accepted {
                continue;
            }
            let Some(peer_id) = request.peer_of(user_id) else {
                continue;
            };
            if !seen.insert(peer_id) {
                continue;
            }
            match self.store.user(peer_id).await {
                Ok(user) => peers.push(user),
                Err(StorageError::NotFound { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Ok(peers)
    }

    /// Delete every request for the unordered pair, in any status and
    /// either direction. Also cancels a still-pending request - either
    /// side can call this.
    pub async fn remove(&self, a: UserId, b: UserId) -> Result<usize> {
        let removed = self.store.delete_sync_pair(a, b).await?;
        if removed > 0 {
            info!(a = %a, b = %b, removed, "sync relation removed");
        }
        Ok(removed)
    }
}
