//! Engine facade: wires the workflow services over one record store.

use std::sync::Arc;

use peerflow_domain::ScoringPolicy;
use peerflow_store::RecordStore;

use crate::accounts::Accounts;
use crate::assignments::AssignmentCatalog;
use crate::handshake::SyncHandshake;
use crate::ledger::SubmissionLedger;
use crate::locks::LockMap;
use crate::matcher::ReviewMatcher;
use crate::progression::UserProgression;
use crate::scorer::ReviewScorer;

/// The assembled workflow engine.
///
/// Shares one store and one lock map per entity family across all
/// services, so the scorer's multi-step sequence and the ledger's atomic
/// step contend on the same per-submission mutex.
pub struct Engine {
    accounts: Accounts,
    assignments: AssignmentCatalog,
    ledger: SubmissionLedger,
    scorer: ReviewScorer,
    matcher: ReviewMatcher,
    progression: UserProgression,
    handshake: SyncHandshake,
}

impl Engine {
    /// Build an engine with the default scoring policy.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_policy(store, ScoringPolicy::default())
    }

    /// Build an engine with an explicit scoring policy.
    pub fn with_policy(store: Arc<dyn RecordStore>, policy: ScoringPolicy) -> Self {
        let submission_locks = Arc::new(LockMap::new());
        let user_locks = Arc::new(LockMap::new());

        let progression = UserProgression::new(store.clone(), user_locks);
        let ledger = SubmissionLedger::new(store.clone(), submission_locks.clone());
        let scorer = ReviewScorer::new(
            store.clone(),
            ledger.clone(),
            progression.clone(),
            policy.clone(),
            submission_locks,
        );

        Engine {
            accounts: Accounts::new(store.clone()),
            assignments: AssignmentCatalog::new(store.clone(), policy),
            matcher: ReviewMatcher::new(store.clone()),
            handshake: SyncHandshake::new(store),
            ledger,
            scorer,
            progression,
        }
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn assignments(&self) -> &AssignmentCatalog {
        &self.assignments
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn scorer(&self) -> &ReviewScorer {
        &self.scorer
    }

    pub fn matcher(&self) -> &ReviewMatcher {
        &self.matcher
    }

    pub fn progression(&self) -> &UserProgression {
        &self.progression
    }

    pub fn handshake(&self) -> &SyncHandshake {
        &self.handshake
    }
}
