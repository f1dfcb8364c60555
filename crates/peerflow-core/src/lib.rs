//! Peerflow Core
//!
//! The review & progression workflow engine:
//!
//! - [`SubmissionLedger`]: submission lifecycle and the atomic
//!   review-counter step
//! - [`ReviewScorer`]: records a review, pays the reviewer, and awards
//!   completion experience to the author
//! - [`ReviewMatcher`]: derives a user's eligible-to-review queue
//! - [`UserProgression`]: monotonic point/experience accumulation
//! - [`SyncHandshake`]: pairwise calendar-sync request state machine
//! - [`Accounts`] / [`AssignmentCatalog`]: registration, search, stats,
//!   and the assignment catalog
//!
//! Everything runs over an injected [`peerflow_store::RecordStore`];
//! multi-step sequences take per-entity locks (submission before user) so
//! the ledger and progression invariants hold under concurrent callers.
//! [`Engine`] wires the services together for binaries.

pub mod accounts;
pub mod assignments;
pub mod engine;
pub mod error;
pub mod handshake;
pub mod ledger;
pub mod locks;
pub mod matcher;
pub mod progression;
pub mod scorer;
pub mod telemetry;

pub use accounts::{Accounts, UserStats};
pub use assignments::AssignmentCatalog;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use handshake::SyncHandshake;
pub use ledger::{ReviewProgress, SubmissionLedger};
pub use locks::LockMap;
pub use matcher::ReviewMatcher;
pub use progression::UserProgression;
pub use scorer::ReviewScorer;
pub use telemetry::init_tracing;

/// Peerflow core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
