//! Peerflow Record Store
//!
//! Persistence layer for the peer-review platform. Five keyed collections
//! (users, assignments, submissions, reviews, sync requests) are exposed
//! through per-collection repository traits so the workflow engine never
//! touches a concrete backend.
//!
//! ## Backends
//!
//! - [`MemoryStore`]: mutex-guarded maps with atomic per-collection id
//!   sequences. The reference implementation, also used in tests.
//! - [`SurrealStore`]: SurrealDB-backed (`mem://` for ephemeral use,
//!   `surrealkv://` for local persistence) with idempotent schema setup.
//!
//! Both backends satisfy the same trait contracts; see
//! `tests/trait_contracts.rs`.

mod error;
pub mod memory;
mod migrations;
mod schema;
pub mod storage_traits;
mod surreal;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use storage_traits::{
    AssignmentStore, NewAssignment, NewReview, NewSubmission, NewSyncRequest, NewUser,
    RecordStore, ReviewStore, StorageResult, SubmissionStore, SyncStore, UserStore,
};
pub use surreal::SurrealStore;
