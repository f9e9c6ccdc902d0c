//! Feature storage for the voting board.
//!
//! The store owns the invariants that need a lock to hold: id assignment,
//! case-insensitive title uniqueness, and the atomic vote counter.
//!
//! # Storage Backends
//!
//! All backends implement the [`FeatureStore`] trait:
//!
//! - [`InMemoryFeatureStore`] -- `RwLock`-guarded table for tests and embedding
//! - [`JournaledFeatureStore`] -- the same table backed by an append-only
//!   [`Journal`] that is replayed on open
//!
//! # Design Rules
//!
//! 1. Every operation touches one record and holds one lock for its duration.
//! 2. Mutations are validated against the table before they are journaled,
//!    and journaled before they are applied.
//! 3. Ordering is computed at query time; the table keeps no sorted index.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod journal;
pub mod journaled;
pub mod memory;
pub mod table;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use journal::{Journal, JournalConfig, SyncMode};
pub use journaled::JournaledFeatureStore;
pub use memory::InMemoryFeatureStore;
pub use table::{FeatureTable, Mutation};
pub use traits::{FeatureQuery, FeatureStore, QueryResult};
