//! Hierarchical in-memory datastore for the tessera runtime.
//!
//! The key space has three levels, each guarded by its own lock:
//!
//! ```text
//! Datastore ──▶ Index ──▶ Database ──▶ Entry(Object)
//! ```
//!
//! # Key Types
//!
//! - [`Object`] -- the capability contract every stored value satisfies
//! - [`Entry`] -- wrapper holding exactly one object
//! - [`Database`] -- named key → entry map behind a read/write lock
//! - [`Index`] -- named database map
//! - [`Datastore`] -- top-level index map with optional auto-indexing
//!
//! # Locking Rules
//!
//! 1. Locks are always taken in the order Datastore → Index → Database.
//! 2. A parent lock is released before the child lock is acquired; only an
//!    `Arc` handle to the child crosses the boundary.
//! 3. Reads take the shared side of a database lock, writes the exclusive side.
//! 4. Indexes are never removed once created.

pub mod database;
pub mod datastore;
pub mod entry;
pub mod error;
pub mod index;
pub mod object;

pub use database::Database;
pub use datastore::Datastore;
pub use entry::Entry;
pub use error::{StoreError, StoreResult};
pub use index::Index;
pub use object::{Object, ObjectClone};
