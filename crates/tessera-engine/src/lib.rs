//! In-memory storage engine for tessera.
//!
//! One dispatcher task reads the shared inbound queue and routes each
//! [`Request`](tessera_protocol::Request) to one of N worker tasks:
//!
//! - namespace-wide kinds (`SetIndex`, `FetchIndexes`, `FetchDatabases`,
//!   `FetchEntries`) go to a uniformly random worker;
//! - key-scoped kinds (`SetEntry`, `DeleteEntry`, `FetchEntry`,
//!   `FetchAllEntries`, `ClearData`) go to [`shard_for`]`(index, database)`,
//!   so every request on one shard is handled by one worker in the order the
//!   dispatcher saw it.
//!
//! Each worker owns a bounded queue and runs requests to completion one at a
//! time against the shared [`Datastore`](tessera_store::Datastore).

pub mod config;
pub mod dispatcher;
pub mod error;
mod handlers;
pub mod module;
pub mod worker;

pub use config::EngineConfig;
pub use dispatcher::shard_for;
pub use error::{EngineError, EngineResult};
pub use module::{EngineState, InMemoryModule};
pub use worker::WorkerStats;
