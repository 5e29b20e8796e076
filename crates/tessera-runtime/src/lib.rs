//! Module lifecycle harness for tessera.
//!
//! An [`Application`] is assembled in code from one [`StorageModule`] and any
//! number of other [`Module`]s. The storage module is configured and started
//! first, so other modules can use the [`StorageClient`] handed to them in
//! their [`ModuleContext`] from their own `start` onward.
//!
//! This crate also owns process configuration ([`AppConfig`]) and the
//! global `tracing` subscriber ([`init_logging`]), whose level can be changed
//! at runtime through a [`LogLevelHandle`].

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod storage;

pub use app::Application;
pub use config::{AppConfig, HttpConfig, LogFormat, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{init_logging, parse_level, LogLevelHandle};
pub use module::{Module, ModuleContext, StorageModule};
pub use storage::{Response, StorageClient, StorageEngine};
