use std::time::Duration;

use async_trait::async_trait;

use tessera_protocol::RequestSender;

use crate::error::{RuntimeError, RuntimeResult};
use crate::logging::LogLevelHandle;
use crate::storage::StorageClient;

/// What a module receives when it is configured.
#[derive(Clone, Debug)]
pub struct ModuleContext {
    app_name: String,
    log_level: LogLevelHandle,
    storage: Option<StorageClient>,
}

impl ModuleContext {
    pub fn new(app_name: impl Into<String>, log_level: LogLevelHandle) -> Self {
        Self {
            app_name: app_name.into(),
            log_level,
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: StorageClient) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> &LogLevelHandle {
        &self.log_level
    }

    /// Client for the storage module. Absent only while the storage module
    /// itself is being configured.
    pub fn storage(&self) -> RuntimeResult<StorageClient> {
        self.storage
            .clone()
            .ok_or_else(|| RuntimeError::Config("storage module not configured".into()))
    }
}

/// A unit of the running process with a configure/start/stop lifecycle.
#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// Read settings and allocate resources. Must not contact anything
    /// outside the process.
    fn configure(&mut self, ctx: &ModuleContext) -> RuntimeResult<()>;

    /// Begin work and return without waiting for it to finish.
    async fn start(&mut self) -> RuntimeResult<()>;

    /// Stop work and wait for it to wind down.
    async fn stop(&mut self) -> RuntimeResult<()>;
}

/// The module that owns the datastore. Other modules reach it only through
/// its communication channel.
pub trait StorageModule: Module {
    /// Inbound request queue. Available once configured.
    fn communication_channel(&self) -> RuntimeResult<RequestSender>;

    /// How long producers wait for the queue to accept a request.
    fn submit_timeout(&self) -> Duration;
}
