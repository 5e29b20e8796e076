use std::collections::HashSet;
use std::future::Future;

use tracing::{error, info};

use crate::error::{RuntimeError, RuntimeResult};
use crate::logging::LogLevelHandle;
use crate::module::{Module, ModuleContext, StorageModule};
use crate::storage::StorageClient;

/// An explicitly assembled set of modules with a shared lifecycle.
///
/// The storage module is configured and started before every other module
/// and stopped after all of them.
pub struct Application {
    name: String,
    log_level: LogLevelHandle,
    storage: Box<dyn StorageModule>,
    modules: Vec<Box<dyn Module>>,
    client: Option<StorageClient>,
    /// Number of modules (storage included) currently started.
    started: usize,
}

impl Application {
    pub fn new(
        name: impl Into<String>,
        storage: impl StorageModule + 'static,
        log_level: LogLevelHandle,
    ) -> Self {
        Self {
            name: name.into(),
            log_level,
            storage: Box::new(storage),
            modules: Vec::new(),
            client: None,
            started: 0,
        }
    }

    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.add_module(Box::new(module));
        self
    }

    pub fn add_module(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module names in start order.
    pub fn module_names(&self) -> Vec<&str> {
        std::iter::once(self.storage.name())
            .chain(self.modules.iter().map(|m| m.name()))
            .collect()
    }

    /// Client for the storage module, available after `configure`.
    pub fn storage_client(&self) -> RuntimeResult<StorageClient> {
        self.client.clone().ok_or(RuntimeError::NotConfigured)
    }

    /// Configure the storage module, then every other module in order. The
    /// first error aborts.
    pub fn configure(&mut self) -> RuntimeResult<()> {
        let mut seen = HashSet::new();
        for name in self.module_names() {
            if !seen.insert(name) {
                return Err(RuntimeError::DuplicateModule(name.to_string()));
            }
        }

        let ctx = ModuleContext::new(self.name.clone(), self.log_level.clone());
        self.storage.configure(&ctx)?;
        let client = StorageClient::new(
            self.storage.communication_channel()?,
            self.storage.submit_timeout(),
        );
        let ctx = ctx.with_storage(client.clone());

        for module in &mut self.modules {
            module.configure(&ctx)?;
            info!(module = module.name(), "module configured");
        }
        self.client = Some(client);
        Ok(())
    }

    /// Start every module in order. If one fails, the modules already
    /// started are stopped in reverse order and the error is returned.
    pub async fn start(&mut self) -> RuntimeResult<()> {
        if self.client.is_none() {
            return Err(RuntimeError::NotConfigured);
        }

        if let Err(e) = self.storage.start().await {
            error!(module = self.storage.name(), error = %e, "module failed to start");
            return Err(e);
        }
        self.started = 1;

        for i in 0..self.modules.len() {
            if let Err(e) = self.modules[i].start().await {
                error!(module = self.modules[i].name(), error = %e, "module failed to start");
                self.stop().await;
                return Err(e);
            }
            self.started += 1;
            info!(module = self.modules[i].name(), "module started");
        }
        info!(app = %self.name, modules = self.started, "application started");
        Ok(())
    }

    /// Stop started modules in reverse order. Individual failures are logged
    /// and do not prevent the remaining modules from stopping.
    pub async fn stop(&mut self) {
        while self.started > 1 {
            self.started -= 1;
            let module = &mut self.modules[self.started - 1];
            match module.stop().await {
                Ok(()) => info!(module = module.name(), "module stopped"),
                Err(e) => error!(module = module.name(), error = %e, "module failed to stop"),
            }
        }
        if self.started == 1 {
            self.started = 0;
            match self.storage.stop().await {
                Ok(()) => info!(module = self.storage.name(), "module stopped"),
                Err(e) => error!(module = self.storage.name(), error = %e, "module failed to stop"),
            }
        }
    }

    /// Start, wait for `shutdown`, then stop.
    pub async fn run_until<F>(&mut self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        info!(app = %self.name, "shutting down");
        self.stop().await;
        Ok(())
    }
}
