use std::fmt;
use std::mem;
use std::sync::Arc;

use tessera_protocol::{request_channel, RequestReceiver, RequestSender};
use tessera_store::Datastore;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{EngineError, EngineResult};
use crate::worker::{Worker, WorkerStats};

/// Lifecycle position of an [`InMemoryModule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Unconfigured,
    Configured,
    Running,
    Stopped,
}

enum Lifecycle {
    Unconfigured,
    Configured { inbound: RequestReceiver },
    Running(Running),
    Stopped,
}

struct Running {
    shutdown: oneshot::Sender<()>,
    dispatcher: JoinHandle<Vec<RequestSender>>,
    workers: Vec<JoinHandle<()>>,
}

/// The in-memory storage engine.
///
/// `configure` allocates the datastore and the inbound queue, `start` spawns
/// the worker pool and the dispatcher, and `stop` drains everything in order:
/// inbound queue, dispatcher, worker queues, workers.
pub struct InMemoryModule {
    config: EngineConfig,
    store: Arc<Datastore>,
    inbound: Option<RequestSender>,
    stats: Vec<Arc<WorkerStats>>,
    lifecycle: Lifecycle,
}

impl InMemoryModule {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: Arc::new(Datastore::default()),
            inbound: None,
            stats: Vec::new(),
            lifecycle: Lifecycle::Unconfigured,
        }
    }

    /// Apply tunables and allocate a fresh datastore and inbound queue.
    ///
    /// Allowed from any state except `Running`. Producers may obtain the
    /// [`communication_channel`](Self::communication_channel) as soon as this
    /// returns; their requests are buffered until `start`.
    pub fn configure(&mut self, config: EngineConfig) -> EngineResult<()> {
        if matches!(self.lifecycle, Lifecycle::Running(_)) {
            return Err(EngineError::AlreadyStarted);
        }
        config.validate()?;

        let (tx, rx) = request_channel(config.queue_depth);
        self.store = Arc::new(Datastore::new(config.auto_index));
        self.inbound = Some(tx);
        self.stats.clear();
        self.lifecycle = Lifecycle::Configured { inbound: rx };
        debug!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            auto_index = config.auto_index,
            "storage engine configured"
        );
        self.config = config;
        Ok(())
    }

    /// Pre-create namespaces, spawn the workers and the dispatcher, and
    /// return without waiting on them. Must be called inside a tokio runtime.
    pub async fn start(&mut self) -> EngineResult<()> {
        let inbound = match mem::replace(&mut self.lifecycle, Lifecycle::Unconfigured) {
            Lifecycle::Configured { inbound } => inbound,
            Lifecycle::Running(running) => {
                self.lifecycle = Lifecycle::Running(running);
                return Err(EngineError::AlreadyStarted);
            }
            other => {
                self.lifecycle = other;
                return Err(EngineError::NotConfigured);
            }
        };

        for namespace in &self.config.namespaces {
            if let Err(e) = self.store.add_index(namespace) {
                self.lifecycle = Lifecycle::Configured { inbound };
                return Err(e.into());
            }
        }

        let mut queues = Vec::with_capacity(self.config.workers);
        let mut workers = Vec::with_capacity(self.config.workers);
        self.stats.clear();
        for id in 0..self.config.workers {
            let (tx, rx) = request_channel(self.config.queue_depth);
            let stats = Arc::new(WorkerStats::default());
            let worker = Worker::new(id, Arc::clone(&self.store), rx, Arc::clone(&stats));
            workers.push(tokio::spawn(worker.run()));
            queues.push(tx);
            self.stats.push(stats);
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let dispatcher = tokio::spawn(Dispatcher::new(inbound, queues, shutdown_rx).run());

        self.lifecycle = Lifecycle::Running(Running {
            shutdown,
            dispatcher,
            workers,
        });
        info!(workers = self.config.workers, "storage engine started");
        Ok(())
    }

    /// Drain and join every task. A second call after a successful stop is a
    /// no-op.
    pub async fn stop(&mut self) -> EngineResult<()> {
        let running = match mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running(running) => running,
            Lifecycle::Stopped => return Ok(()),
            other => {
                self.lifecycle = other;
                return Err(EngineError::NotRunning);
            }
        };
        self.inbound = None;

        // The dispatcher may already have exited if every producer went away.
        let _ = running.shutdown.send(());
        let queues = running
            .dispatcher
            .await
            .map_err(|e| EngineError::TaskFailed(format!("dispatcher: {e}")))?;
        drop(queues);

        let mut failure = None;
        for (id, handle) in running.workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                failure.get_or_insert(EngineError::TaskFailed(format!("worker {id}: {e}")));
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        info!(
            processed = self.stats.iter().map(|s| s.processed()).sum::<u64>(),
            "storage engine stopped"
        );
        Ok(())
    }

    /// Sender side of the inbound queue. Available once configured and
    /// until stopped.
    pub fn communication_channel(&self) -> EngineResult<RequestSender> {
        self.inbound.clone().ok_or(EngineError::NotRunning)
    }

    pub fn store(&self) -> Arc<Datastore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        match self.lifecycle {
            Lifecycle::Unconfigured => EngineState::Unconfigured,
            Lifecycle::Configured { .. } => EngineState::Configured,
            Lifecycle::Running(_) => EngineState::Running,
            Lifecycle::Stopped => EngineState::Stopped,
        }
    }

    /// Per-worker counters for the current or most recent run.
    pub fn worker_stats(&self) -> &[Arc<WorkerStats>] {
        &self.stats
    }
}

impl Default for InMemoryModule {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryModule")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}
