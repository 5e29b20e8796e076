use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tessera_protocol::{Request, RequestReceiver};
use tessera_store::Datastore;
use tracing::{debug, info_span, Span};

use crate::handlers;

/// Counters for one worker, readable while the engine runs.
#[derive(Debug, Default)]
pub struct WorkerStats {
    processed: AtomicU64,
    failed: AtomicU64,
}

impl WorkerStats {
    /// Requests handled, successful or not.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Requests whose handler reported a store error.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// One member of the pool. Handles requests from its private queue in
/// arrival order until the queue is closed and drained.
pub(crate) struct Worker {
    id: usize,
    store: Arc<Datastore>,
    queue: RequestReceiver,
    stats: Arc<WorkerStats>,
    span: Span,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        store: Arc<Datastore>,
        queue: RequestReceiver,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            store,
            queue,
            stats,
            span: info_span!("worker", worker = id),
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(parent: &self.span, "worker started");
        while let Some(request) = self.queue.recv().await {
            self.process(request);
        }
        debug!(
            parent: &self.span,
            worker = self.id,
            processed = self.stats.processed(),
            failed = self.stats.failed(),
            "worker stopped"
        );
    }

    fn process(&self, request: Request) {
        let _worker = self.span.enter();
        let span = info_span!(
            "request",
            request = %request.kind(),
            index = request.index().unwrap_or_default(),
            database = request.database().unwrap_or_default(),
            entry = request.entry().unwrap_or_default(),
            timestamp = request.timestamp(),
        );
        let result = span.in_scope(|| handlers::handle(&self.store, request.into_operation()));

        self.stats.processed.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
