use std::hash::Hasher;

use rand::Rng;
use siphasher::sip::SipHasher;
use tessera_protocol::{Request, RequestReceiver, RequestSender, Scope};
use tokio::sync::oneshot;
use tracing::{debug, error, trace};

/// Worker index for a shard.
///
/// SipHash with fixed zero keys over the index name followed by the database
/// name, reduced modulo `workers`. Stable across processes and releases.
pub fn shard_for(index: &str, database: &str, workers: usize) -> usize {
    let mut hasher = SipHasher::new();
    hasher.write(index.as_bytes());
    hasher.write(database.as_bytes());
    (hasher.finish() % workers.max(1) as u64) as usize
}

/// Single reader of the inbound queue. Routes every request to exactly one
/// worker queue.
pub(crate) struct Dispatcher {
    inbound: RequestReceiver,
    workers: Vec<RequestSender>,
    shutdown: oneshot::Receiver<()>,
}

impl Dispatcher {
    pub(crate) fn new(
        inbound: RequestReceiver,
        workers: Vec<RequestSender>,
        shutdown: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            inbound,
            workers,
            shutdown,
        }
    }

    /// Route until shutdown is signalled (or every producer is gone), then
    /// close the inbound queue, route what is still buffered, and hand the
    /// worker queues back to the caller.
    pub(crate) async fn run(mut self) -> Vec<RequestSender> {
        debug!(workers = self.workers.len(), "dispatcher started");
        loop {
            tokio::select! {
                _ = &mut self.shutdown => break,
                next = self.inbound.recv() => match next {
                    Some(request) => self.route(request).await,
                    None => break,
                },
            }
        }

        self.inbound.close();
        let mut drained = 0usize;
        while let Some(request) = self.inbound.recv().await {
            self.route(request).await;
            drained += 1;
        }
        debug!(drained, "dispatcher stopped");
        self.workers
    }

    async fn route(&self, request: Request) {
        let worker = self.pick(&request);
        trace!(worker, request = %request.kind(), "routing");
        if self.workers[worker].send(request).await.is_err() {
            error!(worker, "worker queue closed, request dropped");
        }
    }

    fn pick(&self, request: &Request) -> usize {
        let workers = self.workers.len();
        match (request.kind().scope(), request.index(), request.database()) {
            (Scope::Shard, Some(index), Some(database)) => shard_for(index, database, workers),
            _ => rand::thread_rng().gen_range(0..workers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tessera_protocol::request_channel;

    #[test]
    fn shard_is_stable() {
        let first = shard_for("metrics", "cpu", 10);
        for _ in 0..100 {
            assert_eq!(shard_for("metrics", "cpu", 10), first);
        }
    }

    #[test]
    fn single_worker_takes_everything() {
        assert_eq!(shard_for("a", "b", 1), 0);
        assert_eq!(shard_for("x", "y", 1), 0);
    }

    #[test]
    fn shards_spread_over_workers() {
        let mut seen = [false; 4];
        for n in 0..64 {
            seen[shard_for("idx", &format!("db{n}"), 4)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    proptest! {
        #[test]
        fn shard_in_range(index in ".{0,16}", database in ".{0,16}", workers in 1usize..64) {
            prop_assert!(shard_for(&index, &database, workers) < workers);
        }
    }

    #[tokio::test]
    async fn shard_requests_land_on_one_worker() {
        let (inbound_tx, inbound_rx) = request_channel(16);
        let mut receivers = Vec::new();
        let mut senders = Vec::new();
        for _ in 0..4 {
            let (tx, rx) = request_channel(16);
            senders.push(tx);
            receivers.push(rx);
        }
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(Dispatcher::new(inbound_rx, senders, stop_rx).run());

        for n in 0..8 {
            let request = tessera_protocol::Request::delete_entry("i", "d", format!("k{n}")).unwrap();
            inbound_tx.send(request).await.unwrap();
        }
        stop_tx.send(()).unwrap();
        let senders = task.await.unwrap();
        drop(senders);

        let target = shard_for("i", "d", 4);
        for (n, rx) in receivers.iter_mut().enumerate() {
            let mut keys = Vec::new();
            while let Some(request) = rx.recv().await {
                keys.push(request.entry().unwrap().to_string());
            }
            if n == target {
                let expected: Vec<String> = (0..8).map(|k| format!("k{k}")).collect();
                assert_eq!(keys, expected);
            } else {
                assert!(keys.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn drains_buffered_requests_on_shutdown() {
        let (inbound_tx, inbound_rx) = request_channel(4);
        let (worker_tx, mut worker_rx) = request_channel(8);
        let (stop_tx, stop_rx) = oneshot::channel();

        for n in 0..4 {
            inbound_tx
                .send(tessera_protocol::Request::set_index(format!("i{n}")).unwrap())
                .await
                .unwrap();
        }
        stop_tx.send(()).unwrap();

        let senders = Dispatcher::new(inbound_rx, vec![worker_tx], stop_rx)
            .run()
            .await;
        drop(senders);

        let mut routed = 0;
        while worker_rx.recv().await.is_some() {
            routed += 1;
        }
        assert_eq!(routed, 4);
        assert!(inbound_tx.is_closed());
    }
}
