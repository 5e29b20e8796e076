use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tessera_engine::{EngineConfig, InMemoryModule};
use tessera_protocol::{try_send, PendingReply, Reply, Request, RequestSender};
use tessera_store::{Datastore, Object};

use crate::error::RuntimeResult;
use crate::module::{Module, ModuleContext, StorageModule};

/// [`InMemoryModule`] packaged as the application's storage module.
#[derive(Debug)]
pub struct StorageEngine {
    config: EngineConfig,
    engine: InMemoryModule,
}

impl StorageEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: InMemoryModule::new(),
        }
    }

    pub fn engine(&self) -> &InMemoryModule {
        &self.engine
    }

    pub fn store(&self) -> Arc<Datastore> {
        self.engine.store()
    }
}

#[async_trait]
impl Module for StorageEngine {
    fn name(&self) -> &str {
        "storage"
    }

    fn configure(&mut self, _ctx: &ModuleContext) -> RuntimeResult<()> {
        self.engine.configure(self.config.clone())?;
        Ok(())
    }

    async fn start(&mut self) -> RuntimeResult<()> {
        self.engine.start().await?;
        Ok(())
    }

    async fn stop(&mut self) -> RuntimeResult<()> {
        self.engine.stop().await?;
        Ok(())
    }
}

impl StorageModule for StorageEngine {
    fn communication_channel(&self) -> RuntimeResult<RequestSender> {
        Ok(self.engine.communication_channel()?)
    }

    fn submit_timeout(&self) -> Duration {
        self.config.submit_duration()
    }
}

/// Outcome of one request sent through a [`StorageClient`].
///
/// `failure` means the request never reached the queue. Otherwise `object`
/// holds the reply of a fetch, or `None` when the fetch found nothing or the
/// request kind has no reply.
#[derive(Debug, Default)]
pub struct Response {
    pub failure: bool,
    pub object: Option<Reply>,
}

impl Response {
    fn failed() -> Self {
        Self {
            failure: true,
            object: None,
        }
    }

    /// The name list of a successful listing fetch.
    pub fn into_names(self) -> Option<Vec<String>> {
        self.object.and_then(Reply::into_names)
    }

    /// The objects of a successful whole-database fetch.
    pub fn into_objects(self) -> Option<Vec<Box<dyn Object>>> {
        self.object.and_then(Reply::into_objects)
    }

    /// The object of a successful entry fetch.
    pub fn into_object(self) -> Option<Box<dyn Object>> {
        self.object.and_then(Reply::into_object)
    }
}

/// Submits requests to the storage module and waits for their replies.
#[derive(Clone, Debug)]
pub struct StorageClient {
    queue: RequestSender,
    timeout: Duration,
}

impl StorageClient {
    pub fn new(queue: RequestSender, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit `request` and, if `reply` is given, wait for it.
    pub async fn send(&self, request: Request, reply: Option<PendingReply>) -> Response {
        if !try_send(&self.queue, request, self.timeout).await {
            return Response::failed();
        }
        match reply {
            Some(pending) => Response {
                failure: false,
                object: pending.recv().await,
            },
            None => Response::default(),
        }
    }

    pub async fn set_index(&self, index: &str) -> RuntimeResult<Response> {
        Ok(self.send(Request::set_index(index)?, None).await)
    }

    pub async fn set_entry(
        &self,
        index: &str,
        database: &str,
        entry: &str,
        object: Box<dyn Object>,
    ) -> RuntimeResult<Response> {
        let request = Request::set_entry(index, database, entry, object)?;
        Ok(self.send(request, None).await)
    }

    pub async fn delete_entry(
        &self,
        index: &str,
        database: &str,
        entry: &str,
    ) -> RuntimeResult<Response> {
        Ok(self
            .send(Request::delete_entry(index, database, entry)?, None)
            .await)
    }

    pub async fn clear_entry(
        &self,
        index: &str,
        database: &str,
        entry: &str,
    ) -> RuntimeResult<Response> {
        Ok(self
            .send(Request::clear_data(index, database, entry)?, None)
            .await)
    }

    pub async fn fetch_indexes(&self) -> Response {
        let (request, pending) = Request::fetch_indexes();
        self.send(request, Some(pending)).await
    }

    pub async fn fetch_databases(&self, index: &str) -> RuntimeResult<Response> {
        let (request, pending) = Request::fetch_databases(index)?;
        Ok(self.send(request, Some(pending)).await)
    }

    pub async fn fetch_entries(&self, index: &str, database: &str) -> RuntimeResult<Response> {
        let (request, pending) = Request::fetch_entries(index, database)?;
        Ok(self.send(request, Some(pending)).await)
    }

    pub async fn fetch_all_entries(&self, index: &str, database: &str) -> RuntimeResult<Response> {
        let (request, pending) = Request::fetch_all_entries(index, database)?;
        Ok(self.send(request, Some(pending)).await)
    }

    pub async fn fetch_entry(
        &self,
        index: &str,
        database: &str,
        entry: &str,
    ) -> RuntimeResult<Response> {
        let (request, pending) = Request::fetch_entry(index, database, entry)?;
        Ok(self.send(request, Some(pending)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::logging::LogLevelHandle;

    #[derive(Clone, Debug)]
    struct Label(String);

    impl Object for Label {
        fn id(&self) -> String {
            self.0.clone()
        }

        fn clear(&mut self) {
            self.0.clear();
        }
    }

    async fn running() -> (StorageEngine, StorageClient) {
        let mut storage = StorageEngine::new(EngineConfig {
            workers: 2,
            queue_depth: 4,
            ..Default::default()
        });
        let ctx = ModuleContext::new("test", LogLevelHandle::detached("info").unwrap());
        storage.configure(&ctx).unwrap();
        storage.start().await.unwrap();
        let client = StorageClient::new(
            storage.communication_channel().unwrap(),
            storage.submit_timeout(),
        );
        (storage, client)
    }

    #[tokio::test]
    async fn round_trip_through_client() {
        let (mut storage, client) = running().await;

        let set = client
            .set_entry("a", "b", "c", Box::new(Label("hello".into())))
            .await
            .unwrap();
        assert!(!set.failure);
        assert!(set.object.is_none());

        let fetched = client.fetch_entry("a", "b", "c").await.unwrap();
        assert!(!fetched.failure);
        assert_eq!(fetched.into_object().unwrap().id(), "hello");

        let names = client.fetch_entries("a", "b").await.unwrap().into_names();
        assert_eq!(names, Some(vec!["c".to_string()]));

        storage.stop().await.unwrap();
    }

    #[tokio::test]
    async fn fetch_all_entries_through_client() {
        let (mut storage, client) = running().await;
        for (key, label) in [("y", "second"), ("x", "first")] {
            client
                .set_entry("a", "b", key, Box::new(Label(label.into())))
                .await
                .unwrap();
        }

        let objects = client
            .fetch_all_entries("a", "b")
            .await
            .unwrap()
            .into_objects()
            .unwrap();
        let ids: Vec<String> = objects.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec!["first", "second"]);

        let missing = client.fetch_all_entries("a", "none").await.unwrap();
        assert!(!missing.failure);
        assert!(missing.object.is_none());

        storage.stop().await.unwrap();
    }

    #[tokio::test]
    async fn missing_entry_is_not_a_failure() {
        let (mut storage, client) = running().await;
        let response = client.fetch_entry("a", "b", "nope").await.unwrap();
        assert!(!response.failure);
        assert!(response.object.is_none());
        storage.stop().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_request_rejected_before_submission() {
        let (mut storage, client) = running().await;
        let err = client.fetch_entries("", "b").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Request(_)));
        storage.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stopped_storage_reports_failure() {
        let (mut storage, client) = running().await;
        storage.stop().await.unwrap();
        assert!(client.fetch_indexes().await.failure);
    }
}
