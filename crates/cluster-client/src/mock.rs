//! Mock cluster APIs for unit testing
//!
//! `MockClusterApi` keeps objects in memory, records every call as an
//! [`Action`], and serves watches from a [`FakeWatch`] that the test drives
//! by hand. Failures can be injected per verb. The `instantiate`
//! subresource bumps `status.latestVersion` as the server does.

use crate::cluster_trait::{ChangeStream, ClusterApi, DynamicApi};
use crate::error::ClusterError;
use crate::event::{ChangeEvent, ServerStatus};
use crate::selector::LabelSelector;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::{Stream, StreamExt};
use kube::core::GroupVersionResource;
use kube::{Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

type EventResult<K> = Result<ChangeEvent<K>, ClusterError>;

/// Subresource that starts a new rollout revision
const INSTANTIATE: &str = "instantiate";

/// API verb of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Create,
    Update,
    CreateSubresource,
    Watch,
}

/// One call made against a mock API
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub verb: Verb,
    /// Resource name for named calls
    pub name: Option<String>,
    /// Label selector for list calls
    pub label_selector: Option<String>,
    /// Subresource for subresource calls
    pub subresource: Option<String>,
    /// Resource version a watch started from
    pub resource_version: Option<String>,
    /// Body sent with writes
    pub object: Option<serde_json::Value>,
}

impl Action {
    fn new(verb: Verb) -> Self {
        Self {
            verb,
            name: None,
            label_selector: None,
            subresource: None,
            resource_version: None,
            object: None,
        }
    }

    fn named(verb: Verb, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(verb)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory `ClusterApi` for one resource kind
#[derive(Clone)]
pub struct MockClusterApi<K> {
    objects: Arc<Mutex<BTreeMap<String, K>>>,
    actions: Arc<Mutex<Vec<Action>>>,
    failures: Arc<Mutex<HashMap<Verb, (u16, String)>>>,
    pending_watch: Arc<Mutex<Option<UnboundedReceiver<EventResult<K>>>>>,
    released_watches: Arc<AtomicUsize>,
    // Counter for generating resource versions
    next_resource_version: Arc<AtomicU64>,
}

impl<K> Default for MockClusterApi<K> {
    fn default() -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            actions: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            pending_watch: Arc::new(Mutex::new(None)),
            released_watches: Arc::new(AtomicUsize::new(0)),
            next_resource_version: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl<K> std::fmt::Debug for MockClusterApi<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClusterApi")
            .field("objects", &lock(&self.objects).keys().collect::<Vec<_>>())
            .field("actions", &lock(&self.actions).len())
            .finish_non_exhaustive()
    }
}

impl<K> MockClusterApi<K>
where
    K: Resource + Clone + Serialize + Send + Sync + 'static,
{
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the mock store (for test setup)
    pub fn with_object(self, object: K) -> Self {
        self.add_object(object);
        self
    }

    /// Add an object to the mock store (for test setup)
    pub fn add_object(&self, object: K) {
        lock(&self.objects).insert(object.name_any(), object);
    }

    /// Current stored state of `name`
    pub fn object(&self, name: &str) -> Option<K> {
        lock(&self.objects).get(name).cloned()
    }

    /// Every call made so far, in order
    pub fn actions(&self) -> Vec<Action> {
        lock(&self.actions).clone()
    }

    /// Forget recorded calls
    pub fn clear_actions(&self) {
        lock(&self.actions).clear();
    }

    /// Make the next call with `verb` fail with a server error
    pub fn fail_next(&self, verb: Verb, code: u16, message: impl Into<String>) {
        lock(&self.failures).insert(verb, (code, message.into()));
    }

    /// Prepare the stream handed out by the next `watch` call
    pub fn fake_watch(&self) -> FakeWatch<K> {
        let (sender, receiver) = unbounded();
        *lock(&self.pending_watch) = Some(receiver);
        FakeWatch { sender }
    }

    /// How many watch streams have been dropped by their consumer
    pub fn released_watches(&self) -> usize {
        self.released_watches.load(Ordering::SeqCst)
    }

    fn record(&self, action: Action) -> Result<(), ClusterError> {
        let verb = action.verb;
        lock(&self.actions).push(action);
        match lock(&self.failures).remove(&verb) {
            Some((code, message)) => Err(ClusterError::Api { code, message }),
            None => Ok(()),
        }
    }

    fn stamp(&self, mut object: K) -> K {
        let version = self.next_resource_version.fetch_add(1, Ordering::SeqCst);
        object.meta_mut().resource_version = Some(version.to_string());
        object
    }
}

#[async_trait::async_trait]
impl<K> ClusterApi<K> for MockClusterApi<K>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K, ClusterError> {
        self.record(Action::named(Verb::Get, name))?;
        self.object(name)
            .ok_or_else(|| ClusterError::NotFound(format!("\"{name}\" not found")))
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<K>, ClusterError> {
        self.record(Action {
            label_selector: Some(label_selector.to_string()),
            ..Action::new(Verb::List)
        })?;
        let selector: LabelSelector = label_selector.parse()?;
        Ok(lock(&self.objects)
            .values()
            .filter(|obj| selector.matches(obj.labels()))
            .cloned()
            .collect())
    }

    async fn create(&self, object: &K) -> Result<K, ClusterError> {
        let name = object
            .meta()
            .name
            .clone()
            .ok_or_else(|| ClusterError::InvalidRequest("object has no name".to_string()))?;
        self.record(Action {
            object: Some(serde_json::to_value(object)?),
            ..Action::named(Verb::Create, &name)
        })?;

        let mut objects = lock(&self.objects);
        if objects.contains_key(&name) {
            return Err(ClusterError::Api {
                code: 409,
                message: format!("\"{name}\" already exists"),
            });
        }
        let stored = self.stamp(object.clone());
        objects.insert(name, stored.clone());
        Ok(stored)
    }

    async fn replace(&self, name: &str, object: &K) -> Result<K, ClusterError> {
        self.record(Action {
            object: Some(serde_json::to_value(object)?),
            ..Action::named(Verb::Update, name)
        })?;

        let mut objects = lock(&self.objects);
        if !objects.contains_key(name) {
            return Err(ClusterError::NotFound(format!("\"{name}\" not found")));
        }
        let stored = self.stamp(object.clone());
        objects.insert(name.to_string(), stored.clone());
        Ok(stored)
    }

    async fn create_subresource(
        &self,
        subresource: &str,
        name: &str,
        body: serde_json::Value,
    ) -> Result<K, ClusterError> {
        self.record(Action {
            subresource: Some(subresource.to_string()),
            object: Some(body),
            ..Action::named(Verb::CreateSubresource, name)
        })?;

        let mut objects = lock(&self.objects);
        let stored = objects
            .get(name)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(format!("\"{name}\" not found")))?;
        if subresource != INSTANTIATE {
            return Ok(stored);
        }

        // Instantiating starts the next revision before the response is sent
        let mut value = serde_json::to_value(&stored)?;
        let latest = value
            .pointer("/status/latestVersion")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();
        if let Some(object) = value.as_object_mut() {
            let status = object.entry("status").or_insert(serde_json::Value::Null);
            if !status.is_object() {
                *status = serde_json::Value::Object(serde_json::Map::new());
            }
            if let Some(status) = status.as_object_mut() {
                status.insert("latestVersion".to_string(), (latest + 1).into());
            }
        }
        let instantiated = self.stamp(serde_json::from_value(value)?);
        objects.insert(name.to_string(), instantiated.clone());
        Ok(instantiated)
    }

    async fn watch(&self, name: &str, resource_version: &str) -> Result<ChangeStream<K>, ClusterError> {
        self.record(Action {
            resource_version: Some(resource_version.to_string()),
            ..Action::named(Verb::Watch, name)
        })?;
        let receiver = lock(&self.pending_watch).take().ok_or_else(|| ClusterError::Api {
            code: 500,
            message: format!("no fake watch prepared for \"{name}\""),
        })?;
        Ok(TrackedStream {
            inner: receiver,
            released: Arc::clone(&self.released_watches),
        }
        .boxed())
    }
}

/// Test-side handle that feeds events into a mock watch
pub struct FakeWatch<K> {
    sender: UnboundedSender<EventResult<K>>,
}

impl<K> Clone for FakeWatch<K> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<K> std::fmt::Debug for FakeWatch<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeWatch")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<K> FakeWatch<K> {
    /// Emit an `ADDED` event. Returns false once the consumer is gone.
    pub fn add(&self, object: K) -> bool {
        self.send(Ok(ChangeEvent::Added(object)))
    }

    /// Emit a `MODIFIED` event. Returns false once the consumer is gone.
    pub fn modify(&self, object: K) -> bool {
        self.send(Ok(ChangeEvent::Modified(object)))
    }

    /// Emit a `DELETED` event. Returns false once the consumer is gone.
    pub fn delete(&self, object: K) -> bool {
        self.send(Ok(ChangeEvent::Deleted(object)))
    }

    /// Emit an `ERROR` event carrying a server status
    pub fn error(&self, code: u16, reason: &str, message: &str) -> bool {
        self.send(Ok(ChangeEvent::Error(ServerStatus {
            code,
            reason: reason.to_string(),
            message: message.to_string(),
        })))
    }

    /// Fail the stream itself, as a dropped connection would
    pub fn fail(&self, err: ClusterError) -> bool {
        self.send(Err(err))
    }

    /// End the stream, as the server closing the watch would
    pub fn stop(self) {
        self.sender.close_channel();
    }

    /// Whether the consumer has dropped its end
    pub fn is_released(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, event: EventResult<K>) -> bool {
        self.sender.unbounded_send(event).is_ok()
    }
}

/// Receiver that counts its own drop, so tests can assert the stream was released
struct TrackedStream<T> {
    inner: UnboundedReceiver<T>,
    released: Arc<AtomicUsize>,
}

impl<T> Stream for TrackedStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<T> Drop for TrackedStream<T> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory `DynamicApi` that records created documents
#[derive(Debug, Clone, Default)]
pub struct MockDynamicApi {
    created: Arc<Mutex<Vec<(GroupVersionResource, serde_json::Value)>>>,
    failure: Arc<Mutex<Option<(u16, String)>>>,
}

impl MockDynamicApi {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents created so far, with the resource they were created under
    pub fn created(&self) -> Vec<(GroupVersionResource, serde_json::Value)> {
        lock(&self.created).clone()
    }

    /// Make the next create fail with a server error
    pub fn fail_next(&self, code: u16, message: impl Into<String>) {
        *lock(&self.failure) = Some((code, message.into()));
    }
}

#[async_trait::async_trait]
impl DynamicApi for MockDynamicApi {
    async fn create(
        &self,
        resource: &GroupVersionResource,
        document: serde_json::Value,
    ) -> Result<serde_json::Value, ClusterError> {
        if let Some((code, message)) = lock(&self.failure).take() {
            return Err(ClusterError::Api { code, message });
        }
        lock(&self.created).push((resource.clone(), document.clone()));
        Ok(document)
    }
}
