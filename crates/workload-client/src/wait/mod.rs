//! Conditional watcher.
//!
//! Blocks until a named resource satisfies a caller-supplied predicate. The
//! watch stream and a wall-clock deadline race each other; whichever fires
//! first decides the outcome:
//!
//! - `ADDED` / `MODIFIED`: the predicate is evaluated on the snapshot; the
//!   first accepted snapshot is returned.
//! - `ERROR`, `DELETED`, a transport error or the end of the stream: the
//!   wait fails right away, without waiting for the deadline.
//! - deadline: the wait fails with [`WorkloadError::Timeout`].
//!
//! The deadline starts before the watch is opened, so a slow API server
//! cannot stretch the wait. Events are evaluated one at a time in server
//! order. The stream is owned by the wait and dropped on every exit path,
//! which closes the connection.
//! Nothing is retried here.

pub mod predicates;

use crate::error::WorkloadError;
use cluster_client::{ChangeEvent, ChangeStream, ClusterApi};
use futures::StreamExt;
use kube::Resource;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resource version that starts a watch from the current state
pub const FROM_NOW: &str = "0";

/// What to wait for: one named resource, from a resource version, for at
/// most `timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRequest {
    name: String,
    resource_version: String,
    timeout: Duration,
}

impl WaitRequest {
    /// Wait on `name` from its current state for at most `timeout`
    pub fn new(name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            resource_version: FROM_NOW.to_string(),
            timeout,
        }
    }

    /// Start the watch at a known resource version instead of the current state
    #[must_use]
    pub fn from_resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.resource_version = resource_version.into();
        self
    }

    /// Name of the watched resource
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource version the watch starts at
    pub fn resource_version(&self) -> &str {
        &self.resource_version
    }

    /// Wall-clock deadline for the whole wait
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn validate(&self, kind: &str) -> Result<(), WorkloadError> {
        WorkloadError::require_name(kind, &self.name)?;
        if self.timeout.is_zero() {
            return Err(WorkloadError::InvalidInput(format!(
                "timeout waiting for {kind} {} must be greater than zero",
                self.name
            )));
        }
        Ok(())
    }
}

/// Waits until `predicate` accepts a snapshot of the requested resource.
///
/// The predicate receives the snapshot and its `metadata.generation` (0 when
/// unset). It must be a quick, side-effect free check: it runs on the waiting
/// task, and the deadline keeps running while it executes.
///
/// Returns the first accepted snapshot. Fails with a usage error for an empty
/// name or zero timeout (without contacting the cluster), with
/// [`WorkloadError::Timeout`] when the deadline passes, and immediately on
/// server error events, deletion, transport errors or the stream closing.
pub async fn wait_for<K, P>(
    api: &dyn ClusterApi<K>,
    request: &WaitRequest,
    predicate: P,
) -> Result<K, WorkloadError>
where
    K: Resource + Send + Sync + 'static,
    K::DynamicType: Default,
    P: Fn(&K, i64) -> bool,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    request.validate(&kind)?;

    debug!(
        "Waiting up to {:?} for {} {} from resource version {}",
        request.timeout, kind, request.name, request.resource_version
    );
    // Opening the watch counts against the deadline; the stream is dropped
    // with the timed future.
    let outcome = tokio::time::timeout(request.timeout, async {
        let mut events = api
            .watch(&request.name, &request.resource_version)
            .await
            .map_err(|e| WorkloadError::cluster("watch", &kind, &request.name, e))?;
        first_accepted(&mut events, &kind, &request.name, &predicate).await
    })
    .await;

    match outcome {
        Ok(Ok(object)) => {
            info!("{} {} satisfied the wait condition", kind, request.name);
            Ok(object)
        }
        Ok(Err(e)) => {
            warn!("Wait on {} {} failed: {}", kind, request.name, e);
            Err(e)
        }
        Err(_elapsed) => {
            warn!("Timed out after {:?} waiting for {} {}", request.timeout, kind, request.name);
            Err(WorkloadError::Timeout {
                kind,
                name: request.name.clone(),
                timeout: request.timeout,
            })
        }
    }
}

/// Consumes events until one is accepted or the stream fails.
async fn first_accepted<K, P>(
    events: &mut ChangeStream<K>,
    kind: &str,
    name: &str,
    predicate: &P,
) -> Result<K, WorkloadError>
where
    K: Resource,
    P: Fn(&K, i64) -> bool,
{
    while let Some(event) = events.next().await {
        let event = event.map_err(|e| WorkloadError::cluster("watch", kind, name, e))?;
        match event {
            ChangeEvent::Added(object) | ChangeEvent::Modified(object) => {
                let generation = object.meta().generation.unwrap_or_default();
                if predicate(&object, generation) {
                    return Ok(object);
                }
                debug!(
                    "{} {} at resource version {} does not satisfy the condition yet",
                    kind,
                    name,
                    object.meta().resource_version.as_deref().unwrap_or("<none>")
                );
            }
            ChangeEvent::Deleted(_) => {
                return Err(WorkloadError::Deleted {
                    kind: kind.to_string(),
                    name: name.to_string(),
                });
            }
            ChangeEvent::Error(status) => {
                return Err(WorkloadError::WatchFailed {
                    kind: kind.to_string(),
                    name: name.to_string(),
                    status,
                });
            }
        }
    }

    Err(WorkloadError::StreamClosed {
        kind: kind.to_string(),
        name: name.to_string(),
    })
}
