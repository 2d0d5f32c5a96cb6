//! Cluster API traits for mocking
//!
//! These traits abstract the Kubernetes API so that callers can be tested
//! without a cluster. `KubeApi` / `KubeDynamicApi` implement them against a
//! real API server, and `MockClusterApi` / `MockDynamicApi` (feature
//! `test-util`) implement them in memory.

use crate::error::ClusterError;
use crate::event::ChangeEvent;
use futures::stream::BoxStream;
use kube::core::GroupVersionResource;

/// Ordered change events for one watched resource.
///
/// Dropping the stream closes the underlying connection.
pub type ChangeStream<K> = BoxStream<'static, Result<ChangeEvent<K>, ClusterError>>;

/// Typed operations on one namespaced resource kind
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterApi<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Get a resource by name. A missing resource is `ClusterError::NotFound`.
    async fn get(&self, name: &str) -> Result<K, ClusterError>;

    /// List resources matching a label selector (empty selector lists all)
    async fn list(&self, label_selector: &str) -> Result<Vec<K>, ClusterError>;

    /// Create a resource in a single write
    async fn create(&self, object: &K) -> Result<K, ClusterError>;

    /// Replace a resource in a single write
    async fn replace(&self, name: &str, object: &K) -> Result<K, ClusterError>;

    /// POST a body to a subresource of `name`, e.g. `instantiate`
    async fn create_subresource(
        &self,
        subresource: &str,
        name: &str,
        body: serde_json::Value,
    ) -> Result<K, ClusterError>;

    /// Open a change stream for the resource called `name`, starting at
    /// `resource_version` (`"0"` starts from the current state).
    async fn watch(&self, name: &str, resource_version: &str) -> Result<ChangeStream<K>, ClusterError>;
}

/// Untyped create for resources the client has no Rust type for
#[async_trait::async_trait]
pub trait DynamicApi: Send + Sync {
    /// Create `document` under the given group/version/resource and return the
    /// object as stored by the server
    async fn create(
        &self,
        resource: &GroupVersionResource,
        document: serde_json::Value,
    ) -> Result<serde_json::Value, ClusterError>;
}
