//! Kubernetes-backed implementations of the cluster traits

use crate::cluster_trait::{ChangeStream, ClusterApi, DynamicApi};
use crate::error::ClusterError;
use crate::event::{ChangeEvent, ServerStatus};
use futures::{StreamExt, future};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams, PostParams, WatchEvent, WatchParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind, GroupVersionResource};
use kube::{Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Typed access to one namespaced resource kind through `kube::Api`
#[derive(Clone)]
pub struct KubeApi<K> {
    api: Api<K>,
}

impl<K> KubeApi<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    /// Access resources of kind `K` in `namespace`
    pub fn namespaced(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

impl<K> From<Api<K>> for KubeApi<K> {
    fn from(api: Api<K>) -> Self {
        Self { api }
    }
}

impl<K> std::fmt::Debug for KubeApi<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("kind", &std::any::type_name::<K>())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<K> ClusterApi<K> for KubeApi<K>
where
    K: Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K, ClusterError> {
        Ok(self.api.get(name).await?)
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<K>, ClusterError> {
        let lp = if label_selector.is_empty() {
            ListParams::default()
        } else {
            ListParams::default().labels(label_selector)
        };
        Ok(self.api.list(&lp).await?.items)
    }

    async fn create(&self, object: &K) -> Result<K, ClusterError> {
        Ok(self.api.create(&PostParams::default(), object).await?)
    }

    async fn replace(&self, name: &str, object: &K) -> Result<K, ClusterError> {
        Ok(self.api.replace(name, &PostParams::default(), object).await?)
    }

    async fn create_subresource(
        &self,
        subresource: &str,
        name: &str,
        body: serde_json::Value,
    ) -> Result<K, ClusterError> {
        let data = serde_json::to_vec(&body)?;
        Ok(self
            .api
            .create_subresource(subresource, name, &PostParams::default(), data)
            .await?)
    }

    async fn watch(&self, name: &str, resource_version: &str) -> Result<ChangeStream<K>, ClusterError> {
        let wp = WatchParams::default().fields(&format!("metadata.name={name}"));
        debug!("Opening watch for {} from resource version {}", name, resource_version);
        let stream = self.api.watch(&wp, resource_version).await?;
        Ok(stream
            .filter_map(|event| future::ready(into_change_event(event)))
            .boxed())
    }
}

/// Maps a raw `kube` watch item onto a `ChangeEvent`, dropping bookmarks.
fn into_change_event<K>(
    event: kube::Result<WatchEvent<K>>,
) -> Option<Result<ChangeEvent<K>, ClusterError>> {
    match event {
        Ok(WatchEvent::Added(obj)) => Some(Ok(ChangeEvent::Added(obj))),
        Ok(WatchEvent::Modified(obj)) => Some(Ok(ChangeEvent::Modified(obj))),
        Ok(WatchEvent::Deleted(obj)) => Some(Ok(ChangeEvent::Deleted(obj))),
        Ok(WatchEvent::Bookmark(_)) => None,
        Ok(WatchEvent::Error(status)) => Some(Ok(ChangeEvent::Error(ServerStatus {
            code: status.code,
            reason: status.reason.clone(),
            message: status.message.clone(),
        }))),
        Err(err) => Some(Err(err.into())),
    }
}

/// Untyped creates in one namespace through `Api<DynamicObject>`
#[derive(Clone)]
pub struct KubeDynamicApi {
    client: Client,
    namespace: String,
}

impl KubeDynamicApi {
    /// Create untyped resources in `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Debug for KubeDynamicApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeDynamicApi")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl DynamicApi for KubeDynamicApi {
    async fn create(
        &self,
        resource: &GroupVersionResource,
        document: serde_json::Value,
    ) -> Result<serde_json::Value, ClusterError> {
        // ApiResource needs the kind for the request body, the plural for the URL
        let kind = document
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ClusterError::InvalidRequest("document has no kind".to_string()))?
            .to_string();
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &kind);
        let api_resource = ApiResource::from_gvk_with_plural(&gvk, &resource.resource);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &self.namespace, &api_resource);

        let object: DynamicObject = serde_json::from_value(document)?;
        let created = api.create(&PostParams::default(), &object).await?;
        Ok(serde_json::to_value(created)?)
    }
}
