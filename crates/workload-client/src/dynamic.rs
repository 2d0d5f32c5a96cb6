//! Untyped resources.
//!
//! Operator-backed services are created from plain JSON documents under a
//! group/version/resource the client has no Rust type for. This is the only
//! place untyped documents cross into the cluster API.

use crate::client::WorkloadClient;
use crate::error::WorkloadError;
use cluster_client::GroupVersionResource;
use serde_json::Value;
use tracing::info;

/// An untyped resource document (`apiVersion`, `kind`, `metadata`, ...)
pub type Document = serde_json::Map<String, Value>;

impl WorkloadClient {
    /// Creates `document` under `resource` in the client namespace and returns
    /// the name of the created object.
    ///
    /// The document must carry a `kind` and a `metadata.name` or
    /// `metadata.generateName`. A missing `metadata.namespace` is filled in
    /// with the client namespace.
    pub async fn create_dynamic_resource(
        &self,
        mut document: Document,
        resource: &GroupVersionResource,
    ) -> Result<String, WorkloadError> {
        let kind = document
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| WorkloadError::InvalidInput(format!("{} document has no kind", resource.resource)))?
            .to_string();

        let metadata = document
            .entry("metadata")
            .or_insert_with(|| Value::Object(Default::default()))
            .as_object_mut()
            .ok_or_else(|| WorkloadError::InvalidInput(format!("{kind} metadata is not an object")))?;
        let requested_name = metadata
            .get("name")
            .or_else(|| metadata.get("generateName"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| WorkloadError::InvalidInput(format!("{kind} document has no name")))?;
        metadata
            .entry("namespace")
            .or_insert_with(|| Value::String(self.namespace().to_string()));

        let created = self
            .dynamic
            .create(resource, Value::Object(document))
            .await
            .map_err(|e| WorkloadError::cluster("create", &kind, &requested_name, e))?;

        let name = created
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or(&requested_name)
            .to_string();
        info!(
            "Created {} {}/{} ({}/{} {})",
            kind,
            self.namespace(),
            name,
            resource.group,
            resource.version,
            resource.resource
        );
        Ok(name)
    }
}
