//! The workload client handle.
//!
//! A `WorkloadClient` is created once by the CLI and passed to every
//! operation. It owns one cluster API per resource kind, all scoped to a
//! single namespace.

use crate::config::ClientConfig;
use crate::error::WorkloadError;
use cluster_client::{ClusterApi, DynamicApi, KubeApi, KubeDynamicApi};
use crds::DeploymentConfig;
use k8s_openapi::api::apps::v1::Deployment;
use std::sync::Arc;
use tracing::info;

/// Kind name used in errors and logs for Deployments
pub const DEPLOYMENT_KIND: &str = "Deployment";

/// Kind name used in errors and logs for DeploymentConfigs
pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";

/// Handle for workload operations in one namespace.
#[derive(Clone)]
pub struct WorkloadClient {
    namespace: String,
    pub(crate) deployments: Arc<dyn ClusterApi<Deployment>>,
    pub(crate) deployment_configs: Arc<dyn ClusterApi<DeploymentConfig>>,
    pub(crate) dynamic: Arc<dyn DynamicApi>,
}

impl WorkloadClient {
    /// Creates a client backed by the Kubernetes API.
    pub fn new(client: kube::Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            deployments: Arc::new(KubeApi::<Deployment>::namespaced(client.clone(), &namespace)),
            deployment_configs: Arc::new(KubeApi::<DeploymentConfig>::namespaced(
                client.clone(),
                &namespace,
            )),
            dynamic: Arc::new(KubeDynamicApi::new(client, namespace.clone())),
            namespace,
        }
    }

    /// Creates a client from the ambient kubeconfig / in-cluster config.
    ///
    /// The namespace comes from `config`, falling back to the kubeconfig
    /// context's namespace.
    pub async fn try_default(config: &ClientConfig) -> Result<Self, WorkloadError> {
        let client = kube::Client::try_default()
            .await
            .map_err(|e| WorkloadError::InvalidConfig(format!("unable to load cluster configuration: {e}")))?;
        let namespace = config
            .namespace
            .clone()
            .unwrap_or_else(|| client.default_namespace().to_string());

        info!("Using namespace {}", namespace);
        Ok(Self::new(client, namespace))
    }

    /// Assembles a client from explicit API implementations (used with mocks).
    pub fn from_parts(
        namespace: impl Into<String>,
        deployments: Arc<dyn ClusterApi<Deployment>>,
        deployment_configs: Arc<dyn ClusterApi<DeploymentConfig>>,
        dynamic: Arc<dyn DynamicApi>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            deployments,
            deployment_configs,
            dynamic,
        }
    }

    /// Namespace all operations run in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Debug for WorkloadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadClient")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
