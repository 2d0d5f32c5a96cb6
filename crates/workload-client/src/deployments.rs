//! Deployment operations.
//!
//! A Deployment is built from its `DeploymentSpec` alone: the object metadata
//! (name, labels, owner references) is taken from the pod template metadata.

use crate::client::{DEPLOYMENT_KIND, WorkloadClient};
use crate::error::WorkloadError;
use crate::wait::{WaitRequest, wait_for};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use tracing::{debug, info};

impl WorkloadClient {
    /// Gets a Deployment by name.
    pub async fn get_deployment_by_name(&self, name: &str) -> Result<Deployment, WorkloadError> {
        WorkloadError::require_name(DEPLOYMENT_KIND, name)?;
        debug!("Getting Deployment {}/{}", self.namespace(), name);
        self.deployments
            .get(name)
            .await
            .map_err(|e| WorkloadError::lookup(DEPLOYMENT_KIND, name, e))
    }

    /// Creates a Deployment from `spec`.
    ///
    /// Fails with a usage error when the template metadata carries no name.
    pub async fn create_deployment(&self, spec: DeploymentSpec) -> Result<Deployment, WorkloadError> {
        let (name, deployment) = deployment_from_spec(spec)?;
        let created = self
            .deployments
            .create(&deployment)
            .await
            .map_err(|e| WorkloadError::cluster("create", DEPLOYMENT_KIND, &name, e))?;

        info!("Created Deployment {}/{}", self.namespace(), name);
        Ok(created)
    }

    /// Replaces an existing Deployment with one built from `spec`.
    pub async fn update_deployment(&self, spec: DeploymentSpec) -> Result<Deployment, WorkloadError> {
        let (name, deployment) = deployment_from_spec(spec)?;
        let updated = self
            .deployments
            .replace(&name, &deployment)
            .await
            .map_err(|e| WorkloadError::cluster("update", DEPLOYMENT_KIND, &name, e))?;

        info!("Updated Deployment {}/{}", self.namespace(), name);
        Ok(updated)
    }

    /// Waits until the named Deployment satisfies `predicate` and returns it.
    ///
    /// See [`wait_for`] for the outcome rules.
    pub async fn wait_and_get_deployment<P>(
        &self,
        request: &WaitRequest,
        predicate: P,
    ) -> Result<Deployment, WorkloadError>
    where
        P: Fn(&Deployment, i64) -> bool,
    {
        wait_for(self.deployments.as_ref(), request, predicate).await
    }
}

fn deployment_from_spec(spec: DeploymentSpec) -> Result<(String, Deployment), WorkloadError> {
    let metadata = spec.template.metadata.clone().unwrap_or_default();
    let name = metadata.name.clone().unwrap_or_default();
    WorkloadError::require_name(DEPLOYMENT_KIND, &name)?;

    let deployment = Deployment {
        metadata,
        spec: Some(spec),
        status: None,
    };
    Ok((name, deployment))
}
