//! DeploymentConfig operations.
//!
//! Lookups by name or label selector, rollouts through the `instantiate`
//! subresource, and annotation updates. Waiting on a DeploymentConfig goes
//! through the conditional watcher like every other kind.

use crate::client::{DEPLOYMENT_CONFIG_KIND, WorkloadClient};
use crate::error::WorkloadError;
use crate::wait::{WaitRequest, predicates, wait_for};
use crds::{DeploymentConfig, DeploymentRequest, INSTANTIATE_SUBRESOURCE, REASON_TIMED_OUT};
use k8s_openapi::api::core::v1::EnvVar;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

impl WorkloadClient {
    /// Gets a DeploymentConfig by name.
    pub async fn get_deployment_config(&self, name: &str) -> Result<DeploymentConfig, WorkloadError> {
        WorkloadError::require_name(DEPLOYMENT_CONFIG_KIND, name)?;
        debug!("Getting DeploymentConfig {}/{}", self.namespace(), name);
        self.deployment_configs
            .get(name)
            .await
            .map_err(|e| WorkloadError::lookup(DEPLOYMENT_CONFIG_KIND, name, e))
    }

    /// Lists the DeploymentConfigs matching a label selector.
    ///
    /// The selector is passed to the server unchanged; an empty selector
    /// lists everything in the namespace.
    pub async fn list_deployment_configs(&self, selector: &str) -> Result<Vec<DeploymentConfig>, WorkloadError> {
        debug!("Listing DeploymentConfigs in {} matching {:?}", self.namespace(), selector);
        self.deployment_configs
            .list(selector)
            .await
            .map_err(|e| WorkloadError::cluster("list", DEPLOYMENT_CONFIG_KIND, selector, e))
    }

    /// Values of label `label` across the DeploymentConfigs matching
    /// `selector`, sorted. DeploymentConfigs without the label are skipped.
    pub async fn get_deployment_config_label_values(
        &self,
        label: &str,
        selector: &str,
    ) -> Result<Vec<String>, WorkloadError> {
        let mut values: Vec<String> = self
            .list_deployment_configs(selector)
            .await?
            .into_iter()
            .filter_map(|dc| dc.metadata.labels.and_then(|mut labels| labels.remove(label)))
            .collect();
        values.sort();
        Ok(values)
    }

    /// The single DeploymentConfig matching `selector`.
    ///
    /// Fails with `NotFound` when nothing matches and `MultipleMatches` when
    /// more than one does.
    pub async fn get_deployment_config_from_selector(
        &self,
        selector: &str,
    ) -> Result<DeploymentConfig, WorkloadError> {
        let mut matches = self.list_deployment_configs(selector).await?;
        match matches.len() {
            0 => Err(WorkloadError::NotFound {
                kind: DEPLOYMENT_CONFIG_KIND.to_string(),
                target: selector.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(WorkloadError::MultipleMatches {
                kind: DEPLOYMENT_CONFIG_KIND.to_string(),
                selector: selector.to_string(),
                count,
            }),
        }
    }

    /// Waits until the named DeploymentConfig satisfies `predicate` and
    /// returns it.
    ///
    /// See [`wait_for`] for the outcome rules.
    pub async fn wait_and_get_deployment_config<P>(
        &self,
        request: &WaitRequest,
        predicate: P,
    ) -> Result<DeploymentConfig, WorkloadError>
    where
        P: Fn(&DeploymentConfig, i64) -> bool,
    {
        wait_for(self.deployment_configs.as_ref(), request, predicate).await
    }

    /// Starts a new rollout of `name` from its latest state.
    pub async fn start_deployment(&self, name: &str) -> Result<DeploymentConfig, WorkloadError> {
        WorkloadError::require_name(DEPLOYMENT_CONFIG_KIND, name)?;

        let body = serde_json::to_value(DeploymentRequest::latest(name))
            .map_err(|e| WorkloadError::cluster("instantiate", DEPLOYMENT_CONFIG_KIND, name, e.into()))?;
        let dc = self
            .deployment_configs
            .create_subresource(INSTANTIATE_SUBRESOURCE, name, body)
            .await
            .map_err(|e| WorkloadError::cluster("instantiate", DEPLOYMENT_CONFIG_KIND, name, e))?;

        info!(
            "Started rollout of DeploymentConfig {}/{} (latest version {})",
            self.namespace(),
            name,
            dc.latest_version()
        );
        Ok(dc)
    }

    /// Starts a rollout of `name` and waits up to `timeout` for it to finish.
    ///
    /// Fails with `RolloutFailed` as soon as the new revision exceeds its
    /// progress deadline.
    pub async fn redeploy_and_wait(&self, name: &str, timeout: Duration) -> Result<DeploymentConfig, WorkloadError> {
        let current = self.get_deployment_config(name).await?;
        let desired_revision = current.latest_version() + 1;
        self.start_deployment(name).await?;

        let rolled_out = predicates::is_rolled_out(desired_revision);
        let failed = predicates::rollout_failed(desired_revision);
        let request = WaitRequest::new(name, timeout);
        let dc = self
            .wait_and_get_deployment_config(&request, |dc, generation| {
                rolled_out(dc, generation) || failed(dc, generation)
            })
            .await?;

        if let Some(condition) = dc.progress_deadline_exceeded() {
            return Err(WorkloadError::RolloutFailed {
                kind: DEPLOYMENT_CONFIG_KIND.to_string(),
                name: name.to_string(),
                revision: desired_revision,
                message: condition
                    .message
                    .clone()
                    .unwrap_or_else(|| REASON_TIMED_OUT.to_string()),
            });
        }
        Ok(dc)
    }

    /// Environment of the first container of `name`'s pod template.
    pub async fn get_env_vars_from_deployment_config(&self, name: &str) -> Result<Vec<EnvVar>, WorkloadError> {
        let dc = self.get_deployment_config(name).await?;
        Ok(dc.container_env())
    }

    /// Replaces the annotations of `name` with `annotations`.
    ///
    /// Annotations not present in the given map are removed.
    pub async fn update_deployment_config_annotations(
        &self,
        name: &str,
        annotations: BTreeMap<String, String>,
    ) -> Result<DeploymentConfig, WorkloadError> {
        let mut dc = self.get_deployment_config(name).await?;
        dc.metadata.annotations = Some(annotations);

        let updated = self
            .deployment_configs
            .replace(name, &dc)
            .await
            .map_err(|e| WorkloadError::cluster("update", DEPLOYMENT_CONFIG_KIND, name, e))?;

        info!("Updated annotations of DeploymentConfig {}/{}", self.namespace(), name);
        Ok(updated)
    }
}
