//! Rollout settings and execution.

use crds::{CONDITION_AVAILABLE, DeploymentConfig};
use std::time::Duration;
use tracing::info;
use workload_client::{ClientConfig, WorkloadClient, WorkloadError};

/// DeploymentConfig to roll out
pub const ROLLOUT_NAME_ENV: &str = "ROLLOUT_NAME";

/// What to roll out and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutSettings {
    pub name: String,
    pub timeout: Duration,
    pub client: ClientConfig,
}

impl RolloutSettings {
    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WorkloadError> {
        let name = lookup(ROLLOUT_NAME_ENV)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                WorkloadError::InvalidConfig(format!("{ROLLOUT_NAME_ENV} environment variable is required"))
            })?;
        let client = ClientConfig::from_lookup(lookup)?;

        Ok(Self {
            name,
            timeout: client.wait_timeout,
            client,
        })
    }
}

/// Starts a rollout of the configured DeploymentConfig and waits for it.
pub async fn run(client: &WorkloadClient, settings: &RolloutSettings) -> Result<DeploymentConfig, WorkloadError> {
    info!(
        "Rolling out DeploymentConfig {}/{} (timeout {:?})",
        client.namespace(),
        settings.name,
        settings.timeout
    );
    let dc = client.redeploy_and_wait(&settings.name, settings.timeout).await?;
    info!("{}", summarize(&dc));
    Ok(dc)
}

/// One-line description of a finished rollout
pub fn summarize(dc: &DeploymentConfig) -> String {
    let name = dc.metadata.name.as_deref().unwrap_or_default();
    let available = dc
        .condition(CONDITION_AVAILABLE)
        .map_or("Unknown", |c| c.status.as_str());
    let (ready, replicas) = dc
        .status
        .as_ref()
        .map_or((0, 0), |s| (s.ready_replicas, s.replicas));
    format!(
        "DeploymentConfig {name} rolled out revision {} ({ready}/{replicas} ready, available: {available})",
        dc.latest_version()
    )
}
