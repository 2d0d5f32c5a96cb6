//! Rollout
//!
//! Starts a new rollout of a DeploymentConfig and blocks until the rollout
//! has finished, failed, or the wait timed out.
//!
//! Configuration comes from environment variables:
//! - `ROLLOUT_NAME` (required): DeploymentConfig to roll out
//! - `WATCH_NAMESPACE`: namespace, defaults to the kubeconfig namespace
//! - `WAIT_TIMEOUT_SECS`: how long to wait, defaults to 300
//! - `RUST_LOG`: log filter, defaults to `info`

mod rollout;

use anyhow::{Context, Result};
use rollout::RolloutSettings;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use workload_client::WorkloadClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting rollout");

    let settings = RolloutSettings::from_lookup(|key| std::env::var(key).ok())
        .context("Failed to load configuration")?;

    info!("Configuration:");
    info!("  DeploymentConfig: {}", settings.name);
    info!("  Namespace: {}", settings.client.namespace.as_deref().unwrap_or("kubeconfig default"));
    info!("  Timeout: {:?}", settings.timeout);

    let client = WorkloadClient::try_default(&settings.client)
        .await
        .context("Failed to create cluster client")?;

    if let Err(e) = rollout::run(&client, &settings).await {
        error!("Rollout of {} failed: {}", settings.name, e);
        return Err(e).with_context(|| format!("Rollout of DeploymentConfig {} failed", settings.name));
    }

    Ok(())
}
