//! Workload Client
//!
//! Creates, queries, updates and waits on `Deployment` and OpenShift
//! `DeploymentConfig` resources for a developer CLI.
//!
//! All operations go through an explicit [`WorkloadClient`] handle that owns
//! one cluster API per resource kind. Waiting is done by the conditional
//! watcher in [`wait`]: it watches a single named resource and returns the
//! first snapshot accepted by a caller-supplied predicate, or fails on
//! timeout or stream error.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use workload_client::wait::{WaitRequest, predicates};
//! use workload_client::{ClientConfig, WorkloadClient};
//!
//! # async fn example() -> Result<(), workload_client::WorkloadError> {
//! let client = WorkloadClient::try_default(&ClientConfig::default()).await?;
//!
//! // Read the revision before instantiating: the instantiate response
//! // already carries the bumped `latestVersion`.
//! let before = client.get_deployment_config("nodejs").await?;
//! client.start_deployment("nodejs").await?;
//! let request = WaitRequest::new("nodejs", Duration::from_secs(300));
//! client
//!     .wait_and_get_deployment_config(&request, predicates::is_rolled_out(before.latest_version() + 1))
//!     .await?;
//!
//! // Or in one call
//! client.redeploy_and_wait("nodejs", Duration::from_secs(300)).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod deployment_configs;
pub mod deployments;
pub mod dynamic;
pub mod error;
pub mod wait;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod deployment_configs_test;

pub use client::WorkloadClient;
pub use config::ClientConfig;
pub use dynamic::Document;
pub use error::WorkloadError;
pub use wait::{WaitRequest, wait_for};
