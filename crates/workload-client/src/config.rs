//! Client configuration.
//!
//! Values come from environment variables. Credentials and the default
//! namespace come from the kubeconfig / in-cluster config that
//! `kube::Client::try_default` resolves.

use crate::error::WorkloadError;
use std::time::Duration;

/// Namespace to operate in (defaults to the kubeconfig namespace)
pub const NAMESPACE_ENV: &str = "WATCH_NAMESPACE";

/// Default wait timeout, in whole seconds
pub const WAIT_TIMEOUT_ENV: &str = "WAIT_TIMEOUT_SECS";

/// Timeout used when `WAIT_TIMEOUT_SECS` is unset
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for building a [`WorkloadClient`](crate::WorkloadClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Namespace override; `None` uses the kubeconfig default
    pub namespace: Option<String>,
    /// Default deadline for waits
    pub wait_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, WorkloadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WorkloadError> {
        let namespace = lookup(NAMESPACE_ENV).filter(|ns| !ns.trim().is_empty());

        let wait_timeout = match lookup(WAIT_TIMEOUT_ENV) {
            None => DEFAULT_WAIT_TIMEOUT,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    WorkloadError::InvalidConfig(format!("{WAIT_TIMEOUT_ENV}={raw:?} is not a number of seconds: {e}"))
                })?;
                if secs == 0 {
                    return Err(WorkloadError::InvalidConfig(format!(
                        "{WAIT_TIMEOUT_ENV} must be greater than zero"
                    )));
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            namespace,
            wait_timeout,
        })
    }
}
