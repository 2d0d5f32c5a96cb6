//! DeploymentRequest body
//!
//! Posted to the `instantiate` subresource of a DeploymentConfig to start a
//! new rollout.

use serde::{Deserialize, Serialize};

/// Kind of the instantiate request body
pub const DEPLOYMENT_REQUEST_KIND: &str = "DeploymentRequest";

/// API version of the instantiate request body
pub const DEPLOYMENT_REQUEST_API_VERSION: &str = "apps.openshift.io/v1";

/// Subresource that accepts a [`DeploymentRequest`]
pub const INSTANTIATE_SUBRESOURCE: &str = "instantiate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    pub kind: String,
    pub api_version: String,

    /// Name of the DeploymentConfig to instantiate
    pub name: String,

    /// Update the config to the latest state of its image triggers first
    pub latest: bool,

    /// Roll out even if the template did not change
    pub force: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_triggers: Vec<String>,
}

impl DeploymentRequest {
    /// Request a forced rollout of the latest state of `name`
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            kind: DEPLOYMENT_REQUEST_KIND.to_string(),
            api_version: DEPLOYMENT_REQUEST_API_VERSION.to_string(),
            name: name.into(),
            latest: true,
            force: true,
            exclude_triggers: Vec::new(),
        }
    }
}
