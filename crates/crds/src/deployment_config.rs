//! DeploymentConfig resource
//!
//! OpenShift's rollout-managed workload. The CRD itself is owned by the
//! cluster, so no schema is generated here; only the fields the client
//! reads or writes are modelled, everything else round-trips as JSON.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{EnvVar, PodTemplateSpec};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition type reported while a rollout is progressing
pub const CONDITION_PROGRESSING: &str = "Progressing";

/// Condition type reported once the minimum number of replicas is available
pub const CONDITION_AVAILABLE: &str = "Available";

/// Progressing reason set when the latest replication controller is available
pub const REASON_NEW_RC_AVAILABLE: &str = "NewReplicationControllerAvailable";

/// Progressing reason set when a rollout exceeded its deadline
pub const REASON_TIMED_OUT: &str = "ProgressDeadlineExceeded";

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    status = "DeploymentConfigStatus",
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// Desired number of pods
    #[serde(default)]
    pub replicas: i32,

    /// Label query over pods that should match the replica count
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,

    /// Pod template rolled out by this config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,

    /// Paused configs do not trigger new rollouts
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub paused: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Rollout strategy, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<serde_json::Value>,

    /// Image and config change triggers, passed through untouched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    /// Revision of the most recently started rollout
    #[serde(default)]
    pub latest_version: i64,

    /// Most recent generation observed by the deployment config controller
    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default)]
    pub replicas: i32,

    #[serde(default)]
    pub updated_replicas: i32,

    #[serde(default)]
    pub available_replicas: i32,

    #[serde(default)]
    pub ready_replicas: i32,

    #[serde(default)]
    pub unavailable_replicas: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<DeploymentCondition>,
}

/// Observed state of a DeploymentConfig at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCondition {
    /// Condition type, e.g. `Progressing` or `Available`
    #[serde(rename = "type")]
    pub type_: String,

    /// `True`, `False` or `Unknown`
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl DeploymentCondition {
    /// Whether the condition status is `True`
    pub fn is_true(&self) -> bool {
        self.status == "True"
    }
}

impl DeploymentConfig {
    /// Latest rollout revision, 0 if the controller has not reported one yet
    pub fn latest_version(&self) -> i64 {
        self.status.as_ref().map_or(0, |s| s.latest_version)
    }

    /// Looks up a status condition by type
    pub fn condition(&self, type_: &str) -> Option<&DeploymentCondition> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.iter().find(|c| c.type_ == type_))
    }

    /// The `Progressing` condition, if it reports the rollout exceeded its
    /// progress deadline
    pub fn progress_deadline_exceeded(&self) -> Option<&DeploymentCondition> {
        self.condition(CONDITION_PROGRESSING)
            .filter(|c| !c.is_true() && c.reason.as_deref() == Some(REASON_TIMED_OUT))
    }

    /// Environment of the first container in the pod template.
    ///
    /// Returns an empty list when the template has no containers or the
    /// container declares no environment.
    pub fn container_env(&self) -> Vec<EnvVar> {
        self.spec
            .template
            .as_ref()
            .and_then(|t| t.spec.as_ref())
            .and_then(|s| s.containers.first())
            .and_then(|c| c.env.clone())
            .unwrap_or_default()
    }
}
