//! Stock wait predicates.
//!
//! Each function returns a closure suitable for [`wait_for`](super::wait_for).
//! The closures only read the snapshot they are given.

use crds::{CONDITION_PROGRESSING, DeploymentConfig, REASON_NEW_RC_AVAILABLE, REASON_TIMED_OUT};
use k8s_openapi::api::apps::v1::Deployment;
use kube::Resource;

/// Accepts a DeploymentConfig once rollout `desired_revision` has finished.
///
/// The controller must have observed the current generation, reached at
/// least `desired_revision`, and reported `Progressing=True` with reason
/// `NewReplicationControllerAvailable`.
pub fn is_rolled_out(desired_revision: i64) -> impl Fn(&DeploymentConfig, i64) -> bool {
    move |dc, generation| {
        let Some(status) = dc.status.as_ref() else {
            return false;
        };
        if status.observed_generation < generation || status.latest_version < desired_revision {
            return false;
        }
        dc.condition(CONDITION_PROGRESSING)
            .is_some_and(|c| c.is_true() && c.reason.as_deref() == Some(REASON_NEW_RC_AVAILABLE))
    }
}

/// Accepts a DeploymentConfig once rollout `desired_revision` has exceeded its
/// progress deadline, i.e. `Progressing=False` with reason
/// `ProgressDeadlineExceeded`.
pub fn rollout_failed(desired_revision: i64) -> impl Fn(&DeploymentConfig, i64) -> bool {
    move |dc, _| dc.latest_version() >= desired_revision && dc.progress_deadline_exceeded().is_some()
}

/// Accepts any resource carrying annotation `key` with exactly `value`
pub fn has_annotation<K: Resource>(key: impl Into<String>, value: impl Into<String>) -> impl Fn(&K, i64) -> bool {
    let key = key.into();
    let value = value.into();
    move |object, _| {
        object
            .meta()
            .annotations
            .as_ref()
            .and_then(|a| a.get(&key))
            .is_some_and(|v| *v == value)
    }
}

/// Accepts a Deployment whose current generation is fully updated and available
pub fn deployment_rolled_out() -> impl Fn(&Deployment, i64) -> bool {
    |deployment, generation| {
        let Some(status) = deployment.status.as_ref() else {
            return false;
        };
        if status.observed_generation.unwrap_or_default() < generation {
            return false;
        }
        let desired = deployment
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1);
        status.updated_replicas.unwrap_or_default() >= desired
            && status.available_replicas.unwrap_or_default() >= desired
    }
}
