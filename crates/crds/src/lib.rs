//! Workload resource definitions
//!
//! OpenShift `apps.openshift.io/v1` types that are not part of `k8s-openapi`.
//! Upstream Kubernetes kinds (`Deployment`, `PodTemplateSpec`, ...) are used
//! directly from `k8s-openapi`.

pub mod deployment_config;
pub mod deployment_request;

pub use deployment_config::*;
pub use deployment_request::*;
