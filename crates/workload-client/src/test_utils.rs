//! Test utilities for unit testing workload operations
//!
//! This module provides a client wired to in-memory mocks and helpers for
//! creating test resources.

use crate::client::WorkloadClient;
use cluster_client::{MockClusterApi, MockDynamicApi};
use crds::{DeploymentConfig, DeploymentConfigSpec};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Namespace every fixture client operates in
pub const TEST_NAMESPACE: &str = "myproject";

/// A `WorkloadClient` plus handles to the mocks behind it
pub struct Fixture {
    pub client: WorkloadClient,
    pub deployments: MockClusterApi<Deployment>,
    pub deployment_configs: MockClusterApi<DeploymentConfig>,
    pub dynamic: MockDynamicApi,
}

impl Fixture {
    pub fn new() -> Self {
        let deployments = MockClusterApi::new();
        let deployment_configs = MockClusterApi::new();
        let dynamic = MockDynamicApi::new();
        let client = WorkloadClient::from_parts(
            TEST_NAMESPACE,
            Arc::new(deployments.clone()),
            Arc::new(deployment_configs.clone()),
            Arc::new(dynamic.clone()),
        );
        Self {
            client,
            deployments,
            deployment_configs,
            dynamic,
        }
    }

    /// Fixture whose DeploymentConfig store already holds `dcs`
    pub fn with_deployment_configs(dcs: impl IntoIterator<Item = DeploymentConfig>) -> Self {
        let fixture = Self::new();
        for dc in dcs {
            fixture.deployment_configs.add_object(dc);
        }
        fixture
    }
}

fn labels(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Helper to create a test DeploymentConfig with labels
pub fn create_test_deployment_config(name: &str, label_pairs: &[(&str, &str)]) -> DeploymentConfig {
    let mut dc = DeploymentConfig::new(name, DeploymentConfigSpec::default());
    dc.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    dc.metadata.labels = labels(label_pairs);
    dc
}

/// Helper to create a test DeploymentConfig whose first container has `env`
pub fn create_test_deployment_config_with_env(name: &str, env: Vec<EnvVar>) -> DeploymentConfig {
    let mut dc = create_test_deployment_config(name, &[]);
    dc.spec.template = Some(PodTemplateSpec {
        metadata: None,
        spec: Some(PodSpec {
            containers: vec![Container {
                name: name.to_string(),
                image: Some("bootstrap".to_string()),
                env: Some(env),
                ..Default::default()
            }],
            ..Default::default()
        }),
    });
    dc
}

/// Helper to create a test DeploymentSpec whose template is named `name`
pub fn create_test_deployment_spec(name: &str, label_pairs: &[(&str, &str)]) -> DeploymentSpec {
    DeploymentSpec {
        replicas: Some(1),
        selector: LabelSelector {
            match_labels: labels(label_pairs),
            ..Default::default()
        },
        template: PodTemplateSpec {
            metadata: Some(ObjectMeta {
                name: Some(name.to_string()),
                labels: labels(label_pairs),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: name.to_string(),
                    image: Some("nodejs".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        },
        ..Default::default()
    }
}
