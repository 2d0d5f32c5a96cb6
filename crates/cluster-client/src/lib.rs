//! Cluster API Client
//!
//! Thin access layer over the Kubernetes API used by the workload client.
//! Every call maps onto a single API verb; retries, consistency and watch
//! semantics stay with the API server.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterApi, KubeApi};
//! use k8s_openapi::api::apps::v1::Deployment;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let deployments: KubeApi<Deployment> = KubeApi::namespaced(client, "default");
//!
//! // Query by label selector
//! let matching = deployments.list("app.kubernetes.io/part-of=app").await?;
//!
//! // Watch a single resource from now on
//! let events = deployments.watch("nodejs", "0").await?;
//! # drop((matching, events));
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed access**: `ClusterApi<K>` over any namespaced resource
//! - **Untyped access**: `DynamicApi` for operator-backed custom resources
//! - **Change streams**: watch events normalized into `ChangeEvent`
//! - **Label selectors**: parsing, matching and rendering
//! - **Mocking**: in-memory `MockClusterApi` with a fake watch (`test-util`)

pub mod client;
pub mod error;
pub mod event;
pub mod selector;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{KubeApi, KubeDynamicApi};
pub use cluster_trait::{ChangeStream, ClusterApi, DynamicApi};
pub use error::ClusterError;
pub use event::{ChangeEvent, ServerStatus};
pub use kube::core::GroupVersionResource;
pub use selector::{LabelSelector, Requirement};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{Action, FakeWatch, MockClusterApi, MockDynamicApi, Verb};
