//! Workload client error types.
//!
//! Every variant names the resource involved so a CLI can print it as-is.
//! Nothing here is retried; callers decide on retry policy.

use cluster_client::{ClusterError, ServerStatus};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by workload operations.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Invalid input, rejected before any call to the cluster
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No resource matched a name or selector
    #[error("{kind} not found: {target}")]
    NotFound {
        /// Resource kind
        kind: String,
        /// Name or selector that matched nothing
        target: String,
    },

    /// A selector expected to match one resource matched several
    #[error("multiple {kind}s ({count}) exist for the selector: {selector}. Only one must be present")]
    MultipleMatches {
        /// Resource kind
        kind: String,
        /// Selector used for the lookup
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// The cluster API call failed
    #[error("unable to {operation} {kind} {name}: {source}")]
    Cluster {
        /// API operation attempted
        operation: &'static str,
        /// Resource kind
        kind: String,
        /// Resource name or selector
        name: String,
        /// Underlying cluster error
        source: ClusterError,
    },

    /// The condition was not met before the deadline
    #[error("timed out after {timeout:?} waiting for {kind} {name}")]
    Timeout {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
        /// Configured wait duration
        timeout: Duration,
    },

    /// The server sent an error event on the watch
    #[error("watch on {kind} {name} failed: {status}")]
    WatchFailed {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
        /// Status sent by the server
        status: ServerStatus,
    },

    /// The watch ended before the condition was met
    #[error("watch on {kind} {name} closed before the condition was met")]
    StreamClosed {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
    },

    /// The rollout stopped progressing before it completed
    #[error("rollout {revision} of {kind} {name} failed: {message}")]
    RolloutFailed {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
        /// Revision that failed to roll out
        revision: i64,
        /// Reason reported by the controller
        message: String,
    },

    /// The resource was deleted while waiting on it
    #[error("{kind} {name} was deleted while waiting for it")]
    Deleted {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
    },
}

impl WorkloadError {
    /// Wraps a failed API call with the operation and resource it was for
    pub(crate) fn cluster(operation: &'static str, kind: &str, name: &str, source: ClusterError) -> Self {
        WorkloadError::Cluster {
            operation,
            kind: kind.to_string(),
            name: name.to_string(),
            source,
        }
    }

    /// Like [`WorkloadError::cluster`] for lookups: a missing resource becomes
    /// `NotFound` instead of a transport error
    pub(crate) fn lookup(kind: &str, name: &str, source: ClusterError) -> Self {
        if source.is_not_found() {
            WorkloadError::NotFound {
                kind: kind.to_string(),
                target: name.to_string(),
            }
        } else {
            Self::cluster("get", kind, name, source)
        }
    }

    /// Rejects an empty resource name before any network call
    pub(crate) fn require_name(kind: &str, name: &str) -> Result<(), Self> {
        if name.trim().is_empty() {
            return Err(WorkloadError::InvalidInput(format!("{kind} name is empty")));
        }
        Ok(())
    }

    /// The wait deadline passed without the condition being met
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkloadError::Timeout { .. })
    }

    /// Nothing matched the name or selector
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkloadError::NotFound { .. })
    }

    /// The caller passed invalid input
    pub fn is_usage(&self) -> bool {
        matches!(self, WorkloadError::InvalidInput(_))
    }
}
