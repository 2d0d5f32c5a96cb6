//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the cluster API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Transport, auth or server-side failure reported by `kube`
    #[error("Kubernetes error: {0}")]
    Kube(#[source] kube::Error),

    /// Server rejected the request with a status
    #[error("Cluster API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Server-provided message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g. malformed selector, missing fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClusterError {
    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            ClusterError::NotFound(_) => true,
            ClusterError::Api { code, .. } => *code == 404,
            _ => false,
        }
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref status) if status.code == 404 => {
                ClusterError::NotFound(status.message.clone())
            }
            other => ClusterError::Kube(other),
        }
    }
}
