//! Change events delivered by a watch
//!
//! `kube` reports bookmarks and server errors in the same enum as object
//! changes. Bookmarks only matter for resuming a stream, so they are dropped
//! before events reach callers.

/// One change to a watched resource, in server order.
///
/// Every object snapshot carries the `metadata.resourceVersion` at which the
/// change happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<K> {
    /// The resource appeared (or existed when the watch started)
    Added(K),
    /// The resource changed
    Modified(K),
    /// The resource was removed; the snapshot is its last known state
    Deleted(K),
    /// The server reported an error inside the stream
    Error(ServerStatus),
}

impl<K> ChangeEvent<K> {
    /// Event type as the API server names it
    pub fn type_name(&self) -> &'static str {
        match self {
            ChangeEvent::Added(_) => "ADDED",
            ChangeEvent::Modified(_) => "MODIFIED",
            ChangeEvent::Deleted(_) => "DELETED",
            ChangeEvent::Error(_) => "ERROR",
        }
    }

    /// The object snapshot, if this event carries one
    pub fn object(&self) -> Option<&K> {
        match self {
            ChangeEvent::Added(obj) | ChangeEvent::Modified(obj) | ChangeEvent::Deleted(obj) => {
                Some(obj)
            }
            ChangeEvent::Error(_) => None,
        }
    }
}

/// Status object sent by the server in an `ERROR` watch event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    /// HTTP-style status code (410 when the resource version is too old)
    pub code: u16,
    /// Machine-readable reason, e.g. `Expired`
    pub reason: String,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.reason, self.code, self.message)
    }
}
