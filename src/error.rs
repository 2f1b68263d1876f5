//! Error types for PVC and VolumeSnapshot resolution
//!
//! Errors carry the identifiers of the resources involved (namespace, name,
//! provisioner) so a failed backup item action can be diagnosed from the log
//! line alone.

use std::time::Duration;

use thiserror::Error;

/// Main error type for resolver operations
#[derive(Debug, Error)]
pub enum Error {
    /// The PVC cannot be resolved to a PersistentVolume
    #[error("PVC {namespace}/{name} is not bound: {reason}")]
    NotBound {
        /// Namespace of the claim
        namespace: String,
        /// Name of the claim
        name: String,
        /// Why the claim is considered unbound
        reason: String,
    },

    /// A get or list against the API server failed
    #[error("failed to get {resource}: {source}")]
    LookupFailed {
        /// Human readable description of what was looked up
        resource: String,
        /// The underlying kube-rs error
        source: kube::Error,
    },

    /// A search over listed resources found no match
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Kind of resource searched for
        kind: String,
        /// The search key that had no match
        key: String,
    },

    /// Kubernetes API error surfaced without additional context
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Waiting for a VolumeSnapshot to bind its content exceeded the configured bound
    #[error("timed out after {waited:?} waiting for VolumeSnapshot {namespace}/{name} to bind content")]
    Timeout {
        /// Namespace of the VolumeSnapshot
        namespace: String,
        /// Name of the VolumeSnapshot
        name: String,
        /// Total time spent waiting
        waited: Duration,
    },

    /// Waiting for a VolumeSnapshot was cancelled by the caller
    #[error("cancelled while waiting for VolumeSnapshot {namespace}/{name}")]
    Cancelled {
        /// Namespace of the VolumeSnapshot
        namespace: String,
        /// Name of the VolumeSnapshot
        name: String,
    },

    /// Kubernetes client could not be constructed
    #[error("client error [{context}]: {message}")]
    Client {
        /// Stage of client construction that failed (e.g., "kubeconfig", "infer")
        context: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a NotBound error for a claim
    pub fn not_bound(
        namespace: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::NotBound {
            namespace: namespace.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an API error with a description of the resource being looked up
    pub fn lookup(resource: impl Into<String>, source: kube::Error) -> Self {
        Self::LookupFailed {
            resource: resource.into(),
            source,
        }
    }

    /// Create a NotFound error for an exhausted search
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a client construction error
    pub fn client(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Precondition and search failures need the cluster state to change first,
    /// so they are never retryable. API errors are retryable unless the server
    /// answered with a 4xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NotBound { .. } => false,
            Error::NotFound { .. } => false,
            Error::LookupFailed { source, .. } | Error::Kube { source } => {
                !matches!(source, kube::Error::Api(ae) if (400..500).contains(&ae.code))
            }
            Error::Timeout { .. } => true,
            Error::Cancelled { .. } => false,
            Error::Client { .. } => false,
        }
    }

    /// Whether the underlying API call answered 404
    pub fn is_api_not_found(&self) -> bool {
        match self {
            Error::LookupFailed { source, .. } | Error::Kube { source } => {
                matches!(source, kube::Error::Api(ae) if ae.code == 404)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
pub(crate) fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} ({})", reason, code),
        reason: reason.to_string(),
        code,
    })
}
