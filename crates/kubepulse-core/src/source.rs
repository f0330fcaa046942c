//! Collaborator traits the control loops consume.

use async_trait::async_trait;

use crate::error::{QueryError, SampleError};
use crate::types::{NodeStatus, PodStatus};

/// Read-only view of the cluster's nodes and pods.
///
/// Implementations own their deadline policy: a slow backend must fail
/// with `QueryError::Timeout` rather than block the caller indefinitely.
#[async_trait]
pub trait ClusterStatusSource: Send + Sync {
    /// List every node in the cluster.
    async fn list_nodes(&self) -> Result<Vec<NodeStatus>, QueryError>;

    /// List every pod across all namespaces.
    async fn list_pods(&self) -> Result<Vec<PodStatus>, QueryError>;
}

/// Source of the load percentage the autoscaler acts on.
pub trait LoadSampler: Send + Sync {
    /// Sample the current load on a 0–100 scale.
    fn sample(&self) -> Result<f64, SampleError>;
}
