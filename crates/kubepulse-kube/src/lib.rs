//! kubepulse-kube — `ClusterStatusSource` for a live Kubernetes cluster.
//!
//! Lists nodes (cluster-scoped) and pods across all namespaces through the
//! API server, bounding every request with a timeout, and converts the
//! `k8s-openapi` objects into kubepulse's source-agnostic status types.

pub mod convert;
pub mod source;

pub use convert::{node_status, pod_status};
pub use source::KubeStatusSource;
