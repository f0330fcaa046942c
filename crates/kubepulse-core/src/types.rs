//! Domain types for cluster status and health snapshots.
//!
//! `NodeStatus` and `PodStatus` are the source-agnostic view a
//! `ClusterStatusSource` hands to the aggregator. `ClusterHealthSnapshot`
//! is the reduced, counts-only result of one aggregation cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Condition kind that marks a node as schedulable.
pub const READY_CONDITION: &str = "Ready";

/// Condition status value for a satisfied condition.
pub const CONDITION_TRUE: &str = "True";

// ── Node ──────────────────────────────────────────────────────────

/// A single status condition reported by a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeCondition {
    /// Condition kind, e.g. "Ready", "MemoryPressure".
    pub kind: String,
    /// Condition status: "True", "False" or "Unknown".
    pub status: String,
}

impl NodeCondition {
    pub fn new(kind: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            status: status.into(),
        }
    }
}

/// Status of a cluster node as seen by a status source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub name: String,
    pub conditions: Vec<NodeCondition>,
}

impl NodeStatus {
    pub fn new(name: impl Into<String>, conditions: Vec<NodeCondition>) -> Self {
        Self {
            name: name.into(),
            conditions,
        }
    }

    /// A node is ready iff it carries a `Ready` condition whose status is
    /// exactly `True`. Any other status, or no such condition, is not-ready.
    pub fn is_ready(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.kind == READY_CONDITION && c.status == CONDITION_TRUE)
    }
}

// ── Pod ───────────────────────────────────────────────────────────

/// Lifecycle phase of a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Map a phase string to a `PodPhase`. Unrecognised values are `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single pod.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodStatus {
    pub namespace: String,
    pub name: String,
    pub phase: PodPhase,
}

impl PodStatus {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, phase: PodPhase) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            phase,
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────────

/// Point-in-time health counts for the whole cluster.
///
/// Built fresh on every aggregation cycle. The sub-counts never exceed
/// their totals: `ready_node_count <= node_count`,
/// `running_pods + failed_pods <= total_pods`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClusterHealthSnapshot {
    pub node_count: u32,
    pub ready_node_count: u32,
    pub total_pods: u32,
    pub running_pods: u32,
    pub failed_pods: u32,
    /// Unix timestamp (seconds) when the snapshot was taken.
    pub observed_at: u64,
}

impl ClusterHealthSnapshot {
    /// Pods in any phase other than `Running` or `Failed`.
    pub fn other_pods(&self) -> u32 {
        self.total_pods
            .saturating_sub(self.running_pods)
            .saturating_sub(self.failed_pods)
    }

    /// Whether every node reports ready.
    pub fn all_nodes_ready(&self) -> bool {
        self.ready_node_count == self.node_count
    }
}
