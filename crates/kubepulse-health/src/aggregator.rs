//! Cluster state aggregation.
//!
//! Turns one node listing and one pod listing into a
//! `ClusterHealthSnapshot`. Holds no state between calls.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use kubepulse_core::*;

/// Reduces cluster status into health counts and publishes them.
#[derive(Clone)]
pub struct ClusterStateAggregator {
    sink: Arc<dyn MetricsSink>,
}

impl ClusterStateAggregator {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// Query nodes and pods and reduce them to a snapshot.
    ///
    /// Fails as a whole if either query fails; no partial snapshot is
    /// produced and nothing is published. On success the five count
    /// gauges are set before returning.
    pub async fn aggregate<S>(&self, source: &S) -> Result<ClusterHealthSnapshot, QueryError>
    where
        S: ClusterStatusSource + ?Sized,
    {
        let nodes = source.list_nodes().await?;
        let pods = source.list_pods().await?;

        let snapshot = summarize(&nodes, &pods, epoch_secs());
        debug!(
            nodes = snapshot.node_count,
            pods = snapshot.total_pods,
            "cluster status aggregated"
        );

        self.publish(&snapshot);
        Ok(snapshot)
    }

    fn publish(&self, snapshot: &ClusterHealthSnapshot) {
        self.sink.set_gauge(Gauge::NodeCount, snapshot.node_count as f64);
        self.sink.set_gauge(Gauge::NodeReady, snapshot.ready_node_count as f64);
        self.sink.set_gauge(Gauge::PodCount, snapshot.total_pods as f64);
        self.sink.set_gauge(Gauge::PodRunning, snapshot.running_pods as f64);
        self.sink.set_gauge(Gauge::PodFailed, snapshot.failed_pods as f64);
    }
}

/// Count ready nodes and running/failed pods.
///
/// A node counts as ready once, however many matching conditions it
/// reports. Pods in any phase other than `Running` or `Failed` count
/// toward `total_pods` only.
pub fn summarize(
    nodes: &[NodeStatus],
    pods: &[PodStatus],
    observed_at: u64,
) -> ClusterHealthSnapshot {
    let ready_node_count = nodes.iter().filter(|n| n.is_ready()).count();

    let mut running_pods = 0usize;
    let mut failed_pods = 0usize;
    for pod in pods {
        match pod.phase {
            PodPhase::Running => running_pods += 1,
            PodPhase::Failed => failed_pods += 1,
            _ => {}
        }
    }

    ClusterHealthSnapshot {
        node_count: saturate(nodes.len()),
        ready_node_count: saturate(ready_node_count),
        total_pods: saturate(pods.len()),
        running_pods: saturate(running_pods),
        failed_pods: saturate(failed_pods),
        observed_at,
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub(crate) fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
