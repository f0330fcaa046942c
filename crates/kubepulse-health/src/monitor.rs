//! Health monitor — background task that aggregates cluster status on a
//! fixed cadence.
//!
//! Each cycle queries the `ClusterStatusSource`, publishes the counts, and
//! records the outcome in a `HealthView` that other tasks (the API) read
//! through a `HealthHandle`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use kubepulse_core::*;

use crate::aggregator::{ClusterStateAggregator, epoch_secs};
use crate::tracker::FailureTracker;

/// What the health loop currently knows about the cluster.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HealthView {
    /// Last successfully aggregated snapshot.
    pub last: Option<ClusterHealthSnapshot>,
    /// True when the most recent cycle failed and `last` is left over
    /// from an earlier one.
    pub stale: bool,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    /// Unix timestamp of the most recent attempt, successful or not.
    pub last_attempt_at: Option<u64>,
}

/// Cheap, cloneable read handle to the monitor's `HealthView`.
#[derive(Clone, Default)]
pub struct HealthHandle {
    view: Arc<RwLock<HealthView>>,
}

impl HealthHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current view.
    pub async fn view(&self) -> HealthView {
        self.view.read().await.clone()
    }
}

/// Runs the cluster health loop.
pub struct HealthMonitor {
    source: Arc<dyn ClusterStatusSource>,
    aggregator: ClusterStateAggregator,
    tracker: FailureTracker,
    handle: HealthHandle,
}

impl HealthMonitor {
    /// Create a monitor polling `source` every `interval`, backing off to at
    /// most `max_backoff` while the source keeps failing.
    pub fn new(
        source: Arc<dyn ClusterStatusSource>,
        sink: Arc<dyn MetricsSink>,
        interval: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self {
            source,
            aggregator: ClusterStateAggregator::new(sink),
            tracker: FailureTracker::new(interval, max_backoff),
            handle: HealthHandle::new(),
        }
    }

    /// Read handle for the published `HealthView`.
    pub fn handle(&self) -> HealthHandle {
        self.handle.clone()
    }

    /// Wait before the next cycle, including any backoff.
    pub fn next_interval(&self) -> Duration {
        self.tracker.next_interval()
    }

    /// Run a single aggregation cycle and publish its outcome.
    ///
    /// On failure the previous snapshot is kept and marked stale.
    pub async fn run_once(&mut self) -> Result<ClusterHealthSnapshot, QueryError> {
        let result = self.aggregator.aggregate(self.source.as_ref()).await;
        let now = epoch_secs();

        match &result {
            Ok(snapshot) => {
                self.tracker.record_success();
                info!(
                    ready_nodes = snapshot.ready_node_count,
                    nodes = snapshot.node_count,
                    running_pods = snapshot.running_pods,
                    total_pods = snapshot.total_pods,
                    failed_pods = snapshot.failed_pods,
                    "cluster health"
                );

                let mut view = self.handle.view.write().await;
                view.last = Some(*snapshot);
                view.stale = false;
                view.consecutive_failures = 0;
                view.last_error = None;
                view.last_attempt_at = Some(now);
            }
            Err(e) => {
                self.tracker.record_failure();
                warn!(
                    error = %e,
                    failures = self.tracker.consecutive_failures(),
                    retry_in_secs = self.tracker.next_interval().as_secs(),
                    "cluster health check failed"
                );

                let mut view = self.handle.view.write().await;
                view.stale = view.last.is_some();
                view.consecutive_failures = self.tracker.consecutive_failures();
                view.last_error = Some(e.to_string());
                view.last_attempt_at = Some(now);
            }
        }

        result
    }

    /// Run the health loop until the shutdown signal fires.
    ///
    /// The first cycle runs immediately; later cycles wait for the tracker's
    /// interval. A failed cycle never ends the loop.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.tracker.next_interval().as_secs(),
            "health monitor started"
        );

        let mut wait = Duration::ZERO;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    // Errors are logged and recorded in the view by run_once.
                    let _ = self.run_once().await;
                    wait = self.tracker.next_interval();
                }
                _ = shutdown.changed() => {
                    info!("health monitor shutting down");
                    break;
                }
            }
        }
        debug!("health loop exited");
    }
}
