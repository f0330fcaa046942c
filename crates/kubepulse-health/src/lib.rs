//! kubepulse-health — cluster state aggregation for kubepulse.
//!
//! Reduces the node and pod lists of a `ClusterStatusSource` into a
//! counts-only `ClusterHealthSnapshot`, publishes the counts as gauges,
//! and runs the periodic health loop.
//!
//! # Architecture
//!
//! ```text
//! HealthMonitor (background task)
//!   ├── ClusterStateAggregator
//!   │   ├── list_nodes() + list_pods() → ClusterHealthSnapshot
//!   │   └── five gauges → MetricsSink
//!   ├── FailureTracker (consecutive failures, backoff)
//!   └── HealthHandle (last good snapshot, shared with the API)
//! ```
//!
//! # Failure handling
//!
//! A failed node or pod query voids the whole cycle. The last good
//! snapshot stays published, marked stale, and the next attempt is
//! delayed with exponential backoff (interval → `max_backoff`). A single
//! successful cycle resets the backoff.

pub mod aggregator;
pub mod monitor;
pub mod tracker;

pub use aggregator::{ClusterStateAggregator, summarize};
pub use monitor::{HealthHandle, HealthMonitor, HealthView};
pub use tracker::FailureTracker;
