//! kubepulse-metrics — observability for the kubepulse control loops.
//!
//! Holds the latest value of every kubepulse gauge and renders them in
//! the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! GaugeRegistry (impl MetricsSink)
//!   ├── set_gauge() ← health monitor, autoscaler
//!   └── readings()  → render_prometheus() → /metrics
//! ```

pub mod prometheus;
pub mod registry;

pub use prometheus::render_prometheus;
pub use registry::{GaugeReading, GaugeRegistry};
