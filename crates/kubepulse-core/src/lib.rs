//! kubepulse-core — shared vocabulary for the kubepulse control loops.
//!
//! Holds the domain types produced by the cluster health aggregator, the
//! collaborator traits the core consumes (`ClusterStatusSource`,
//! `LoadSampler`) and exposes to (`MetricsSink`), the error taxonomy, and
//! the `kubepulse.toml` configuration.

pub mod config;
pub mod error;
pub mod sink;
pub mod source;
pub mod types;

pub use config::PulseConfig;
pub use error::{ConfigError, QueryError, Resource, SampleError};
pub use sink::{Gauge, MetricsSink, NoopSink};
pub use source::{ClusterStatusSource, LoadSampler};
pub use types::*;
