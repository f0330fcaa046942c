//! Error types for the kubepulse core.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Which cluster resource a query was listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Nodes,
    Pods,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Nodes => f.write_str("nodes"),
            Resource::Pods => f.write_str("pods"),
        }
    }
}

/// A cluster status query failed. The whole aggregation cycle is void.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("listing {resource} timed out after {timeout:?}")]
    Timeout { resource: Resource, timeout: Duration },

    #[error("listing {resource} failed: {message}")]
    Api { resource: Resource, message: String },

    #[error("malformed {resource} response: {message}")]
    Malformed { resource: Resource, message: String },
}

impl QueryError {
    /// The resource whose query failed.
    pub fn resource(&self) -> Resource {
        match self {
            QueryError::Timeout { resource, .. }
            | QueryError::Api { resource, .. }
            | QueryError::Malformed { resource, .. } => *resource,
        }
    }
}

/// A load sample could not be taken. The autoscaler skips the tick.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SampleError {
    #[error("load sample unavailable: {0}")]
    Unavailable(String),

    #[error("load sample {0} outside [0, 100]")]
    OutOfRange(f64),
}

/// Errors loading or validating `kubepulse.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {field}: {value:?}")]
    Duration { field: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}
