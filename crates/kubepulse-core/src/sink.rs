//! Gauge sink the control loops publish to.

/// The gauges kubepulse exposes. Each is set, never incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gauge {
    NodeCount,
    NodeReady,
    PodCount,
    PodRunning,
    PodFailed,
    CpuUtilization,
    DesiredReplicas,
}

impl Gauge {
    /// Every gauge, in exposition order.
    pub const ALL: [Gauge; 7] = [
        Gauge::NodeCount,
        Gauge::NodeReady,
        Gauge::PodCount,
        Gauge::PodRunning,
        Gauge::PodFailed,
        Gauge::CpuUtilization,
        Gauge::DesiredReplicas,
    ];

    /// Prometheus metric name.
    pub fn name(&self) -> &'static str {
        match self {
            Gauge::NodeCount => "kubepulse_node_count",
            Gauge::NodeReady => "kubepulse_node_ready_total",
            Gauge::PodCount => "kubepulse_pod_count",
            Gauge::PodRunning => "kubepulse_pod_running_total",
            Gauge::PodFailed => "kubepulse_pod_failed_total",
            Gauge::CpuUtilization => "kubepulse_cpu_utilization_percent",
            Gauge::DesiredReplicas => "kubepulse_desired_replicas_total",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Gauge::NodeCount => "Number of nodes in the cluster.",
            Gauge::NodeReady => "Number of ready nodes.",
            Gauge::PodCount => "Number of pods across all namespaces.",
            Gauge::PodRunning => "Number of running pods across all namespaces.",
            Gauge::PodFailed => "Number of failed pods across all namespaces.",
            Gauge::CpuUtilization => "Sampled cluster CPU utilization percentage (0-100).",
            Gauge::DesiredReplicas => "Desired replica count decided by the autoscaler.",
        }
    }

    /// Position in `Gauge::ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Receives gauge values. Writes are fire-and-forget.
pub trait MetricsSink: Send + Sync {
    fn set_gauge(&self, gauge: Gauge, value: f64);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn set_gauge(&self, _gauge: Gauge, _value: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, g) in Gauge::ALL.iter().enumerate() {
            assert_eq!(g.index(), i);
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Gauge::ALL.iter().map(|g| g.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Gauge::ALL.len());
    }
}
