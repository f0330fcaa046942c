//! Prometheus text exposition format.
//!
//! Renders gauge readings into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use kubepulse_core::Gauge;

use crate::registry::GaugeReading;

/// Render gauge readings into Prometheus text format.
///
/// Every known gauge gets its HELP and TYPE lines; a sample line is only
/// written for gauges present in `readings`.
pub fn render_prometheus(readings: &[GaugeReading]) -> String {
    let mut out = String::new();

    for gauge in Gauge::ALL {
        out.push_str(&format!("# HELP {} {}\n", gauge.name(), gauge.help()));
        out.push_str(&format!("# TYPE {} gauge\n", gauge.name()));
        for r in readings.iter().filter(|r| r.gauge == gauge) {
            out.push_str(&format!("{} {}\n", gauge.name(), format_value(gauge, r.value)));
        }
    }

    out
}

fn format_value(gauge: Gauge, value: f64) -> String {
    match gauge {
        Gauge::CpuUtilization => format!("{value:.2}"),
        _ => format!("{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(gauge: Gauge, value: f64) -> GaugeReading {
        GaugeReading { gauge, value }
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&[]);
        // Should still have type declarations.
        assert!(output.contains("# HELP kubepulse_node_ready_total"));
        assert!(output.contains("# TYPE kubepulse_desired_replicas_total gauge"));
        assert!(output.lines().all(|l| l.starts_with('#')));
    }

    #[test]
    fn render_health_and_autoscale_gauges() {
        let output = render_prometheus(&[
            reading(Gauge::NodeCount, 4.0),
            reading(Gauge::NodeReady, 3.0),
            reading(Gauge::PodCount, 10.0),
            reading(Gauge::PodRunning, 6.0),
            reading(Gauge::PodFailed, 2.0),
            reading(Gauge::CpuUtilization, 81.456),
            reading(Gauge::DesiredReplicas, 4.0),
        ]);

        assert!(output.contains("kubepulse_node_count 4\n"));
        assert!(output.contains("kubepulse_node_ready_total 3\n"));
        assert!(output.contains("kubepulse_pod_count 10\n"));
        assert!(output.contains("kubepulse_pod_running_total 6\n"));
        assert!(output.contains("kubepulse_pod_failed_total 2\n"));
        assert!(output.contains("kubepulse_cpu_utilization_percent 81.46\n"));
        assert!(output.contains("kubepulse_desired_replicas_total 4\n"));
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&[reading(Gauge::PodFailed, 0.0)]);

        // Every non-comment line should be: metric_name value
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<_> = line.split(' ').collect();
            assert_eq!(parts.len(), 2, "unexpected line: {line}");
            assert!(parts[1].parse::<f64>().is_ok(), "bad value: {line}");
        }
    }
}
