//! kubepulse.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub cluster: ClusterConfig,
    pub health: HealthConfig,
    pub autoscale: AutoscaleConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Explicit kubeconfig path. Falls back to KUBECONFIG / ~/.kube/config.
    pub kubeconfig: Option<PathBuf>,
    /// Deadline for each list query (e.g., "10s").
    pub query_timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Aggregation interval (e.g., "30s").
    pub interval: String,
    /// Upper bound for the wait after repeated failures (e.g., "5m").
    pub max_backoff: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscaleConfig {
    /// Decision interval (e.g., "20s").
    pub interval: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub initial_replicas: u32,
    /// Scale up when load is strictly above this percentage.
    pub scale_up_above: f64,
    /// Scale down when load is strictly below this percentage.
    pub scale_down_below: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Port for the /metrics endpoint.
    pub port: u16,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            query_timeout: "10s".to_string(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: "30s".to_string(),
            max_backoff: "5m".to_string(),
        }
    }
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            interval: "20s".to_string(),
            min_replicas: 2,
            max_replicas: 10,
            initial_replicas: 3,
            scale_up_above: 75.0,
            scale_down_below: 35.0,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 2112 }
    }
}

impl ClusterConfig {
    pub fn query_timeout(&self) -> Duration {
        parse_duration(&self.query_timeout).unwrap_or(Duration::from_secs(10))
    }
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        parse_duration(&self.interval).unwrap_or(Duration::from_secs(30))
    }

    pub fn max_backoff(&self) -> Duration {
        parse_duration(&self.max_backoff).unwrap_or(Duration::from_secs(300))
    }
}

impl AutoscaleConfig {
    pub fn interval(&self) -> Duration {
        parse_duration(&self.interval).unwrap_or(Duration::from_secs(20))
    }
}

impl PulseConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PulseConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds, thresholds, and durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("cluster.query_timeout", &self.cluster.query_timeout),
            ("health.interval", &self.health.interval),
            ("health.max_backoff", &self.health.max_backoff),
            ("autoscale.interval", &self.autoscale.interval),
        ];
        for (field, value) in durations {
            match parse_duration(value) {
                Some(d) if !d.is_zero() => {}
                _ => {
                    return Err(ConfigError::Duration {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }

        let a = &self.autoscale;
        if a.min_replicas > a.max_replicas {
            return Err(ConfigError::Invalid(format!(
                "autoscale.min_replicas ({}) exceeds max_replicas ({})",
                a.min_replicas, a.max_replicas
            )));
        }
        if !(a.min_replicas..=a.max_replicas).contains(&a.initial_replicas) {
            return Err(ConfigError::Invalid(format!(
                "autoscale.initial_replicas ({}) outside [{}, {}]",
                a.initial_replicas, a.min_replicas, a.max_replicas
            )));
        }
        for (field, value) in [
            ("scale_up_above", a.scale_up_above),
            ("scale_down_below", a.scale_down_below),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "autoscale.{field} ({value}) outside [0, 100]"
                )));
            }
        }
        if a.scale_down_below >= a.scale_up_above {
            return Err(ConfigError::Invalid(format!(
                "autoscale.scale_down_below ({}) must be below scale_up_above ({})",
                a.scale_down_below, a.scale_up_above
            )));
        }

        if self.health.max_backoff() < self.health.interval() {
            return Err(ConfigError::Invalid(
                "health.max_backoff is shorter than health.interval".to_string(),
            ));
        }

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Parse a duration string like "5s", "500ms", "2m", or a bare number of
/// seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_reference_values() {
        let config = PulseConfig::default();
        assert_eq!(config.autoscale.min_replicas, 2);
        assert_eq!(config.autoscale.max_replicas, 10);
        assert_eq!(config.autoscale.initial_replicas, 3);
        assert_eq!(config.autoscale.interval(), Duration::from_secs(20));
        assert_eq!(config.health.interval(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_file_fills_defaults() {
        let toml_str = r#"
[autoscale]
max_replicas = 20

[metrics]
port = 9100
"#;
        let config: PulseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.autoscale.max_replicas, 20);
        assert_eq!(config.autoscale.min_replicas, 2);
        assert_eq!(config.metrics.port, 9100);
        assert_eq!(config.cluster.query_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cluster]\nkubeconfig = \"/tmp/kube\"\nquery_timeout = \"500ms\"\n"
        )
        .unwrap();

        let config = PulseConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cluster.kubeconfig, Some(PathBuf::from("/tmp/kube")));
        assert_eq!(config.cluster.query_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let err = PulseConfig::from_file(Path::new("/nonexistent/kubepulse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn from_file_rejects_invalid_bounds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[autoscale]\nmin_replicas = 5\nmax_replicas = 3\n").unwrap();

        let err = PulseConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_initial_outside_bounds() {
        let mut config = PulseConfig::default();
        config.autoscale.initial_replicas = 11;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_band() {
        let mut config = PulseConfig::default();
        config.autoscale.scale_down_below = 80.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.autoscale.scale_down_below = 75.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let mut config = PulseConfig::default();
        config.autoscale.scale_up_above = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_and_zero_durations() {
        let mut config = PulseConfig::default();
        config.health.interval = "soon".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Duration { field: "health.interval", .. })
        ));

        let mut config = PulseConfig::default();
        config.autoscale.interval = "0s".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Duration { field: "autoscale.interval", .. })
        ));
    }

    #[test]
    fn rejects_backoff_shorter_than_interval() {
        let mut config = PulseConfig::default();
        config.health.max_backoff = "10s".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = PulseConfig::default();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[autoscale]"));
        let parsed: PulseConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.autoscale.max_replicas, 10);
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("later"), None);
    }

    #[test]
    fn minutes_overflow_is_a_duration_error() {
        assert_eq!(parse_duration("307445734561825861m"), None);

        let mut config = PulseConfig::default();
        config.health.max_backoff = "307445734561825861m".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Duration { field: "health.max_backoff", .. })
        ));
    }
}
