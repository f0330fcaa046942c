//! Autoscale decision engine — bounded replica counter with hysteresis.
//!
//! `ScalingPolicy::decide` is a pure function of `(load, current_replicas)`.
//! `AutoscaleEngine` wraps it around the owned `AutoscalerState`, taking the
//! state lock for the whole read-decide-write of each tick.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use kubepulse_core::config::AutoscaleConfig;
use kubepulse_core::*;

/// Inclusive replica bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplicaBounds {
    pub min: u32,
    pub max: u32,
}

impl ReplicaBounds {
    pub fn clamp(&self, replicas: u32) -> u32 {
        replicas.clamp(self.min, self.max)
    }

    pub fn contains(&self, replicas: u32) -> bool {
        (self.min..=self.max).contains(&replicas)
    }
}

/// Outcome of evaluating one load sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDecision {
    /// Add one replica.
    ScaleUp,
    /// Remove one replica.
    ScaleDown,
    /// Leave the counter alone.
    NoOp,
}

impl ScaleDecision {
    /// Replica count after applying this decision to `current`.
    pub fn apply(self, current: u32) -> u32 {
        match self {
            ScaleDecision::ScaleUp => current.saturating_add(1),
            ScaleDecision::ScaleDown => current.saturating_sub(1),
            ScaleDecision::NoOp => current,
        }
    }
}

/// Thresholds and bounds for the hysteresis policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalingPolicy {
    pub bounds: ReplicaBounds,
    /// Scale up when load is strictly above this.
    pub scale_up_above: f64,
    /// Scale down when load is strictly below this.
    pub scale_down_below: f64,
}

impl ScalingPolicy {
    pub fn new(
        bounds: ReplicaBounds,
        scale_up_above: f64,
        scale_down_below: f64,
    ) -> Result<Self, ConfigError> {
        if bounds.min > bounds.max {
            return Err(ConfigError::Invalid(format!(
                "min replicas ({}) exceeds max ({})",
                bounds.min, bounds.max
            )));
        }
        if !(0.0..=100.0).contains(&scale_down_below)
            || !(0.0..=100.0).contains(&scale_up_above)
            || scale_down_below >= scale_up_above
        {
            return Err(ConfigError::Invalid(format!(
                "hysteresis band [{scale_down_below}, {scale_up_above}] is not a range within [0, 100]"
            )));
        }
        Ok(Self {
            bounds,
            scale_up_above,
            scale_down_below,
        })
    }

    pub fn from_config(config: &AutoscaleConfig) -> Result<Self, ConfigError> {
        Self::new(
            ReplicaBounds {
                min: config.min_replicas,
                max: config.max_replicas,
            },
            config.scale_up_above,
            config.scale_down_below,
        )
    }

    /// Decide how to move the counter for one load sample.
    ///
    /// Scale-up takes precedence over scale-down; only one fires. Loads
    /// inside the band, or a counter already at the bound in the indicated
    /// direction, yield `NoOp`.
    pub fn decide(&self, load: f64, current: u32) -> ScaleDecision {
        if load > self.scale_up_above && current < self.bounds.max {
            ScaleDecision::ScaleUp
        } else if load < self.scale_down_below && current > self.bounds.min {
            ScaleDecision::ScaleDown
        } else {
            ScaleDecision::NoOp
        }
    }
}

impl Default for ScalingPolicy {
    /// 2–10 replicas, band 35–75%.
    fn default() -> Self {
        Self {
            bounds: ReplicaBounds { min: 2, max: 10 },
            scale_up_above: 75.0,
            scale_down_below: 35.0,
        }
    }
}

/// Result of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionResult {
    /// Position of this tick in the serial order the lock imposed.
    pub sequence: u64,
    /// Sampled load, or `None` if sampling failed.
    pub load: Option<f64>,
    pub decision: ScaleDecision,
    pub replicas_before: u32,
    pub replicas_after: u32,
}

/// Mutable autoscaler state. Only reachable through the engine's lock.
#[derive(Debug)]
pub struct AutoscalerState {
    current_replicas: u32,
    ticks: u64,
    last: Option<DecisionResult>,
}

impl AutoscalerState {
    /// Start at `initial`, pulled into `bounds` if outside.
    pub fn new(initial: u32, bounds: ReplicaBounds) -> Self {
        let current_replicas = bounds.clamp(initial);
        if current_replicas != initial {
            warn!(
                initial,
                clamped = current_replicas,
                "initial replica count outside bounds, clamped"
            );
        }
        Self {
            current_replicas,
            ticks: 0,
            last: None,
        }
    }

    pub fn current_replicas(&self) -> u32 {
        self.current_replicas
    }
}

/// Point-in-time view of the engine for reporting.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AutoscalerStatus {
    pub current_replicas: u32,
    pub policy: ScalingPolicy,
    pub ticks: u64,
    pub last: Option<DecisionResult>,
}

/// Applies the scaling policy to the replica counter once per tick.
///
/// Share it as `Arc<AutoscaleEngine>`; concurrent `tick` calls serialize on
/// the state lock.
pub struct AutoscaleEngine {
    policy: ScalingPolicy,
    state: Mutex<AutoscalerState>,
    sink: Arc<dyn MetricsSink>,
}

impl AutoscaleEngine {
    pub fn new(
        policy: ScalingPolicy,
        mut state: AutoscalerState,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        state.current_replicas = policy.bounds.clamp(state.current_replicas);
        Self {
            policy,
            state: Mutex::new(state),
            sink,
        }
    }

    pub fn from_config(
        config: &AutoscaleConfig,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self, ConfigError> {
        let policy = ScalingPolicy::from_config(config)?;
        let state = AutoscalerState::new(config.initial_replicas, policy.bounds);
        Ok(Self::new(policy, state, sink))
    }

    pub fn policy(&self) -> &ScalingPolicy {
        &self.policy
    }

    pub async fn current_replicas(&self) -> u32 {
        self.state.lock().await.current_replicas
    }

    pub async fn status(&self) -> AutoscalerStatus {
        let state = self.state.lock().await;
        AutoscalerStatus {
            current_replicas: state.current_replicas,
            policy: self.policy,
            ticks: state.ticks,
            last: state.last,
        }
    }

    /// Sample load and apply one scaling decision.
    ///
    /// The sample, the decision and the write all happen while the state
    /// lock is held. A failed or out-of-range sample is a `NoOp`; the
    /// replica gauge is still refreshed, the load gauge is not.
    pub async fn tick<S>(&self, sampler: &S) -> DecisionResult
    where
        S: LoadSampler + ?Sized,
    {
        let mut state = self.state.lock().await;
        let before = state.current_replicas;

        let load = match sampler.sample().and_then(validate_load) {
            Ok(load) => Some(load),
            Err(e) => {
                warn!(error = %e, replicas = before, "load sample failed, skipping decision");
                None
            }
        };

        let decision = match load {
            Some(load) => self.policy.decide(load, before),
            None => ScaleDecision::NoOp,
        };
        let after = decision.apply(before);
        debug_assert!(self.policy.bounds.contains(after));
        state.current_replicas = after;
        state.ticks += 1;

        let result = DecisionResult {
            sequence: state.ticks,
            load,
            decision,
            replicas_before: before,
            replicas_after: after,
        };
        state.last = Some(result);

        match decision {
            ScaleDecision::ScaleUp => {
                info!(replicas = after, load = load.unwrap_or_default(), "scale-up triggered");
            }
            ScaleDecision::ScaleDown => {
                info!(replicas = after, load = load.unwrap_or_default(), "scale-down triggered");
            }
            ScaleDecision::NoOp => {
                debug!(replicas = after, ?load, "no scaling change");
            }
        }

        if let Some(load) = load {
            self.sink.set_gauge(Gauge::CpuUtilization, load);
        }
        self.sink.set_gauge(Gauge::DesiredReplicas, after as f64);

        result
    }

    /// Run the autoscaler loop until the shutdown signal fires.
    pub async fn run(
        &self,
        sampler: Arc<dyn LoadSampler>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let replicas = self.current_replicas().await;
        info!(
            interval_secs = interval.as_secs(),
            replicas,
            min = self.policy.bounds.min,
            max = self.policy.bounds.max,
            "autoscaler started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.tick(sampler.as_ref()).await;
                }
                _ = shutdown.changed() => {
                    info!("autoscaler shutting down");
                    break;
                }
            }
        }
    }
}

fn validate_load(load: f64) -> Result<f64, SampleError> {
    if (0.0..=100.0).contains(&load) {
        Ok(load)
    } else {
        Err(SampleError::OutOfRange(load))
    }
}
