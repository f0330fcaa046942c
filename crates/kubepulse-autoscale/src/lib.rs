//! kubepulse-autoscale — simulated replica scaling from sampled load.
//!
//! Owns a bounded replica counter. Every tick samples a load percentage
//! from a `LoadSampler`, applies the hysteresis policy, and publishes the
//! load and the resulting replica count.
//!
//! # Scaling Algorithm
//!
//! ```text
//! load     = sampler.sample()          // 0..=100
//! replicas = state.current_replicas    // min..=max
//!
//! if load > scale_up_above and replicas < max:
//!     replicas += 1                    // ScaleUp
//! elif load < scale_down_below and replicas > min:
//!     replicas -= 1                    // ScaleDown
//! else:
//!     NoOp
//! ```
//!
//! The band `[scale_down_below, scale_up_above]` (35–75 by default) keeps
//! a load hovering near one threshold from flipping the counter on every
//! tick. Read, decide and write happen under one lock, so concurrent ticks
//! serialize without lost updates.

pub mod sampler;
pub mod scaler;

pub use sampler::{RandomLoadSampler, ScriptedSampler};
pub use scaler::{
    AutoscaleEngine, AutoscalerState, AutoscalerStatus, DecisionResult, ReplicaBounds,
    ScaleDecision, ScalingPolicy,
};
