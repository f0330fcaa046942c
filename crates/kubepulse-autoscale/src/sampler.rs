//! Load samplers.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

use kubepulse_core::{LoadSampler, SampleError};

/// Synthetic CPU load drawn uniformly from `[low, high)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomLoadSampler {
    low: f64,
    high: f64,
}

impl RandomLoadSampler {
    /// Sampler over `[low, high)`, clamped to the 0–100 scale. A NaN bound
    /// falls back to the edge of the scale.
    pub fn new(low: f64, high: f64) -> Self {
        let low = if low.is_nan() { 0.0 } else { low };
        let high = if high.is_nan() { 100.0 } else { high };
        let low = low.clamp(0.0, 100.0);
        let high = high.clamp(low, 100.0);
        Self { low, high }
    }
}

impl Default for RandomLoadSampler {
    /// 20–100%, the range of the simulated cluster.
    fn default() -> Self {
        Self::new(20.0, 100.0)
    }
}

impl LoadSampler for RandomLoadSampler {
    fn sample(&self) -> Result<f64, SampleError> {
        if self.low >= self.high {
            return Ok(self.low);
        }
        Ok(rand::thread_rng().gen_range(self.low..self.high))
    }
}

/// Replays a fixed sequence of samples, then repeats the last one.
///
/// Deterministic stand-in for a real metric source.
pub struct ScriptedSampler {
    samples: Mutex<VecDeque<Result<f64, SampleError>>>,
}

impl ScriptedSampler {
    pub fn new(samples: impl IntoIterator<Item = Result<f64, SampleError>>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
        }
    }

    /// Sequence of successful samples.
    pub fn loads(loads: impl IntoIterator<Item = f64>) -> Self {
        Self::new(loads.into_iter().map(Ok))
    }
}

impl LoadSampler for ScriptedSampler {
    fn sample(&self) -> Result<f64, SampleError> {
        let mut samples = self
            .samples
            .lock()
            .map_err(|_| SampleError::Unavailable("sampler lock poisoned".to_string()))?;
        match samples.len() {
            0 => Err(SampleError::Unavailable("script exhausted".to_string())),
            1 => samples[0].clone(),
            _ => samples
                .pop_front()
                .unwrap_or_else(|| Err(SampleError::Unavailable("script exhausted".to_string()))),
        }
    }
}
