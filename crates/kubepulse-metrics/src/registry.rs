//! Gauge registry — the process-wide `MetricsSink`.
//!
//! One atomic slot per gauge. Values are stored as `f64` bit patterns so
//! writers never block each other or the /metrics reader.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::trace;

use kubepulse_core::{Gauge, MetricsSink};

/// Latest value for a single gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeReading {
    pub gauge: Gauge,
    pub value: f64,
}

struct Slot {
    bits: AtomicU64,
    /// Whether the gauge has been set at least once.
    set: AtomicBool,
}

impl Slot {
    fn new() -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
            set: AtomicBool::new(false),
        }
    }
}

/// Holds the latest value of every kubepulse gauge.
///
/// Share it as `Arc<GaugeRegistry>`; it is handed to the control loops as
/// their `MetricsSink` and to the API for exposition.
pub struct GaugeRegistry {
    slots: [Slot; Gauge::ALL.len()],
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::new()),
        }
    }

    /// Current value of a gauge, or `None` if it was never set.
    pub fn get(&self, gauge: Gauge) -> Option<f64> {
        let slot = &self.slots[gauge.index()];
        if slot.set.load(Ordering::Acquire) {
            Some(f64::from_bits(slot.bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    /// Readings for every gauge that has been set, in exposition order.
    pub fn readings(&self) -> Vec<GaugeReading> {
        Gauge::ALL
            .iter()
            .filter_map(|&gauge| self.get(gauge).map(|value| GaugeReading { gauge, value }))
            .collect()
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for GaugeRegistry {
    fn set_gauge(&self, gauge: Gauge, value: f64) {
        let slot = &self.slots[gauge.index()];
        slot.bits.store(value.to_bits(), Ordering::Relaxed);
        slot.set.store(true, Ordering::Release);
        trace!(gauge = gauge.name(), value, "gauge set");
    }
}
