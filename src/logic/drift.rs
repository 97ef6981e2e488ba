//! Drift Monitor - Rolling confidence window
//!
//! Keeps the last N served confidences in a capacity-bounded FIFO window and
//! derives an O(1) rolling average as the online drift signal. This is the
//! only mutable state shared across requests; all access goes through one
//! mutex scoped to the O(1) window update.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use super::CoreError;

// ============================================================================
// CLOCK
// ============================================================================

/// Time source for sample timestamps. Injected so tests can control time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed by `Instant::now`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One served confidence, owned by the window until it ages out.
#[derive(Debug, Clone, Copy)]
struct ConfidenceSample {
    value: f64,
    #[allow(dead_code)]
    at: Instant,
}

/// Read-only view of the window state, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftSnapshot {
    pub sample_count: usize,
    /// `None` until the first sample lands: no data means "unknown",
    /// never "confidence zero".
    pub rolling_average: Option<f64>,
    pub window_capacity: usize,
}

struct Window {
    samples: VecDeque<ConfidenceSample>,
    /// Maintained incrementally: add on record, subtract on eviction.
    running_sum: f64,
}

// ============================================================================
// DRIFT MONITOR
// ============================================================================

/// Bounded rolling window over recent prediction confidences.
///
/// Constructed once at startup and torn down at shutdown; there is no
/// ambient global instance.
pub struct DriftMonitor {
    window: Mutex<Window>,
    capacity: usize,
    clock: Box<dyn Clock>,
}

impl DriftMonitor {
    pub fn new(capacity: usize) -> Result<Self, CoreError> {
        Self::with_clock(capacity, Box::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Box<dyn Clock>) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::Configuration(
                "window capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            window: Mutex::new(Window {
                samples: VecDeque::with_capacity(capacity),
                running_sum: 0.0,
            }),
            capacity,
            clock,
        })
    }

    /// Append a confidence sample, evicting the oldest at capacity.
    ///
    /// Out-of-range confidence is a caller contract violation and is
    /// rejected rather than clamped, so upstream bugs stay visible.
    pub fn record(&self, confidence: f64) -> Result<(), CoreError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::ContractViolation(format!(
                "confidence must be within [0, 1], got {confidence}"
            )));
        }

        let at = self.clock.now();
        let mut window = self.window.lock();

        if window.samples.len() == self.capacity {
            if let Some(evicted) = window.samples.pop_front() {
                window.running_sum -= evicted.value;
            }
        }
        window.samples.push_back(ConfidenceSample {
            value: confidence,
            at,
        });
        window.running_sum += confidence;

        Ok(())
    }

    /// O(1) snapshot of the current window, independent of capacity.
    pub fn snapshot(&self) -> DriftSnapshot {
        let (count, sum) = {
            let window = self.window.lock();
            (window.samples.len(), window.running_sum)
        };

        DriftSnapshot {
            sample_count: count,
            rolling_average: (count > 0).then(|| sum / count as f64),
            window_capacity: self.capacity,
        }
    }

    /// Whether the signal indicates degradation: only meaningful once the
    /// window is full, mirroring how a partial window over-weights early
    /// traffic.
    pub fn is_degraded(&self, drift_threshold: f64) -> bool {
        let snapshot = self.snapshot();
        snapshot.sample_count == self.capacity
            && snapshot
                .rolling_average
                .map(|avg| avg < drift_threshold)
                .unwrap_or(false)
    }
}

// ============================================================================
// TESTS
// ============================================================================
