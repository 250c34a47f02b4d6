//! Adaptive range calibration.
//!
//! The depth signal (shoulder height, or acceleration deviation) has
//! arbitrary scale: it depends on body size, camera distance, and
//! device placement. The calibrator tracks the running min/max of the
//! signal observed so far and maps it onto a 0-100 progress scale,
//! with no prior calibration step from the user.

use serde::{Deserialize, Serialize};

/// Running min/max calibration of a scalar depth signal.
///
/// The range only widens (min decreases, max increases) until an
/// explicit [`reset`](RangeCalibrator::reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeCalibrator {
    min: f64,
    max: f64,
    min_span: f64,
}

impl RangeCalibrator {
    pub fn new(min_span: f64) -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            min_span,
        }
    }

    /// Widen the observed range with a new signal value; returns the
    /// current span.
    pub fn observe(&mut self, signal: f64) -> f64 {
        self.min = self.min.min(signal);
        self.max = self.max.max(signal);
        self.span()
    }

    /// Observed max minus observed min; 0.0 before any observation.
    pub fn span(&self) -> f64 {
        if self.max > self.min {
            self.max - self.min
        } else {
            0.0
        }
    }

    /// The signal has shown enough variation to be meaningful.
    pub fn is_calibrated(&self) -> bool {
        self.span() >= self.min_span
    }

    /// Progress through the observed range, clamped to [0, 100].
    ///
    /// Returns 0 while the span is below the calibration threshold;
    /// callers must withhold transitions in that case.
    pub fn progress(&self, signal: f64) -> f64 {
        let span = self.span();
        if span < self.min_span {
            return 0.0;
        }
        ((signal - self.min) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Discard the observed range, returning to the unbounded state.
    pub fn reset(&mut self) {
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
    }
}
