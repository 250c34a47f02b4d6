//! Accelerometer preprocessing for camera-free detection.
//!
//! The device lies on the floor under the exerciser's chest; each
//! pushup presses the body toward it and produces a vertical
//! acceleration swing. The preprocessor keeps a short rolling window,
//! learns a rest baseline once, and emits the absolute deviation from
//! that baseline as the depth signal for the state machine.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wakerep_core::types::MotionSample;

use crate::config::MotionConfig;
use crate::machine::{Secondary, SignalTick};

/// One processed motion sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionReading {
    /// Absolute deviation of the vertical axis from the rest baseline
    /// (m/s²). Zero until the baseline is established.
    pub deviation: f64,

    /// UI intensity, [0, 100].
    pub intensity_pct: f64,

    pub baseline_established: bool,
}

impl MotionReading {
    /// Translate into the state machine's input contract. Samples seen
    /// before the baseline exists are marked invalid so they cannot
    /// drive transitions or calibration.
    pub fn tick(&self) -> SignalTick {
        SignalTick {
            depth: self.deviation,
            valid: self.baseline_established,
            secondary: Secondary::Deviation(self.deviation),
        }
    }
}

/// Rolling-window accelerometer preprocessor.
///
/// The baseline is computed exactly once, from the first
/// `baseline_samples` readings, and then held for the rest of the
/// session; it represents the device at rest before the workout
/// starts. `reset` discards both window and baseline.
pub struct MotionPreprocessor {
    config: MotionConfig,
    window: VecDeque<MotionSample>,
    baseline: Option<f64>,
}

impl MotionPreprocessor {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            window: VecDeque::new(),
            baseline: None,
        }
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Ingest one sample and produce a reading.
    ///
    /// Samples are assumed to arrive in timestamp order; the window is
    /// evicted relative to the newest sample.
    pub fn process(&mut self, sample: MotionSample) -> MotionReading {
        self.window.push_back(sample);
        let horizon = sample.timestamp_ms.saturating_sub(self.config.window_ms);
        while let Some(front) = self.window.front() {
            if front.timestamp_ms >= horizon {
                break;
            }
            self.window.pop_front();
        }

        if self.baseline.is_none() && self.window.len() >= self.config.baseline_samples {
            let tail = self
                .window
                .iter()
                .rev()
                .take(self.config.baseline_samples)
                .map(|s| s.vertical().abs())
                .sum::<f64>()
                / self.config.baseline_samples as f64;
            self.baseline = Some(tail);
            debug!(baseline = tail, "rest baseline established");
        }

        match self.baseline {
            Some(baseline) => {
                let deviation = (sample.vertical().abs() - baseline).abs();
                let intensity_pct =
                    (deviation / self.config.intensity_scale * 100.0).min(100.0);
                MotionReading {
                    deviation,
                    intensity_pct,
                    baseline_established: true,
                }
            }
            None => MotionReading {
                deviation: 0.0,
                intensity_pct: 0.0,
                baseline_established: false,
            },
        }
    }

    /// Discard the window and the baseline; the next session relearns
    /// rest conditions from scratch.
    pub fn reset(&mut self) {
        self.window.clear();
        self.baseline = None;
    }
}

impl Default for MotionPreprocessor {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

/// Coarse high/low motion classifier.
///
/// Fallback for hosts without a learned baseline: classifies each
/// sample by total 3-axis magnitude and only flips its state after the
/// opposite classification has held for a minimum dwell, so a single
/// bump or dropped sample cannot toggle it.
pub struct ThresholdMotionGate {
    config: MotionConfig,
    is_high: bool,
    candidate_since: Option<u64>,
}

impl ThresholdMotionGate {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            is_high: false,
            candidate_since: None,
        }
    }

    pub fn is_high(&self) -> bool {
        self.is_high
    }

    /// Classify one sample; returns the (possibly updated) state.
    pub fn observe(&mut self, sample: &MotionSample) -> bool {
        let high = sample.magnitude() > self.config.high_magnitude;
        if high == self.is_high {
            self.candidate_since = None;
            return self.is_high;
        }
        match self.candidate_since {
            None => self.candidate_since = Some(sample.timestamp_ms),
            Some(start)
                if sample.timestamp_ms.saturating_sub(start) >= self.config.min_dwell_ms =>
            {
                self.is_high = high;
                self.candidate_since = None;
                debug!(high, "motion gate flipped");
            }
            Some(_) => {}
        }
        self.is_high
    }

    /// Translate into the state machine's input contract: high motion
    /// reads as full depth, low motion as zero.
    pub fn tick(&mut self, sample: &MotionSample) -> SignalTick {
        let depth = if self.observe(sample) { 1.0 } else { 0.0 };
        SignalTick {
            depth,
            valid: true,
            secondary: Secondary::None,
        }
    }

    pub fn reset(&mut self) {
        self.is_high = false;
        self.candidate_since = None;
    }
}

impl Default for ThresholdMotionGate {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
