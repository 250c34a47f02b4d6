//! Detector configuration.
//!
//! All thresholds are tunable defaults calibrated for typical plank
//! geometry in normalized camera coordinates, not exact reproductions
//! of any one device or camera setup.

use serde::{Deserialize, Serialize};

/// Validity thresholds for the pose form analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Minimum landmark visibility for a required joint to count as seen.
    pub min_visibility: f64,

    /// Lower bound of the plausible plank elbow angle (degrees, exclusive).
    pub min_elbow_deg: f64,

    /// Upper bound of the plausible plank elbow angle (degrees, exclusive).
    pub max_elbow_deg: f64,

    /// Maximum shoulder-line tilt for a level plank (degrees).
    pub max_shoulder_tilt_deg: f64,

    /// Maximum shoulder-hip-knee deviation in normalized units.
    pub max_alignment_dev: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            min_elbow_deg: 60.0,
            max_elbow_deg: 180.0,
            max_shoulder_tilt_deg: 15.0,
            max_alignment_dev: 0.15,
        }
    }
}

/// Thresholds for the repetition state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Progress above which a down posture is recognized (percent).
    pub down_progress_pct: f64,

    /// Progress below which an up posture is recognized (percent).
    pub up_progress_pct: f64,

    /// Elbow angle corroborating a down posture (degrees, below).
    pub elbow_down_max_deg: f64,

    /// Elbow angle corroborating an up posture (degrees, above).
    pub elbow_up_min_deg: f64,

    /// Acceleration deviation corroborating a down posture (above).
    pub deviation_down: f64,

    /// Acceleration deviation corroborating an up posture (below).
    pub deviation_up: f64,

    /// Consecutive valid samples required before any transition
    /// (suppresses single-frame noise spikes).
    pub min_valid_frames: u32,

    /// Minimum gap between accepted manual counts (milliseconds).
    pub min_manual_gap_ms: u64,

    /// Minimum observed range span before progress is meaningful,
    /// in normalized depth units.
    pub min_span: f64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            down_progress_pct: 70.0,
            up_progress_pct: 30.0,
            elbow_down_max_deg: 120.0,
            elbow_up_min_deg: 140.0,
            deviation_down: 1.0,
            deviation_up: 1.0,
            min_valid_frames: 10,
            min_manual_gap_ms: 800,
            min_span: 0.05,
        }
    }
}

/// Rolling-window parameters for the motion preprocessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Rolling history length (milliseconds).
    pub window_ms: u64,

    /// Samples required before the rest baseline is established.
    pub baseline_samples: usize,

    /// Deviation mapping to 100% UI intensity (m/s²).
    pub intensity_scale: f64,

    /// Total 3-axis magnitude classifying a sample as high motion in
    /// the threshold fallback (m/s²).
    pub high_magnitude: f64,

    /// Minimum dwell before the threshold fallback flips its
    /// high/low classification (milliseconds).
    pub min_dwell_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            window_ms: 2_000,
            baseline_samples: 10,
            intensity_scale: 3.0,
            high_magnitude: 12.0,
            min_dwell_ms: 300,
        }
    }
}

/// Complete detector configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub form: FormConfig,
    pub machine: MachineConfig,
    pub motion: MotionConfig,
}
