//! Pushup form analysis over a single pose frame.
//!
//! Stateless per call: one [`PoseSnapshot`] in, one [`FormMetrics`]
//! out. A user stepping out of frame is an expected, frequent
//! condition; it produces an invalid metrics object, never an error.

use serde::{Deserialize, Serialize};
use wakerep_core::geometry::angle_at;
use wakerep_core::types::{Landmark, PoseLandmark, PoseSnapshot};

use crate::config::FormConfig;

/// Per-frame pose quality snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormMetrics {
    /// Average of the left and right elbow bend angles (degrees).
    pub elbow_angle_deg: f64,

    /// Absolute tilt of the shoulder-to-shoulder line (degrees).
    pub shoulder_tilt_deg: f64,

    /// Shoulder-hip-knee straightness deviation; smaller is straighter.
    pub body_alignment: f64,

    /// Depth proxy: average shoulder height in normalized coordinates.
    pub depth: f64,

    /// Whether the frame shows a plausible plank position.
    pub is_valid: bool,
}

impl FormMetrics {
    fn invalid() -> Self {
        Self::default()
    }

    /// Coaching hint for the current frame.
    pub fn feedback(&self) -> &'static str {
        if !self.is_valid {
            "Position yourself in plank position"
        } else if self.elbow_angle_deg < 90.0 {
            "Good form - go lower!"
        } else if self.elbow_angle_deg < 120.0 {
            "Great! Now push up"
        } else {
            "Perfect form - keep going!"
        }
    }
}

struct RequiredJoints<'a> {
    left_shoulder: &'a Landmark,
    right_shoulder: &'a Landmark,
    left_elbow: &'a Landmark,
    right_elbow: &'a Landmark,
    left_wrist: &'a Landmark,
    right_wrist: &'a Landmark,
    left_hip: &'a Landmark,
    right_hip: &'a Landmark,
    left_knee: &'a Landmark,
    right_knee: &'a Landmark,
}

/// Stateless pose form analyzer.
pub struct FormAnalyzer {
    config: FormConfig,
}

impl FormAnalyzer {
    pub fn new(config: FormConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Compute form metrics for one frame.
    ///
    /// Any required joint missing or below the visibility threshold
    /// yields an invalid metrics object with zeroed fields; no partial
    /// computation is attempted.
    pub fn analyze(&self, snapshot: &PoseSnapshot) -> FormMetrics {
        let Some(j) = self.gather(snapshot) else {
            return FormMetrics::invalid();
        };

        let left_elbow = angle_at(j.left_shoulder, j.left_elbow, j.left_wrist);
        let right_elbow = angle_at(j.right_shoulder, j.right_elbow, j.right_wrist);
        let elbow_angle_deg = (left_elbow + right_elbow) / 2.0;

        let shoulder_tilt_deg = (j.right_shoulder.y - j.left_shoulder.y)
            .atan2(j.right_shoulder.x - j.left_shoulder.x)
            .to_degrees()
            .abs();

        let avg_shoulder_y = (j.left_shoulder.y + j.right_shoulder.y) / 2.0;
        let avg_hip_y = (j.left_hip.y + j.right_hip.y) / 2.0;
        let avg_knee_y = (j.left_knee.y + j.right_knee.y) / 2.0;

        // The body should form one straight line shoulder -> hip -> knee.
        let body_alignment = (avg_shoulder_y - avg_hip_y)
            .abs()
            .max((avg_hip_y - avg_knee_y).abs());

        let is_valid = elbow_angle_deg > self.config.min_elbow_deg
            && elbow_angle_deg < self.config.max_elbow_deg
            && shoulder_tilt_deg < self.config.max_shoulder_tilt_deg
            && body_alignment < self.config.max_alignment_dev;

        FormMetrics {
            elbow_angle_deg,
            shoulder_tilt_deg,
            body_alignment,
            depth: avg_shoulder_y,
            is_valid,
        }
    }

    fn gather<'a>(&self, snapshot: &'a PoseSnapshot) -> Option<RequiredJoints<'a>> {
        let visible = |landmark: PoseLandmark| {
            snapshot
                .get(landmark)
                .filter(|l| l.is_visible(self.config.min_visibility))
        };

        Some(RequiredJoints {
            left_shoulder: visible(PoseLandmark::LeftShoulder)?,
            right_shoulder: visible(PoseLandmark::RightShoulder)?,
            left_elbow: visible(PoseLandmark::LeftElbow)?,
            right_elbow: visible(PoseLandmark::RightElbow)?,
            left_wrist: visible(PoseLandmark::LeftWrist)?,
            right_wrist: visible(PoseLandmark::RightWrist)?,
            left_hip: visible(PoseLandmark::LeftHip)?,
            right_hip: visible(PoseLandmark::RightHip)?,
            left_knee: visible(PoseLandmark::LeftKnee)?,
            right_knee: visible(PoseLandmark::RightKnee)?,
        })
    }
}

impl Default for FormAnalyzer {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::plank_snapshot;
    use super::*;
    use wakerep_core::types::PoseSnapshot;

    #[test]
    fn test_valid_plank_metrics() {
        let analyzer = FormAnalyzer::default();
        let metrics = analyzer.analyze(&plank_snapshot(150.0, 0.3));

        assert!(metrics.is_valid);
        assert!((metrics.elbow_angle_deg - 150.0).abs() < 1.0);
        assert!(metrics.shoulder_tilt_deg < 1.0);
        assert!((metrics.body_alignment - 0.05).abs() < 1e-9);
        assert!((metrics.depth - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_frame_is_invalid() {
        let analyzer = FormAnalyzer::default();
        let metrics = analyzer.analyze(&PoseSnapshot::new(Vec::new()));
        assert!(!metrics.is_valid);
        assert_eq!(metrics.elbow_angle_deg, 0.0);
        assert_eq!(metrics.depth, 0.0);
    }

    #[test]
    fn test_low_visibility_joint_invalidates_frame() {
        let analyzer = FormAnalyzer::default();
        let mut landmarks = super::test_fixtures::plank_landmarks(150.0, 0.3);
        landmarks[PoseLandmark::LeftWrist.index()].visibility = 0.3;

        let metrics = analyzer.analyze(&PoseSnapshot::new(landmarks));
        assert!(!metrics.is_valid);
        assert_eq!(metrics.elbow_angle_deg, 0.0);
    }

    #[test]
    fn test_tilted_shoulders_invalidate_frame() {
        let analyzer = FormAnalyzer::default();
        let mut landmarks = super::test_fixtures::plank_landmarks(150.0, 0.3);
        // Raise one shoulder well past the tilt threshold.
        landmarks[PoseLandmark::RightShoulder.index()].y -= 0.3;

        let metrics = analyzer.analyze(&PoseSnapshot::new(landmarks));
        assert!(metrics.shoulder_tilt_deg > 15.0);
        assert!(!metrics.is_valid);
    }

    #[test]
    fn test_feedback_tracks_depth() {
        let invalid = FormMetrics::invalid();
        assert_eq!(invalid.feedback(), "Position yourself in plank position");

        let deep = FormMetrics {
            elbow_angle_deg: 80.0,
            is_valid: true,
            ..FormMetrics::default()
        };
        assert_eq!(deep.feedback(), "Good form - go lower!");

        let bottom = FormMetrics {
            elbow_angle_deg: 100.0,
            is_valid: true,
            ..FormMetrics::default()
        };
        assert_eq!(bottom.feedback(), "Great! Now push up");
    }
}
