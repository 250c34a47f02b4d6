//! Fundamental types for the wakerep detection engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Unique identifier for one exercise session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Millisecond timestamp wrapper; monotonic within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0 as i64).unwrap_or_default()
    }
}

/// One labeled body joint sample in normalized camera coordinates.
///
/// Produced once per video frame by the external pose estimator and
/// consumed immediately; never mutated or retained across frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Estimator confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility > min_visibility
    }
}

/// Fixed anatomical indexing scheme for pose landmarks.
///
/// Indices follow the BlazePose 33-landmark layout; only the joints the
/// pushup analyzer consumes are named here. The indices are a stable
/// part of the input contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoseLandmark {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
}

impl PoseLandmark {
    /// Total landmark count of the indexing scheme.
    pub const LANDMARK_COUNT: usize = 33;

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            _ => None,
        }
    }

    /// Joints the form analyzer requires to be visible in every frame.
    pub fn required() -> &'static [PoseLandmark] {
        &[
            PoseLandmark::LeftShoulder,
            PoseLandmark::RightShoulder,
            PoseLandmark::LeftElbow,
            PoseLandmark::RightElbow,
            PoseLandmark::LeftWrist,
            PoseLandmark::RightWrist,
            PoseLandmark::LeftHip,
            PoseLandmark::RightHip,
            PoseLandmark::LeftKnee,
            PoseLandmark::RightKnee,
        ]
    }
}

/// One frame of pose landmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSnapshot {
    landmarks: Vec<Landmark>,
}

impl PoseSnapshot {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Landmark at the given anatomical index, if the frame carries it.
    pub fn get(&self, landmark: PoseLandmark) -> Option<&Landmark> {
        self.landmarks.get(landmark.index())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

/// One timestamped 3-axis accelerometer sample, gravity included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub timestamp_ms: u64,
    /// Acceleration in m/s² as [x, y, z]
    pub accel: [f64; 3],
}

impl MotionSample {
    /// Build a sample, defaulting non-finite axis values to 0.
    ///
    /// Motion event delivery on embedded sensor APIs is best-effort;
    /// malformed payloads must not fail ingestion.
    pub fn new(timestamp_ms: u64, ax: f64, ay: f64, az: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            timestamp_ms,
            accel: [sanitize(ax), sanitize(ay), sanitize(az)],
        }
    }

    /// Total 3-axis acceleration magnitude.
    pub fn magnitude(&self) -> f64 {
        let [ax, ay, az] = self.accel;
        (ax * ax + ay * ay + az * az).sqrt()
    }

    /// Vertical-axis component (device flat on the floor, z up).
    pub fn vertical(&self) -> f64 {
        self.accel[2]
    }
}

/// Final outcome of one session, handed to the external log append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub session_id: SessionId,
    pub target_count: u32,
    pub completed_count: u32,
    pub duration_seconds: u64,
    pub completed_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Whether the session reached its target.
    pub fn is_success(&self) -> bool {
        self.completed_count >= self.target_count
    }
}

/// Aggregate statistics over stored workout records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub total_reps: u64,
    pub completed_sessions: u32,
    /// Share of sessions that reached their target, rounded percent.
    pub success_rate_pct: u32,
    pub total_workouts: u32,
}

impl WorkoutStats {
    pub fn from_records(records: &[WorkoutRecord]) -> Self {
        let total_reps = records.iter().map(|r| r.completed_count as u64).sum();
        let completed_sessions = records.iter().filter(|r| r.is_success()).count() as u32;
        let total_workouts = records.len() as u32;
        let success_rate_pct = if total_workouts > 0 {
            (completed_sessions as f64 / total_workouts as f64 * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_reps,
            completed_sessions,
            success_rate_pct,
            total_workouts,
        }
    }
}

/// External persistence seam for completed sessions.
///
/// The engine itself performs no I/O; on session completion it builds a
/// [`WorkoutRecord`] and hands it to whatever store the host wires in.
pub trait WorkoutSink {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_roundtrip() {
        for landmark in PoseLandmark::required() {
            assert_eq!(
                PoseLandmark::from_index(landmark.index() as u8),
                Some(*landmark)
            );
        }
        assert_eq!(PoseLandmark::from_index(0), None);
        assert_eq!(PoseLandmark::from_index(33), None);
    }

    #[test]
    fn test_snapshot_missing_landmark() {
        let snapshot = PoseSnapshot::new(vec![Landmark::new(0.0, 0.0, 0.0, 1.0); 12]);
        assert!(snapshot.get(PoseLandmark::RightShoulder).is_none());
        assert!(snapshot.get(PoseLandmark::LeftShoulder).is_some());
    }

    #[test]
    fn test_motion_sample_sanitizes_malformed_axes() {
        let sample = MotionSample::new(100, f64::NAN, f64::INFINITY, 9.8);
        assert_eq!(sample.accel[0], 0.0);
        assert_eq!(sample.accel[1], 0.0);
        assert_eq!(sample.vertical(), 9.8);
        assert!(sample.magnitude().is_finite());
    }

    #[test]
    fn test_timestamp_conversions() {
        let ts = Timestamp::from_millis(1_500);
        assert!((ts.as_secs_f64() - 1.5).abs() < 1e-12);
        assert_eq!(ts.to_datetime().timestamp_millis(), 1_500);
    }

    #[test]
    fn test_workout_stats() {
        let base = WorkoutRecord {
            session_id: SessionId::new(),
            target_count: 20,
            completed_count: 20,
            duration_seconds: 90,
            completed_at: Utc::now(),
        };
        let short = WorkoutRecord {
            completed_count: 12,
            ..base.clone()
        };

        let stats = WorkoutStats::from_records(&[base.clone(), base, short]);
        assert_eq!(stats.total_reps, 52);
        assert_eq!(stats.completed_sessions, 2);
        assert_eq!(stats.success_rate_pct, 67);
        assert_eq!(stats.total_workouts, 3);
    }

    #[test]
    fn test_workout_stats_empty() {
        let stats = WorkoutStats::from_records(&[]);
        assert_eq!(stats.success_rate_pct, 0);
        assert_eq!(stats.total_workouts, 0);
    }
}
