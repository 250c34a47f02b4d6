//! Workout session orchestration.
//!
//! A [`WorkoutSession`] wires the per-frame analyzers and the state
//! machine together for one alarm dismissal: it tracks the target
//! count, raises the session completion event exactly once, and on
//! `finish` hands a [`WorkoutRecord`] to the host's sink.

use chrono::Utc;
use tracing::{info, warn};
use wakerep_core::error::Result;
use wakerep_core::types::{MotionSample, PoseSnapshot, SessionId, WorkoutRecord, WorkoutSink};

use crate::config::DetectorConfig;
use crate::form::{FormAnalyzer, FormMetrics};
use crate::machine::{RepCounter, RepUpdate, Secondary, SignalTick};
use crate::motion::{MotionPreprocessor, MotionReading};

/// Result of processing one camera frame.
#[derive(Debug, Clone, Copy)]
pub struct PoseUpdate {
    pub form: FormMetrics,
    pub rep: RepUpdate,
}

impl PoseUpdate {
    /// Coaching hint for the UI.
    pub fn feedback(&self) -> &'static str {
        self.form.feedback()
    }
}

/// Result of processing one accelerometer sample.
#[derive(Debug, Clone, Copy)]
pub struct MotionUpdate {
    pub reading: MotionReading,
    pub rep: RepUpdate,
}

type SessionCallback = Box<dyn FnMut(u32) + Send>;

/// One exercise session against a fixed repetition target.
///
/// Single-writer: hosts driving camera and motion sensors concurrently
/// must serialize calls or run independent sessions. Reaching the
/// target does not stop counting; extra repetitions accumulate and the
/// completion event still fires only once.
pub struct WorkoutSession {
    id: SessionId,
    target_count: u32,
    analyzer: FormAnalyzer,
    preprocessor: MotionPreprocessor,
    counter: RepCounter,
    started_ms: Option<u64>,
    last_ms: u64,
    completion_fired: bool,
    callbacks: Vec<SessionCallback>,
}

impl WorkoutSession {
    pub fn new(target_count: u32) -> Self {
        Self::with_config(target_count, DetectorConfig::default())
    }

    pub fn with_config(target_count: u32, config: DetectorConfig) -> Self {
        Self {
            id: SessionId::new(),
            target_count,
            analyzer: FormAnalyzer::new(config.form),
            preprocessor: MotionPreprocessor::new(config.motion),
            counter: RepCounter::new(config.machine),
            started_ms: None,
            last_ms: 0,
            completion_fired: false,
            callbacks: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn count(&self) -> u32 {
        self.counter.count()
    }

    pub fn is_complete(&self) -> bool {
        self.counter.count() >= self.target_count
    }

    /// Register a callback fired exactly once, when the count first
    /// reaches the target.
    pub fn on_completion<F>(&mut self, callback: F)
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Process one camera frame through form analysis and the state
    /// machine.
    pub fn process_frame(&mut self, timestamp_ms: u64, snapshot: &PoseSnapshot) -> PoseUpdate {
        self.touch(timestamp_ms);
        let form = self.analyzer.analyze(snapshot);
        let rep = self.counter.process(SignalTick {
            depth: form.depth,
            valid: form.is_valid,
            secondary: Secondary::ElbowAngle(form.elbow_angle_deg),
        });
        self.check_completion();
        PoseUpdate { form, rep }
    }

    /// Process one accelerometer sample through the motion
    /// preprocessor and the state machine.
    pub fn process_motion(&mut self, sample: MotionSample) -> MotionUpdate {
        self.touch(sample.timestamp_ms);
        let reading = self.preprocessor.process(sample);
        let rep = self.counter.process(reading.tick());
        self.check_completion();
        MotionUpdate { reading, rep }
    }

    /// Debounced manual increment; returns whether the tap counted.
    pub fn manual_count(&mut self, timestamp_ms: u64) -> bool {
        self.touch(timestamp_ms);
        let counted = self.counter.manual_count(timestamp_ms);
        self.check_completion();
        counted
    }

    /// Close the session: build the final record and append it to the
    /// host's store. The session itself stays usable afterwards, so a
    /// host may keep counting bonus repetitions.
    pub fn finish(&mut self, sink: &mut dyn WorkoutSink) -> Result<WorkoutRecord> {
        let duration_ms = self
            .started_ms
            .map(|start| self.last_ms.saturating_sub(start))
            .unwrap_or(0);
        let record = WorkoutRecord {
            session_id: self.id,
            target_count: self.target_count,
            completed_count: self.counter.count(),
            duration_seconds: duration_ms / 1_000,
            completed_at: Utc::now(),
        };
        if let Err(e) = sink.append(&record) {
            warn!(error = %e, "workout log append failed");
            return Err(e);
        }
        info!(
            session = %record.session_id.0,
            completed = record.completed_count,
            target = record.target_count,
            "workout recorded"
        );
        Ok(record)
    }

    /// Return to the initial state: count zeroed, calibration and
    /// motion baseline discarded, completion re-armed. The session id
    /// is retained.
    pub fn reset(&mut self) {
        self.counter.reset();
        self.preprocessor.reset();
        self.started_ms = None;
        self.last_ms = 0;
        self.completion_fired = false;
    }

    fn touch(&mut self, timestamp_ms: u64) {
        if self.started_ms.is_none() {
            self.started_ms = Some(timestamp_ms);
        }
        self.last_ms = self.last_ms.max(timestamp_ms);
    }

    fn check_completion(&mut self) {
        if self.completion_fired || self.counter.count() < self.target_count {
            return;
        }
        self.completion_fired = true;
        let count = self.counter.count();
        info!(count, target = self.target_count, "session target reached");
        for callback in &mut self.callbacks {
            callback(count);
        }
    }
}
