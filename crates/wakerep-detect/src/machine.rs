//! The repetition state machine.
//!
//! Converts a continuous progress signal plus a corroborating
//! secondary metric into discrete, exactly-once repetition events.
//! Both signal sources (pose depth, acceleration deviation) feed the
//! same contract; the machine never knows which one is driving it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calibration::RangeCalibrator;
use crate::config::MachineConfig;

/// Vertical phase of the repetition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepPhase {
    Up,
    Down,
}

/// Secondary metric corroborating the depth signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Secondary {
    /// Average elbow bend from the pose analyzer (degrees).
    ElbowAngle(f64),
    /// Acceleration deviation from the motion preprocessor.
    Deviation(f64),
    /// No corroborating metric; always agrees. Used by the
    /// threshold-only motion fallback.
    None,
}

impl Secondary {
    fn corroborates_down(&self, config: &MachineConfig) -> bool {
        match *self {
            Secondary::ElbowAngle(deg) => deg < config.elbow_down_max_deg,
            Secondary::Deviation(dev) => dev > config.deviation_down,
            Secondary::None => true,
        }
    }

    fn corroborates_up(&self, config: &MachineConfig) -> bool {
        match *self {
            Secondary::ElbowAngle(deg) => deg > config.elbow_up_min_deg,
            Secondary::Deviation(dev) => dev < config.deviation_up,
            Secondary::None => true,
        }
    }
}

/// One tick of input to the state machine.
#[derive(Debug, Clone, Copy)]
pub struct SignalTick {
    /// Depth or deviation scalar; fed to the range calibrator.
    pub depth: f64,
    /// Whether the sample passed validity gating upstream.
    pub valid: bool,
    pub secondary: Secondary,
}

/// Result of processing one tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RepUpdate {
    pub phase: RepPhase,
    /// Progress through the calibrated range, [0, 100]. Zero for
    /// invalid ticks and while the range is uncalibrated.
    pub progress_pct: f64,
    pub repetition_count: u32,
    pub form_valid: bool,
    /// True exactly once per completed down-up cycle.
    pub repetition_completed: bool,
}

impl RepUpdate {
    pub fn is_down(&self) -> bool {
        self.phase == RepPhase::Down
    }
}

type CompletionCallback = Box<dyn FnMut(u32) + Send>;

/// Debounced repetition counter.
///
/// States are `Up` (initial) and `Down`. A transition requires the
/// progress threshold, secondary corroboration, and a minimum run of
/// consecutive valid samples; the completion event fires on the
/// `Down -> Up` half only. Owns its calibrator: `reset` cascades.
pub struct RepCounter {
    config: MachineConfig,
    calibrator: RangeCalibrator,
    phase: RepPhase,
    count: u32,
    consecutive_valid: u32,
    last_manual_ms: Option<u64>,
    callbacks: Vec<CompletionCallback>,
}

impl RepCounter {
    pub fn new(config: MachineConfig) -> Self {
        let calibrator = RangeCalibrator::new(config.min_span);
        Self {
            config,
            calibrator,
            phase: RepPhase::Up,
            count: 0,
            consecutive_valid: 0,
            last_manual_ms: None,
            callbacks: Vec::new(),
        }
    }

    /// Register a callback invoked synchronously with the new count on
    /// every completed repetition.
    pub fn on_completion<F>(&mut self, callback: F)
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    pub fn calibration_span(&self) -> f64 {
        self.calibrator.span()
    }

    /// Process one tick of the depth signal.
    pub fn process(&mut self, tick: SignalTick) -> RepUpdate {
        if !tick.valid {
            // Low confidence resets the stability run but leaves state,
            // count, and calibration untouched.
            self.consecutive_valid = 0;
            return self.update(0.0, false, false);
        }

        self.consecutive_valid += 1;
        self.calibrator.observe(tick.depth);

        if !self.calibrator.is_calibrated() {
            return self.update(0.0, true, false);
        }

        let progress = self.calibrator.progress(tick.depth);
        let stable = self.consecutive_valid > self.config.min_valid_frames;
        let mut completed = false;

        match self.phase {
            RepPhase::Up => {
                if progress > self.config.down_progress_pct
                    && tick.secondary.corroborates_down(&self.config)
                    && stable
                {
                    self.phase = RepPhase::Down;
                    debug!(progress, "descent recognized");
                }
            }
            RepPhase::Down => {
                if progress < self.config.up_progress_pct
                    && tick.secondary.corroborates_up(&self.config)
                    && stable
                {
                    self.phase = RepPhase::Up;
                    self.count += 1;
                    completed = true;
                    self.fire_completion();
                }
            }
        }

        self.update(progress, true, completed)
    }

    /// Debounced manual increment for the no-sensor fallback.
    ///
    /// Returns false and fires nothing when called again within the
    /// minimum gap; rapid repeated taps are silently ignored, never an
    /// error. Bypasses the threshold logic entirely.
    pub fn manual_count(&mut self, timestamp_ms: u64) -> bool {
        if let Some(last) = self.last_manual_ms {
            if timestamp_ms.saturating_sub(last) < self.config.min_manual_gap_ms {
                return false;
            }
        }
        self.last_manual_ms = Some(timestamp_ms);
        self.count += 1;
        self.fire_completion();
        true
    }

    /// Zero the count, return to `Up`, clear the stability run, and
    /// reset the owned calibrator. Idempotent.
    pub fn reset(&mut self) {
        self.count = 0;
        self.phase = RepPhase::Up;
        self.consecutive_valid = 0;
        self.last_manual_ms = None;
        self.calibrator.reset();
    }

    fn fire_completion(&mut self) {
        info!(count = self.count, "repetition completed");
        let count = self.count;
        for callback in &mut self.callbacks {
            callback(count);
        }
    }

    fn update(&self, progress_pct: f64, form_valid: bool, repetition_completed: bool) -> RepUpdate {
        RepUpdate {
            phase: self.phase,
            progress_pct,
            repetition_count: self.count,
            form_valid,
            repetition_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn tick(depth: f64) -> SignalTick {
        SignalTick {
            depth,
            valid: true,
            secondary: Secondary::None,
        }
    }

    fn pose_tick(depth: f64, elbow_deg: f64) -> SignalTick {
        SignalTick {
            depth,
            valid: true,
            secondary: Secondary::ElbowAngle(elbow_deg),
        }
    }

    #[test]
    fn test_initial_state() {
        let counter = RepCounter::new(MachineConfig::default());
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.phase(), RepPhase::Up);
    }

    #[test]
    fn test_exactly_one_event_per_cycle() {
        let mut counter = RepCounter::new(MachineConfig::default());
        let events = Arc::new(AtomicU32::new(0));
        let observed = events.clone();
        counter.on_completion(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        // Hold at the top, descend past the threshold for many frames,
        // then rise again; the threshold is crossed repeatedly but the
        // cycle completes once.
        for _ in 0..12 {
            counter.process(tick(10.0));
        }
        for _ in 0..12 {
            counter.process(tick(80.0));
        }
        for _ in 0..12 {
            counter.process(tick(10.0));
        }

        assert_eq!(counter.count(), 1);
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert_eq!(counter.phase(), RepPhase::Up);
    }

    #[test]
    fn test_count_is_monotonic() {
        let mut counter = RepCounter::new(MachineConfig::default());
        let mut previous = 0;
        let depths = [10.0, 80.0, 10.0, 80.0, 10.0];

        for depth in depths {
            for _ in 0..12 {
                let update = counter.process(tick(depth));
                assert!(update.repetition_count >= previous);
                previous = update.repetition_count;
            }
        }
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_no_count_without_calibration() {
        let mut counter = RepCounter::new(MachineConfig::default());

        // Raw swings whose span stays below the calibration epsilon.
        for _ in 0..50 {
            let update = counter.process(tick(0.50));
            assert_eq!(update.progress_pct, 0.0);
            let update = counter.process(tick(0.52));
            assert_eq!(update.progress_pct, 0.0);
        }
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.phase(), RepPhase::Up);
    }

    #[test]
    fn test_invalid_samples_reset_stability_run() {
        let mut counter = RepCounter::new(MachineConfig::default());

        for _ in 0..12 {
            counter.process(tick(10.0));
        }
        // An invalid frame interrupts the run; the next down-zone frames
        // must re-earn stability before the transition is recognized.
        counter.process(SignalTick {
            depth: 0.0,
            valid: false,
            secondary: Secondary::None,
        });
        for _ in 0..10 {
            let update = counter.process(tick(80.0));
            assert_eq!(update.phase, RepPhase::Up);
        }
        let update = counter.process(tick(80.0));
        assert_eq!(update.phase, RepPhase::Down);
    }

    #[test]
    fn test_secondary_corroboration_gates_transition() {
        let mut counter = RepCounter::new(MachineConfig::default());

        for _ in 0..12 {
            counter.process(pose_tick(10.0, 150.0));
        }
        // Deep progress but arms still straight: not a real descent.
        for _ in 0..12 {
            let update = counter.process(pose_tick(80.0, 160.0));
            assert_eq!(update.phase, RepPhase::Up);
        }
        // Bent elbows corroborate.
        let update = counter.process(pose_tick(80.0, 100.0));
        assert_eq!(update.phase, RepPhase::Down);
    }

    #[test]
    fn test_manual_count_debounce() {
        let mut counter = RepCounter::new(MachineConfig::default());

        assert!(counter.manual_count(1_000));
        // 500 ms later: below the 800 ms gap, silently ignored.
        assert!(!counter.manual_count(1_500));
        assert_eq!(counter.count(), 1);
        // 900 ms after the last accepted call.
        assert!(counter.manual_count(1_900));
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_manual_count_fires_completion() {
        let mut counter = RepCounter::new(MachineConfig::default());
        let events = Arc::new(AtomicU32::new(0));
        let observed = events.clone();
        counter.on_completion(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        counter.manual_count(0);
        counter.manual_count(100); // debounced
        counter.manual_count(2_000);
        assert_eq!(events.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut counter = RepCounter::new(MachineConfig::default());
        for _ in 0..12 {
            counter.process(tick(10.0));
        }
        for _ in 0..12 {
            counter.process(tick(80.0));
        }

        counter.reset();
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.phase(), RepPhase::Up);
        assert_eq!(counter.calibration_span(), 0.0);
    }
}
