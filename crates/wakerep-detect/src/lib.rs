//! # wakerep-detect
//!
//! The repetition-detection engine behind the wakerep alarm: a stream
//! of noisy per-frame measurements (body landmarks from an external
//! pose estimator, or raw accelerometer samples from a device lying
//! under the exerciser) is turned into discrete, debounced
//! "repetition completed" events plus continuous feedback for the UI.
//!
//! ## Pipeline
//!
//! 1. **Form analyzer** ([`form`]): per-frame pose quality, meaning
//!    joint angles, shoulder tilt, body alignment, a depth proxy, and
//!    a validity flag.
//! 2. **Motion preprocessor** ([`motion`]): the camera-free variant,
//!    with a rolling accelerometer window, a rest baseline, and a
//!    normalized deviation signal.
//! 3. **Range calibrator** ([`calibration`]): running min/max of the
//!    depth signal, normalizing arbitrary body sizes and camera
//!    distances into a 0-100% progress scale with no user calibration
//!    step.
//! 4. **Repetition state machine** ([`machine`]): UP/DOWN transitions
//!    with validity gating and debouncing, firing exactly one
//!    completion event per full cycle.
//!
//! Both signal sources feed the same state-machine contract; they are
//! interchangeable strategies, not separate detectors.
//!
//! Every `process` call is synchronous, non-blocking, and free of I/O.
//! A session is single-writer: hosts driving camera and motion sensors
//! concurrently must serialize calls or run independent sessions.

pub mod calibration;
pub mod config;
pub mod form;
pub mod machine;
pub mod motion;
pub mod session;

pub use calibration::*;
pub use config::*;
pub use form::*;
pub use machine::*;
pub use motion::*;
pub use session::*;
