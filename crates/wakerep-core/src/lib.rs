//! # wakerep-core
//!
//! Core types and utilities for the wakerep "wake up and exercise"
//! repetition-detection engine: body landmark and motion sample types,
//! planar geometry helpers, and the workout-log contract the engine
//! hands its results to.
//!
//! This crate holds no detection logic. The analyzers and the
//! repetition state machine live in `wakerep-detect`.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
