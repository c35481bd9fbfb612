//! Person detection boundary.
//!
//! Detectors are synchronous, CPU-bound, and pluggable; the pipeline runs
//! them off the worker task via `spawn_blocking`. The boundary uses
//! [`anyhow::Result`] so implementations can surface whatever their backend
//! produces without this crate modeling every failure shape.
//!
//! Detection fails open: an erroring detector is logged and treated as "no
//! person", because a broken detector must never freeze the video pipeline.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::types::CapturedFrame;

mod luma;

pub use luma::LumaDeltaDetector;

/// Outcome of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceReport {
    /// Whether a person was found in the frame.
    pub person_present: bool,
    /// Detector-defined confidence in `[0, 1]`.
    pub confidence: f32,
}

impl PresenceReport {
    /// Report a person with the given confidence.
    pub fn detected(confidence: f32) -> Self {
        Self { person_present: true, confidence }
    }

    /// Report no person.
    pub fn clear() -> Self {
        Self { person_present: false, confidence: 0.0 }
    }
}

/// A pluggable person detector.
///
/// `detect` takes `&mut self` so implementations can carry state between
/// frames (baselines, rolling averages) without interior locking.
pub trait Detector: Send {
    /// Short diagnostic name, e.g. `"luma-delta"`.
    fn name(&self) -> &str;

    /// Examine one frame for a person.
    fn detect(&mut self, frame: &CapturedFrame) -> anyhow::Result<PresenceReport>;
}

/// Run one detection pass, failing open on error.
pub fn evaluate_fail_open(detector: &Mutex<dyn Detector>, frame: &CapturedFrame) -> PresenceReport {
    let mut guard = detector.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.detect(frame) {
        Ok(report) => report,
        Err(error) => {
            warn!(
                detector = guard.name(),
                error = %error,
                "detector failed, treating frame as clear"
            );
            PresenceReport::clear()
        }
    }
}
