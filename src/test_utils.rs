//! Shared utilities for tests and benchmarks.
//!
//! Scripted capture sources and detectors for exercising the pipeline
//! without a real camera, plus small frame and config builders.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

use crate::Result;
use crate::config::CameraConfig;
use crate::detect::{Detector, PresenceReport};
use crate::source::{CaptureOpener, CaptureSource};
use crate::types::{CapturedFrame, PixelFormat};

/// Small, fast configuration for pipeline tests.
///
/// Tiny geometry, a short cooldown tick, and a small error budget keep
/// whole start/detect/expire cycles inside a few hundred milliseconds.
pub fn test_config() -> CameraConfig {
    CameraConfig {
        width: 16,
        height: 12,
        queue_capacity: 8,
        cooldown_ticks: 3,
        tick_interval_secs: 0.05,
        source_error_budget: 3,
        ..CameraConfig::default()
    }
}

/// A solid-color BGRA frame in the given geometry.
pub fn solid_capture(width: u32, height: u32, level: u8) -> CapturedFrame {
    let mut data = vec![level; width as usize * height as usize * 4];
    for px in data.chunks_exact_mut(4) {
        px[3] = 0xFF;
    }
    CapturedFrame { data: Arc::from(data), width, height, pixel_format: PixelFormat::Bgra32 }
}

/// What a [`ManualSource`] should do on its next read.
pub enum Feed {
    /// Deliver this frame.
    Frame(CapturedFrame),
    /// Fail the read.
    Error(crate::CameraError),
    /// End the stream.
    End,
}

/// Test handle that scripts a [`ManualSource`] frame by frame.
#[derive(Clone)]
pub struct ManualHandle {
    tx: mpsc::UnboundedSender<Feed>,
}

impl ManualHandle {
    /// Queue a frame for delivery.
    pub fn frame(&self, frame: CapturedFrame) {
        let _ = self.tx.send(Feed::Frame(frame));
    }

    /// Queue a read failure.
    pub fn error(&self, error: crate::CameraError) {
        let _ = self.tx.send(Feed::Error(error));
    }

    /// Queue a normal end of stream.
    pub fn end(&self) {
        let _ = self.tx.send(Feed::End);
    }
}

/// Capture source fed explicitly from the test body.
///
/// `next_frame` waits for whatever the [`ManualHandle`] sends next, so the
/// test controls exactly when the pipeline sees each frame. Dropping every
/// handle ends the stream.
pub struct ManualSource {
    rx: mpsc::UnboundedReceiver<Feed>,
    frame_rate: f64,
}

impl ManualSource {
    /// A source and the handle that feeds it.
    pub fn channel(frame_rate: f64) -> (ManualHandle, ManualSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ManualHandle { tx }, ManualSource { rx, frame_rate })
    }
}

#[async_trait::async_trait]
impl CaptureSource for ManualSource {
    async fn next_frame(&mut self) -> Result<Option<CapturedFrame>> {
        match self.rx.recv().await {
            Some(Feed::Frame(frame)) => Ok(Some(frame)),
            Some(Feed::Error(error)) => Err(error),
            Some(Feed::End) | None => Ok(None),
        }
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

/// Opener yielding a single prepared [`ManualSource`].
///
/// The first open hands out the source; later opens report no device.
pub struct ManualOpener {
    source: std::sync::Mutex<Option<ManualSource>>,
}

impl ManualOpener {
    pub fn new(source: ManualSource) -> Self {
        Self { source: std::sync::Mutex::new(Some(source)) }
    }
}

impl CaptureOpener for ManualOpener {
    fn open_default(&self) -> Option<Box<dyn CaptureSource>> {
        self.source
            .lock()
            .expect("manual opener poisoned")
            .take()
            .map(|source| Box::new(source) as Box<dyn CaptureSource>)
    }
}

/// Opener that never finds a device.
pub struct UnavailableOpener;

impl CaptureOpener for UnavailableOpener {
    fn open_default(&self) -> Option<Box<dyn CaptureSource>> {
        None
    }
}

/// Detector that answers from a prepared script.
///
/// Each call pops the next scripted answer; once the script runs dry every
/// further frame reads as clear. A shared call counter lets tests assert
/// how often the pipeline actually ran detection.
pub struct ScriptedDetector {
    script: VecDeque<bool>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    /// Detector answering `script` in order, then clear forever.
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self { script: script.into_iter().collect(), calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Detector that always answers clear.
    pub fn always_clear() -> Self {
        Self::new([])
    }

    /// Shared counter of detection calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn detect(&mut self, _frame: &CapturedFrame) -> anyhow::Result<PresenceReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(true) => Ok(PresenceReport::detected(1.0)),
            Some(false) | None => Ok(PresenceReport::clear()),
        }
    }
}

/// Detector whose every call fails, for fail-open coverage.
pub struct FailingDetector {
    calls: Arc<AtomicUsize>,
}

impl FailingDetector {
    pub fn new() -> Self {
        Self { calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Shared counter of detection calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for FailingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FailingDetector {
    fn name(&self) -> &str {
        "failing"
    }

    fn detect(&mut self, _frame: &CapturedFrame) -> anyhow::Result<PresenceReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("scripted detector failure")
    }
}
