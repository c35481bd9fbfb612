//! Capture source trait for raw frame acquisition.

use crate::Result;
use crate::types::CapturedFrame;

/// A source of raw video frames.
///
/// Sources abstract over where pixels come from (a physical camera, a test
/// script, a synthetic pattern) and handle their own frame pacing
/// internally.
#[async_trait::async_trait]
pub trait CaptureSource: Send + 'static {
    /// Get the next raw frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - new frame available
    /// - `Ok(None)` - source ended (normal termination)
    /// - `Err(e)` - read failed; the pipeline retries with backoff
    async fn next_frame(&mut self) -> Result<Option<CapturedFrame>>;

    /// Native frame rate in Hz.
    fn frame_rate(&self) -> f64;
}

/// Opens the default capture device, if one exists.
///
/// Injected at initialization so hosts can supply a platform capture stack
/// while tests supply scripted sources.
pub trait CaptureOpener: Send + Sync {
    /// Open the default video source.
    ///
    /// `None` means no capture device is available right now; the stream
    /// absorbs the start request and stays stopped.
    fn open_default(&self) -> Option<Box<dyn CaptureSource>>;
}
