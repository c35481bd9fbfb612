//! Synthetic capture source producing a paced test pattern.

use std::sync::Arc;

use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::debug;

use crate::Result;
use crate::config::CameraConfig;
use crate::source::{CaptureOpener, CaptureSource};
use crate::types::{CapturedFrame, PixelFormat, StreamFormat};

/// Infinite source rendering a slowly shifting gradient.
///
/// Frames are paced at the format's rate with missed ticks skipped, so a
/// stalled consumer gets the next on-cadence frame rather than a burst. The
/// gradient drifts one step per frame, which keeps successive frames
/// distinct without tripping motion-based detectors.
pub struct SyntheticSource {
    format: StreamFormat,
    interval: Interval,
    phase: u64,
}

impl SyntheticSource {
    /// Source producing frames in `format` at its nominal rate.
    pub fn new(format: StreamFormat) -> Self {
        let period = Duration::from_secs_f64(1.0 / format.frame_rate);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            width = format.width,
            height = format.height,
            rate = format.frame_rate,
            "synthetic source created"
        );
        Self { format, interval, phase: 0 }
    }

    fn render(&self) -> Arc<[u8]> {
        let width = self.format.width as usize;
        let mut data = vec![0u8; self.format.frame_bytes()];
        let (r_off, g_off, b_off, a_off) = channel_offsets(self.format.pixel_format);
        let drift = (self.phase % 256) as u8;

        for (i, px) in data.chunks_exact_mut(4).enumerate() {
            let x = (i % width) as u8;
            let y = (i / width) as u8;
            px[b_off] = x;
            px[g_off] = y;
            px[r_off] = drift;
            px[a_off] = 0xFF;
        }
        Arc::from(data)
    }
}

#[async_trait::async_trait]
impl CaptureSource for SyntheticSource {
    async fn next_frame(&mut self) -> Result<Option<CapturedFrame>> {
        self.interval.tick().await;

        let data = self.render();
        self.phase = self.phase.wrapping_add(1);

        Ok(Some(CapturedFrame {
            data,
            width: self.format.width,
            height: self.format.height,
            pixel_format: self.format.pixel_format,
        }))
    }

    fn frame_rate(&self) -> f64 {
        self.format.frame_rate
    }
}

fn channel_offsets(format: PixelFormat) -> (usize, usize, usize, usize) {
    match format {
        PixelFormat::Bgra32 => (2, 1, 0, 3),
        PixelFormat::Argb32 => (1, 2, 3, 0),
    }
}

/// Opener that always yields a [`SyntheticSource`].
///
/// The out-of-the-box opener: hosts with a real capture stack inject their
/// own [`CaptureOpener`] at initialization.
#[derive(Debug, Clone)]
pub struct SyntheticOpener {
    format: StreamFormat,
}

impl SyntheticOpener {
    /// Opener producing sources in `format`.
    pub fn new(format: StreamFormat) -> Self {
        Self { format }
    }
}

impl Default for SyntheticOpener {
    fn default() -> Self {
        Self::new(CameraConfig::default().stream_format())
    }
}

impl CaptureOpener for SyntheticOpener {
    fn open_default(&self) -> Option<Box<dyn CaptureSource>> {
        Some(Box::new(SyntheticSource::new(self.format.clone())))
    }
}
