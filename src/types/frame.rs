//! Frame and timing types for the capture pipeline.
//!
//! Frames move through the pipeline as zero-copy [`Arc`] payloads: the
//! worker builds one [`VideoFrame`] per delivered capture, the queue and the
//! monitoring tap share it by reference count, and the host drains it
//! without another copy. Timestamps are rationals in a fixed per-stream
//! time-base so consecutive frames differ by an exact integer duration.

use std::sync::Arc;

use crate::types::format::PixelFormat;

/// Ticks per second used for a stream's time-base at a given frame rate.
///
/// One hundred ticks per frame keeps frame durations integral for any
/// practical rate (30 fps gives a 3000-tick time-base and 100-tick frames).
pub fn timebase_for_rate(frame_rate: f64) -> u32 {
    (frame_rate * 100.0).round() as u32
}

/// Rational timestamp: `value` ticks in a `timescale` ticks-per-second base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: u32,
}

impl MediaTime {
    pub const fn new(value: i64, timescale: u32) -> Self {
        MediaTime { value, timescale }
    }

    /// This timestamp expressed in seconds.
    pub fn as_seconds(&self) -> f64 {
        self.value as f64 / self.timescale as f64
    }
}

/// Presentation/decode timestamps and duration for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub presentation: MediaTime,
    pub decode: MediaTime,
    pub duration: MediaTime,
}

impl FrameTiming {
    /// Timing for sequence slot `sequence` at the stream's fixed rate.
    ///
    /// The presentation timestamp is `sequence * frame duration`; decode
    /// equals presentation (no reordering in an uncompressed stream).
    pub fn for_sequence(sequence: u64, frame_rate: f64) -> Self {
        let timescale = timebase_for_rate(frame_rate);
        let duration_ticks = (timescale as f64 / frame_rate).round() as i64;
        let stamp = MediaTime::new(duration_ticks * sequence as i64, timescale);
        FrameTiming {
            presentation: stamp,
            decode: stamp,
            duration: MediaTime::new(duration_ticks, timescale),
        }
    }
}

/// A raw frame as delivered by a capture source, before timing and masking.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

/// A produced frame moving through the queue to the host.
///
/// `data` is shared, never copied, between the queue, the queue-altered
/// callback, and the monitoring tap. The `Arc<VideoFrame>` itself is the
/// opaque frame handle at the host boundary.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub timing: FrameTiming,
    pub sequence: u64,
}

impl VideoFrame {
    pub fn new(
        data: Arc<[u8]>,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        timing: FrameTiming,
        sequence: u64,
    ) -> Self {
        VideoFrame { data, width, height, pixel_format, timing, sequence }
    }

    /// True when every payload byte is zero, the masked-frame payload.
    ///
    /// An all-zero capture reads as blank too; a monitor that needs
    /// certainty has to track the masking state itself.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_rate_produces_century_ticks() {
        let timing = FrameTiming::for_sequence(0, 30.0);
        assert_eq!(timing.duration.timescale, 3000);
        assert_eq!(timing.duration.value, 100);
        assert_eq!(timing.presentation.value, 0);
    }

    #[test]
    fn presentation_advances_by_duration_per_sequence_slot() {
        let a = FrameTiming::for_sequence(10, 30.0);
        let b = FrameTiming::for_sequence(11, 30.0);
        assert_eq!(b.presentation.value - a.presentation.value, a.duration.value);
        assert_eq!(a.decode, a.presentation);
    }

    #[test]
    fn media_time_converts_to_seconds() {
        let t = MediaTime::new(1500, 3000);
        assert!((t.as_seconds() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_detection_checks_every_byte() {
        let zero: Arc<[u8]> = vec![0u8; 16].into();
        let mut dirty = vec![0u8; 16];
        dirty[15] = 1;
        let dirty: Arc<[u8]> = dirty.into();

        let timing = FrameTiming::for_sequence(0, 30.0);
        let blank = VideoFrame::new(zero, 2, 2, PixelFormat::Bgra32, timing, 0);
        let real = VideoFrame::new(dirty, 2, 2, PixelFormat::Bgra32, timing, 1);
        assert!(blank.is_blank());
        assert!(!real.is_blank());
    }
}
