//! The stream clock.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::{MediaTime, timebase_for_rate};

/// Publication point for frame presentation timestamps.
///
/// The worker posts each produced frame's presentation time here; hosts
/// resolve the stream's clock handle and read the last posted time to align
/// time-based reads with emitted frames. The timescale is fixed at
/// construction from the stream's frame rate.
#[derive(Debug)]
pub struct StreamClock {
    name: String,
    timescale: u32,
    last_ticks: AtomicI64,
}

impl StreamClock {
    /// Clock for a stream running at `frame_rate`.
    pub fn new(name: impl Into<String>, frame_rate: f64) -> Self {
        Self {
            name: name.into(),
            timescale: timebase_for_rate(frame_rate),
            last_ticks: AtomicI64::new(0),
        }
    }

    /// Diagnostic name, e.g. `"Camveil clock"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticks per second of posted timestamps.
    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    /// Post a frame's presentation timestamp.
    pub fn post(&self, time: MediaTime) {
        debug_assert_eq!(time.timescale, self.timescale, "posted time uses a foreign timescale");
        self.last_ticks.store(time.value, Ordering::Release);
    }

    /// The most recently posted timestamp, zero before the first post.
    pub fn last_posted(&self) -> MediaTime {
        MediaTime::new(self.last_ticks.load(Ordering::Acquire), self.timescale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameTiming;

    #[test]
    fn timescale_derives_from_the_frame_rate() {
        let clock = StreamClock::new("Camveil clock", 30.0);
        assert_eq!(clock.timescale(), 3000);
        assert_eq!(clock.name(), "Camveil clock");
    }

    #[test]
    fn posted_timestamps_are_readable() {
        let clock = StreamClock::new("test clock", 30.0);
        assert_eq!(clock.last_posted().value, 0);

        let timing = FrameTiming::for_sequence(12, 30.0);
        clock.post(timing.presentation);

        let read = clock.last_posted();
        assert_eq!(read.value, 1200);
        assert_eq!(read.timescale, 3000);
        assert!((read.as_seconds() - 0.4).abs() < 1e-9);
    }
}
