//! Frame-differencing detector over downsampled luminance.

use super::{Detector, PresenceReport};
use crate::types::{CapturedFrame, PixelFormat};

/// Cells per grid axis.
const GRID_SIZE: usize = 16;
/// Pixel sampling stride within a frame.
const SAMPLE_STRIDE: usize = 4;
/// Mean-luminance delta (0..255 scale) that marks a cell as changed.
const DEFAULT_CELL_THRESHOLD: f32 = 12.0;
/// Fraction of changed cells that flags a person.
const DEFAULT_TRIGGER_FRACTION: f32 = 0.2;

/// Detects presence by comparing each frame's luminance grid to the last.
///
/// Frames are reduced to a 16x16 grid of mean luminance values; a frame
/// whose grid differs from its predecessor in enough cells is taken as a
/// person entering or moving through the scene. Crude next to a trained
/// model, but dependency-free and cheap enough to run on every frame. The
/// first frame after construction or a geometry change only seeds the
/// baseline and never triggers.
#[derive(Debug)]
pub struct LumaDeltaDetector {
    cell_threshold: f32,
    trigger_fraction: f32,
    previous: Option<Vec<f32>>,
    previous_geometry: (u32, u32),
}

impl LumaDeltaDetector {
    /// Detector with the default sensitivity.
    pub fn new() -> Self {
        Self::with_sensitivity(DEFAULT_CELL_THRESHOLD, DEFAULT_TRIGGER_FRACTION)
    }

    /// Detector with explicit per-cell threshold and trigger fraction.
    pub fn with_sensitivity(cell_threshold: f32, trigger_fraction: f32) -> Self {
        Self {
            cell_threshold,
            trigger_fraction,
            previous: None,
            previous_geometry: (0, 0),
        }
    }

    fn luma_grid(&self, frame: &CapturedFrame) -> Vec<f32> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let bpp = frame.pixel_format.bytes_per_pixel();
        let (r_off, g_off, b_off) = rgb_offsets(frame.pixel_format);

        let mut sums = vec![0.0f32; GRID_SIZE * GRID_SIZE];
        let mut counts = vec![0u32; GRID_SIZE * GRID_SIZE];

        for y in (0..height).step_by(SAMPLE_STRIDE) {
            let cell_row = y * GRID_SIZE / height;
            for x in (0..width).step_by(SAMPLE_STRIDE) {
                let cell_col = x * GRID_SIZE / width;
                let base = (y * width + x) * bpp;
                let r = frame.data[base + r_off] as f32;
                let g = frame.data[base + g_off] as f32;
                let b = frame.data[base + b_off] as f32;
                let luma = 0.299 * r + 0.587 * g + 0.114 * b;

                let cell = cell_row * GRID_SIZE + cell_col;
                sums[cell] += luma;
                counts[cell] += 1;
            }
        }

        sums.iter()
            .zip(&counts)
            .map(|(sum, count)| if *count == 0 { 0.0 } else { sum / *count as f32 })
            .collect()
    }
}

impl Default for LumaDeltaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LumaDeltaDetector {
    fn name(&self) -> &str {
        "luma-delta"
    }

    fn detect(&mut self, frame: &CapturedFrame) -> anyhow::Result<PresenceReport> {
        let expected = frame.width as usize
            * frame.height as usize
            * frame.pixel_format.bytes_per_pixel();
        anyhow::ensure!(
            frame.data.len() >= expected,
            "frame payload is {} bytes, {}x{} {:?} needs {}",
            frame.data.len(),
            frame.width,
            frame.height,
            frame.pixel_format,
            expected
        );
        anyhow::ensure!(frame.width > 0 && frame.height > 0, "frame has zero geometry");

        let grid = self.luma_grid(frame);
        let geometry = (frame.width, frame.height);

        let report = match &self.previous {
            Some(previous) if self.previous_geometry == geometry => {
                let changed = previous
                    .iter()
                    .zip(&grid)
                    .filter(|(a, b)| (**a - **b).abs() > self.cell_threshold)
                    .count();
                let fraction = changed as f32 / grid.len() as f32;
                if fraction >= self.trigger_fraction {
                    PresenceReport::detected(fraction.min(1.0))
                } else {
                    PresenceReport::clear()
                }
            }
            _ => PresenceReport::clear(),
        };

        self.previous = Some(grid);
        self.previous_geometry = geometry;
        Ok(report)
    }
}

fn rgb_offsets(format: PixelFormat) -> (usize, usize, usize) {
    match format {
        PixelFormat::Bgra32 => (2, 1, 0),
        PixelFormat::Argb32 => (1, 2, 3),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn solid_frame(level: u8) -> CapturedFrame {
        let mut data = vec![level; 64 * 64 * 4];
        // Opaque alpha so the payload resembles real capture output.
        for px in data.chunks_exact_mut(4) {
            px[3] = 0xFF;
        }
        CapturedFrame {
            data: Arc::from(data),
            width: 64,
            height: 64,
            pixel_format: PixelFormat::Bgra32,
        }
    }

    #[test]
    fn first_frame_seeds_the_baseline_without_triggering() {
        let mut detector = LumaDeltaDetector::new();
        let report = detector.detect(&solid_frame(200)).unwrap();
        assert!(!report.person_present);
    }

    #[test]
    fn identical_frames_stay_clear() {
        let mut detector = LumaDeltaDetector::new();
        detector.detect(&solid_frame(128)).unwrap();
        let report = detector.detect(&solid_frame(128)).unwrap();
        assert!(!report.person_present);
    }

    #[test]
    fn scene_wide_brightness_jump_triggers() {
        let mut detector = LumaDeltaDetector::new();
        detector.detect(&solid_frame(20)).unwrap();
        let report = detector.detect(&solid_frame(220)).unwrap();
        assert!(report.person_present);
        assert!(report.confidence > 0.9, "every cell changed, confidence {}", report.confidence);
    }

    #[test]
    fn small_local_change_stays_below_the_trigger() {
        let mut detector = LumaDeltaDetector::new();
        detector.detect(&solid_frame(50)).unwrap();

        // Brighten a single 4x4 corner patch, far under 20% of cells.
        let mut frame = solid_frame(50);
        let mut data = frame.data.to_vec();
        for y in 0..4 {
            for x in 0..4 {
                let base = (y * 64 + x) * 4;
                data[base] = 250;
                data[base + 1] = 250;
                data[base + 2] = 250;
            }
        }
        frame.data = Arc::from(data);

        let report = detector.detect(&frame).unwrap();
        assert!(!report.person_present);
    }

    #[test]
    fn geometry_change_reseeds_instead_of_comparing() {
        let mut detector = LumaDeltaDetector::new();
        detector.detect(&solid_frame(20)).unwrap();

        let small = CapturedFrame {
            data: Arc::from(vec![220u8; 32 * 32 * 4]),
            width: 32,
            height: 32,
            pixel_format: PixelFormat::Bgra32,
        };
        let report = detector.detect(&small).unwrap();
        assert!(!report.person_present, "geometry change must reseed the baseline");
    }

    #[test]
    fn undersized_payload_is_an_error() {
        let mut detector = LumaDeltaDetector::new();
        let bad = CapturedFrame {
            data: Arc::from(vec![0u8; 16]),
            width: 64,
            height: 64,
            pixel_format: PixelFormat::Bgra32,
        };
        assert!(detector.detect(&bad).is_err());
    }
}
