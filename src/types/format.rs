//! Stream format descriptors.

use serde::{Deserialize, Serialize};

/// Pixel layouts the virtual device can publish.
///
/// Both layouts are 32 bits per pixel; the variants differ only in channel
/// order. Blank (masked) frames are all-zero bytes in either layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Blue, green, red, alpha byte order.
    Bgra32,
    /// Alpha, red, green, blue byte order.
    Argb32,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    pub const fn bytes_per_pixel(&self) -> usize {
        4
    }

    /// Four-character code identifying this layout on the wire.
    pub const fn fourcc(&self) -> u32 {
        match self {
            PixelFormat::Bgra32 => u32::from_be_bytes(*b"BGRA"),
            PixelFormat::Argb32 => u32::from_be_bytes(*b"ARGB"),
        }
    }
}

/// One publishable stream format: dimensions, pixel layout, nominal rate.
///
/// The active format and the supported-format list are exposed to hosts as
/// handle-valued properties resolving to this descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub frame_rate: f64,
}

impl StreamFormat {
    /// Size in bytes of one uncompressed frame in this format.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.bytes_per_pixel()
    }
}
