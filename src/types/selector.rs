//! Property addressing for registry objects.
//!
//! Every property on every object is keyed by a [`Selector`] built from a
//! four-character code, the conventional key space for device-property
//! models. The well-known selectors for the plugin root, the device, and the
//! stream are defined here as constants; hosts can extend the space with
//! their own codes without touching this module.

use std::fmt;

/// Address of one property on one registry object.
///
/// Opaque to the dispatch layer: objects treat unknown selectors as absent
/// rather than invalid, so hosts probing with foreign selectors degrade
/// gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub u32);

impl Selector {
    /// Builds a selector from a four-character code, e.g. `b"name"`.
    pub const fn from_fourcc(tag: &[u8; 4]) -> Self {
        Selector(u32::from_be_bytes(*tag))
    }

    /// Raw numeric value of this selector.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            let tag: String = bytes.iter().map(|b| *b as char).collect();
            write!(f, "'{}'", tag)
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

// Selectors shared by every object variant.

/// Human-readable object name (text).
pub const OBJECT_NAME: Selector = Selector::from_fourcc(b"name");
/// Manufacturer string (text). Device only in the reference tables.
pub const OBJECT_MANUFACTURER: Selector = Selector::from_fourcc(b"manu");

// Device selectors.

/// Stable unique identifier for the device (text).
pub const DEVICE_UID: Selector = Selector::from_fourcc(b"duid");
/// Model identifier (text).
pub const DEVICE_MODEL_UID: Selector = Selector::from_fourcc(b"muid");
/// Transport type code (u32, a fourcc value).
pub const DEVICE_TRANSPORT_TYPE: Selector = Selector::from_fourcc(b"tran");
/// Liveness flag (u32, constant 1 for a virtual device).
pub const DEVICE_IS_ALIVE: Selector = Selector::from_fourcc(b"aliv");
/// Whether this process is streaming the device (u32, computed).
pub const DEVICE_IS_RUNNING: Selector = Selector::from_fourcc(b"runn");
/// Whether any process is streaming the device (u32, computed).
pub const DEVICE_IS_RUNNING_SOMEWHERE: Selector = Selector::from_fourcc(b"runs");
/// Eligibility as a default capture device (u32).
pub const DEVICE_CAN_BE_DEFAULT: Selector = Selector::from_fourcc(b"dflt");
/// Identifier of the process holding exclusive ownership, -1 when free (i32).
pub const DEVICE_HOG_MODE: Selector = Selector::from_fourcc(b"hogm");
/// Settable flag excluding pass-through host access (u32, 0/1).
pub const DEVICE_EXCLUSIVE_ACCESS: Selector = Selector::from_fourcc(b"excl");
/// Settable control-master token, -1 when unclaimed (i32).
pub const DEVICE_CONTROL_MASTER: Selector = Selector::from_fourcc(b"mstr");
/// Identifier of the device's stream (u32, backfilled at initialization).
pub const DEVICE_STREAMS: Selector = Selector::from_fourcc(b"strm");

// Stream selectors.

/// Data flow direction (u32, 0 = device to host).
pub const STREAM_DIRECTION: Selector = Selector::from_fourcc(b"sdir");
/// Active format descriptor (handle).
pub const STREAM_FORMAT: Selector = Selector::from_fourcc(b"sfmt");
/// Supported format descriptors (handle to an array).
pub const STREAM_FORMAT_LIST: Selector = Selector::from_fourcc(b"sfml");
/// Nominal frame rate (f64).
pub const STREAM_FRAME_RATE: Selector = Selector::from_fourcc(b"frat");
/// Supported frame rate; one rate is published in this design (f64).
pub const STREAM_FRAME_RATE_LIST: Selector = Selector::from_fourcc(b"frls");
/// Minimum sustainable frame rate (f64).
pub const STREAM_MINIMUM_FRAME_RATE: Selector = Selector::from_fourcc(b"mfrt");
/// Supported frame-rate range (range; min = max here).
pub const STREAM_FRAME_RATE_RANGES: Selector = Selector::from_fourcc(b"frrg");
/// The stream's clock (handle).
pub const STREAM_CLOCK: Selector = Selector::from_fourcc(b"clck");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_roundtrip_is_big_endian() {
        let sel = Selector::from_fourcc(b"name");
        assert_eq!(sel.as_u32(), 0x6e61_6d65);
    }

    #[test]
    fn display_renders_printable_tags() {
        assert_eq!(OBJECT_NAME.to_string(), "'name'");
        assert_eq!(STREAM_FRAME_RATE.to_string(), "'frat'");
    }

    #[test]
    fn display_falls_back_to_hex_for_unprintable_tags() {
        let sel = Selector(0x0000_0001);
        assert_eq!(sel.to_string(), "0x00000001");
    }

    #[test]
    fn well_known_selectors_are_distinct() {
        let all = [
            OBJECT_NAME,
            OBJECT_MANUFACTURER,
            DEVICE_UID,
            DEVICE_MODEL_UID,
            DEVICE_TRANSPORT_TYPE,
            DEVICE_IS_ALIVE,
            DEVICE_IS_RUNNING,
            DEVICE_IS_RUNNING_SOMEWHERE,
            DEVICE_CAN_BE_DEFAULT,
            DEVICE_HOG_MODE,
            DEVICE_EXCLUSIVE_ACCESS,
            DEVICE_CONTROL_MASTER,
            DEVICE_STREAMS,
            STREAM_DIRECTION,
            STREAM_FORMAT,
            STREAM_FORMAT_LIST,
            STREAM_FRAME_RATE,
            STREAM_FRAME_RATE_LIST,
            STREAM_MINIMUM_FRAME_RATE,
            STREAM_FRAME_RATE_RANGES,
            STREAM_CLOCK,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b, "selector collision between {} and {}", a, b);
            }
        }
    }
}
