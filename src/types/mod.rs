//! Core types for property addressing, the value codec, formats, and frames.
//!
//! This module provides the foundational data structures shared by the
//! object registry and the capture pipeline:
//!
//! - [`Selector`] addresses one property on one object (fourcc key space)
//! - [`PropertyValue`] and [`PropertyType`] form the typed wire codec for
//!   property slots (scalars in place, reference payloads as handle tokens)
//! - [`StreamFormat`] and [`PixelFormat`] describe publishable video formats
//! - [`VideoFrame`] is the zero-copy unit flowing queue-ward, stamped with
//!   [`FrameTiming`] rationals in a fixed per-stream time-base
//!
//! ## Performance Characteristics
//!
//! - O(1) property lookup via selector-keyed maps
//! - Zero-copy frame sharing via Arc
//! - Bounds checking on every slot encode/decode
//!
//! ## Usage Example
//!
//! ```rust
//! use camveil::types::{PropertyType, PropertyValue};
//!
//! let value = PropertyValue::Float64(30.0);
//! let mut slot = vec![0u8; value.wire_size()];
//! value.encode_into(&mut slot)?;
//!
//! let decoded = PropertyValue::decode(PropertyType::Float64, &slot)?;
//! assert_eq!(decoded.as_f64(), Some(30.0));
//! # Ok::<(), camveil::CameraError>(())
//! ```

mod format;
mod frame;
pub mod selector;
mod value;

// Re-export all public types
pub use format::{PixelFormat, StreamFormat};
pub use frame::{CapturedFrame, FrameTiming, MediaTime, VideoFrame, timebase_for_rate};
pub use selector::Selector;
pub use value::{PropertyType, PropertyValue, RawHandle, ValueRange};

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::error::CameraError;

    // Property test strategies
    prop_compose! {
        fn arb_decodable_value()(
            choice in 0..4usize,
            unsigned in any::<u32>(),
            signed in any::<i32>(),
            float in -1.0e12f64..1.0e12f64,
            low in -1.0e6f64..1.0e6f64,
            span in 0.0f64..1.0e6f64
        ) -> PropertyValue {
            match choice {
                0 => PropertyValue::UInt32(unsigned),
                1 => PropertyValue::Int32(signed),
                2 => PropertyValue::Float64(float),
                _ => PropertyValue::Range(ValueRange::new(low, low + span)),
            }
        }
    }

    prop_compose! {
        fn arb_handle_value()(
            choice in 0..3usize,
            token in 1u64..u64::MAX
        ) -> PropertyValue {
            match choice {
                0 => PropertyValue::Text(RawHandle(token)),
                1 => PropertyValue::Handle(RawHandle(token)),
                _ => PropertyValue::HandleList(RawHandle(token)),
            }
        }
    }

    proptest! {

        #[test]
        fn prop_decodable_values_roundtrip_exactly(value in arb_decodable_value()) {
            // Scalar and range slots decode back to the encoded value
            let mut slot = vec![0u8; value.wire_size()];
            let written = value.encode_into(&mut slot).unwrap();
            prop_assert_eq!(written, value.wire_size());

            let decoded = PropertyValue::decode(value.property_type(), &slot).unwrap();
            prop_assert_eq!(decoded, value);
        }

        #[test]
        fn prop_encoded_size_always_matches_declared_size(
            value in prop_oneof![arb_decodable_value(), arb_handle_value()]
        ) {
            // Size depends on the type alone, never on the instance
            let mut slot = vec![0u8; 16];
            let written = value.encode_into(&mut slot).unwrap();
            prop_assert_eq!(written, value.property_type().size());
            prop_assert_eq!(value.wire_size(), value.property_type().size());
        }

        #[test]
        fn prop_undersized_slots_are_rejected_not_truncated(
            value in prop_oneof![arb_decodable_value(), arb_handle_value()],
            shortfall in 1usize..8usize
        ) {
            let size = value.wire_size();
            prop_assume!(shortfall <= size);
            let mut slot = vec![0u8; size - shortfall];

            let err = value.encode_into(&mut slot).unwrap_err();
            match err {
                CameraError::ShortBuffer { needed, got } => {
                    prop_assert_eq!(needed, size);
                    prop_assert_eq!(got, size - shortfall);
                }
                other => prop_assert!(false, "expected ShortBuffer, got {:?}", other),
            }
        }

        #[test]
        fn prop_handle_typed_slots_never_decode(
            value in arb_handle_value(),
            padding in 8usize..32usize
        ) {
            // Read-only reference payloads fail fast instead of crashing
            let slot = vec![0u8; padding];
            let err = PropertyValue::decode(value.property_type(), &slot).unwrap_err();
            prop_assert!(
                matches!(err, CameraError::Unsupported { .. }),
                "expected Unsupported, got {:?}",
                err
            );
        }

        #[test]
        fn prop_truncated_decode_reports_shortfall(
            value in arb_decodable_value(),
            shortfall in 1usize..8usize
        ) {
            let size = value.wire_size();
            prop_assume!(shortfall <= size);
            let mut slot = vec![0u8; size];
            value.encode_into(&mut slot).unwrap();

            let err = PropertyValue::decode(value.property_type(), &slot[..size - shortfall])
                .unwrap_err();
            prop_assert!(
                matches!(err, CameraError::ShortBuffer { .. }),
                "expected ShortBuffer, got {:?}",
                err
            );
        }

        #[test]
        fn prop_frame_timing_is_linear_in_sequence(
            sequence in 0u64..1_000_000u64,
            rate_centi in 100u32..24000u32
        ) {
            // Timing stays exact: pts = sequence * duration in the time-base
            let rate = rate_centi as f64 / 100.0;
            let timing = FrameTiming::for_sequence(sequence, rate);
            prop_assert_eq!(
                timing.presentation.value,
                timing.duration.value * sequence as i64
            );
            prop_assert_eq!(timing.presentation.timescale, timebase_for_rate(rate));
            prop_assert_eq!(timing.decode, timing.presentation);
        }
    }

    // Unit tests for trivial constructors and pure functions
    #[test]
    fn property_type_size_returns_correct_values() {
        assert_eq!(PropertyType::UInt32.size(), 4);
        assert_eq!(PropertyType::Int32.size(), 4);
        assert_eq!(PropertyType::Float64.size(), 8);
        assert_eq!(PropertyType::Range.size(), 16);
        assert_eq!(PropertyType::Text.size(), 8);
        assert_eq!(PropertyType::Handle.size(), 8);
        assert_eq!(PropertyType::HandleList.size(), 8);
    }

    #[test]
    fn decodability_splits_scalars_from_references() {
        assert!(PropertyType::UInt32.is_decodable());
        assert!(PropertyType::Int32.is_decodable());
        assert!(PropertyType::Float64.is_decodable());
        assert!(PropertyType::Range.is_decodable());
        assert!(!PropertyType::Text.is_decodable());
        assert!(!PropertyType::Handle.is_decodable());
        assert!(!PropertyType::HandleList.is_decodable());
    }

    #[test]
    fn from_conversions_pick_the_expected_variant() {
        assert_eq!(PropertyValue::from(3u32).property_type(), PropertyType::UInt32);
        assert_eq!(PropertyValue::from(-3i32).property_type(), PropertyType::Int32);
        assert_eq!(PropertyValue::from(3.0f64).property_type(), PropertyType::Float64);
        assert_eq!(
            PropertyValue::from(ValueRange::new(1.0, 2.0)).property_type(),
            PropertyType::Range
        );
    }
}
