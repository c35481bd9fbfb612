//! Typed property values and their wire codec.
//!
//! Property payloads cross the dispatch boundary as untyped byte slots sized
//! per type. Scalar types serialize little-endian in place; text, format
//! descriptors, and other reference-typed payloads serialize as an 8-byte
//! [`RawHandle`] token minted by the registry's handle table, mirroring the
//! transfer of a retained reference through an opaque slot. Handle-typed
//! slots only flow outward: encoding them is supported, decoding them
//! reports [`CameraError::Unsupported`](crate::CameraError::Unsupported)
//! rather than crashing.

use crate::error::{CameraError, Result};

/// Property value types with fixed wire sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Text payload, carried as a retained handle token.
    Text,
    /// 32-bit unsigned integer.
    UInt32,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit floating point.
    Float64,
    /// Numeric min/max pair.
    Range,
    /// Opaque reference-typed payload (format descriptor, clock).
    Handle,
    /// Reference to an array of handles.
    HandleList,
}

impl PropertyType {
    /// Returns the size in bytes of this type's wire representation.
    ///
    /// Sizes vary by type, never by instance; handle-carried types are all
    /// token-sized.
    pub const fn size(&self) -> usize {
        match self {
            PropertyType::UInt32 | PropertyType::Int32 => 4,
            PropertyType::Float64 => 8,
            PropertyType::Range => 16,
            PropertyType::Text | PropertyType::Handle | PropertyType::HandleList => 8,
        }
    }

    /// Whether values of this type can be decoded back from a byte slot.
    ///
    /// Only scalar types round-trip; handle-carried types are read-only.
    pub const fn is_decodable(&self) -> bool {
        matches!(
            self,
            PropertyType::UInt32 | PropertyType::Int32 | PropertyType::Float64 | PropertyType::Range
        )
    }
}

/// Inclusive numeric range, used for frame-rate range properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ValueRange { min, max }
    }
}

/// Token standing for a retained reference-typed payload.
///
/// Tokens are minted by the registry's handle table at object construction
/// and stay valid for process lifetime (registry objects are never
/// destroyed). Zero is never a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub u64);

impl RawHandle {
    /// Whether this token could have been minted by a handle table.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for RawHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Runtime value for one property slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(RawHandle),
    UInt32(u32),
    Int32(i32),
    Float64(f64),
    Range(ValueRange),
    Handle(RawHandle),
    HandleList(RawHandle),
}

impl PropertyValue {
    /// The wire type of this value.
    pub const fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Text(_) => PropertyType::Text,
            PropertyValue::UInt32(_) => PropertyType::UInt32,
            PropertyValue::Int32(_) => PropertyType::Int32,
            PropertyValue::Float64(_) => PropertyType::Float64,
            PropertyValue::Range(_) => PropertyType::Range,
            PropertyValue::Handle(_) => PropertyType::Handle,
            PropertyValue::HandleList(_) => PropertyType::HandleList,
        }
    }

    /// Serialized size of this value in bytes.
    pub const fn wire_size(&self) -> usize {
        self.property_type().size()
    }

    /// Encodes this value into `dest`, writing exactly [`wire_size`] bytes.
    ///
    /// Handle-carried values write their token; the referent stays retained
    /// by the registry. Returns the number of bytes written.
    ///
    /// [`wire_size`]: PropertyValue::wire_size
    pub fn encode_into(&self, dest: &mut [u8]) -> Result<usize> {
        let needed = self.wire_size();
        if dest.len() < needed {
            return Err(CameraError::short_buffer(needed, dest.len()));
        }
        match self {
            PropertyValue::UInt32(v) => dest[..4].copy_from_slice(&v.to_le_bytes()),
            PropertyValue::Int32(v) => dest[..4].copy_from_slice(&v.to_le_bytes()),
            PropertyValue::Float64(v) => dest[..8].copy_from_slice(&v.to_le_bytes()),
            PropertyValue::Range(r) => {
                dest[..8].copy_from_slice(&r.min.to_le_bytes());
                dest[8..16].copy_from_slice(&r.max.to_le_bytes());
            }
            PropertyValue::Text(h) | PropertyValue::Handle(h) | PropertyValue::HandleList(h) => {
                dest[..8].copy_from_slice(&h.0.to_le_bytes());
            }
        }
        Ok(needed)
    }

    /// Decodes a value of type `ty` from the leading bytes of `src`.
    ///
    /// Only scalar types decode; handle-carried types are read-only and
    /// report `Unsupported`.
    pub fn decode(ty: PropertyType, src: &[u8]) -> Result<PropertyValue> {
        if !ty.is_decodable() {
            return Err(CameraError::unsupported(format!(
                "decode of read-only {:?} property values",
                ty
            )));
        }
        let needed = ty.size();
        let bytes = src
            .get(..needed)
            .ok_or_else(|| CameraError::short_buffer(needed, src.len()))?;
        let value = match ty {
            PropertyType::UInt32 => {
                PropertyValue::UInt32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            PropertyType::Int32 => {
                PropertyValue::Int32(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            PropertyType::Float64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                PropertyValue::Float64(f64::from_le_bytes(raw))
            }
            PropertyType::Range => {
                let mut min = [0u8; 8];
                let mut max = [0u8; 8];
                min.copy_from_slice(&bytes[..8]);
                max.copy_from_slice(&bytes[8..16]);
                PropertyValue::Range(ValueRange::new(f64::from_le_bytes(min), f64::from_le_bytes(max)))
            }
            PropertyType::Text | PropertyType::Handle | PropertyType::HandleList => unreachable!(),
        };
        Ok(value)
    }

    /// Returns the contained u32, if this is a `UInt32` value.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PropertyValue::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained i32, if this is an `Int32` value.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            PropertyValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained f64, if this is a `Float64` value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained range, if this is a `Range` value.
    pub fn as_range(&self) -> Option<ValueRange> {
        match self {
            PropertyValue::Range(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the handle token for any handle-carried value.
    pub fn as_handle(&self) -> Option<RawHandle> {
        match self {
            PropertyValue::Text(h) | PropertyValue::Handle(h) | PropertyValue::HandleList(h) => {
                Some(*h)
            }
            _ => None,
        }
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        PropertyValue::UInt32(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int32(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float64(v)
    }
}

impl From<ValueRange> for PropertyValue {
    fn from(v: ValueRange) -> Self {
        PropertyValue::Range(v)
    }
}
