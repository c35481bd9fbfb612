//! Registry objects and the uniform property-dispatch surface.
//!
//! The registry exposes exactly three object variants: the plugin root, one
//! device, and that device's single video stream. All three answer the same
//! five property operations through [`CameraObject`]; variant-specific
//! behavior (stream lifecycle, device state cells) lives on the concrete
//! types.
//!
//! Unknown selectors degrade per operation (absent, not settable, zero size,
//! no-op) so hosts can probe freely. Unknown object identifiers are the hard
//! failure, surfaced by the registry as [`CameraError::BadObject`].
//!
//! [`CameraError::BadObject`]: crate::CameraError::BadObject

use std::fmt;

use crate::Result;
use crate::types::Selector;

pub mod device;
pub mod handle;
pub mod plugin;
pub mod property;
pub mod registry;
pub mod stream;

pub use device::{DeviceObject, TRANSPORT_VIRTUAL};
pub use handle::{HandleTable, HandleValue};
pub use plugin::PluginObject;
pub use property::{Property, PropertyTable};
pub use registry::{HostRegistrar, ObjectIds, ObjectRegistry, SequentialRegistrar};
pub use stream::{FrameUpdates, StreamObject};

/// Host-assigned identifier for one registry object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Raw numeric value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Zero is reserved as "no object".
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which registry variant an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// The plugin root, parent of the device.
    PluginRoot,
    /// The virtual capture device.
    Device,
    /// The device's video stream.
    Stream,
}

/// Uniform property surface shared by every registry object.
///
/// The five dispatch operations are provided in terms of the object's
/// [`PropertyTable`]; concrete objects only supply identity and the table.
pub trait CameraObject: Send + Sync {
    /// Host-assigned identifier.
    fn object_id(&self) -> ObjectId;

    /// Which variant this object is.
    fn class(&self) -> ObjectClass;

    /// The object's property table.
    fn properties(&self) -> &PropertyTable;

    /// Whether the object publishes `selector`.
    fn has_property(&self, selector: Selector) -> bool {
        self.properties().contains(selector)
    }

    /// Whether `selector` accepts writes. Unknown selectors are not settable.
    fn is_property_settable(&self, selector: Selector) -> bool {
        self.properties().get(selector).is_some_and(Property::is_settable)
    }

    /// Serialized size of the current value, or 0 for unknown selectors.
    fn property_data_size(&self, selector: Selector) -> usize {
        self.properties().get(selector).map_or(0, Property::data_size)
    }

    /// Encode the current value into `dest`, returning the bytes written.
    ///
    /// Unknown selectors write nothing and report zero bytes.
    fn read_property(&self, selector: Selector, dest: &mut [u8]) -> Result<usize> {
        match self.properties().get(selector) {
            Some(property) => property.read_into(dest),
            None => Ok(0),
        }
    }

    /// Decode `src` and apply it to the property.
    ///
    /// Unknown and read-only selectors are silent no-ops; only structurally
    /// invalid payloads error.
    fn write_property(&self, selector: Selector, src: &[u8]) -> Result<()> {
        match self.properties().get(selector) {
            Some(property) => property.write_from(src),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::selector;

    struct Probe {
        id: ObjectId,
        table: PropertyTable,
    }

    impl CameraObject for Probe {
        fn object_id(&self) -> ObjectId {
            self.id
        }

        fn class(&self) -> ObjectClass {
            ObjectClass::PluginRoot
        }

        fn properties(&self) -> &PropertyTable {
            &self.table
        }
    }

    fn probe() -> Probe {
        let mut table = PropertyTable::new();
        table.insert(selector::DEVICE_IS_ALIVE, Property::fixed(1u32));
        Probe { id: ObjectId(7), table }
    }

    #[test]
    fn unknown_selector_degrades_per_operation() {
        let object = probe();
        let foreign = Selector::from_fourcc(b"qqqq");

        assert!(!object.has_property(foreign));
        assert!(!object.is_property_settable(foreign));
        assert_eq!(object.property_data_size(foreign), 0);

        let mut buf = [0xAAu8; 8];
        assert_eq!(object.read_property(foreign, &mut buf).unwrap(), 0);
        assert_eq!(buf, [0xAAu8; 8], "unknown reads must not touch the buffer");

        object.write_property(foreign, &[1, 2, 3, 4]).unwrap();
    }

    #[test]
    fn known_selector_round_trips_through_dispatch() {
        let object = probe();

        assert!(object.has_property(selector::DEVICE_IS_ALIVE));
        assert_eq!(object.property_data_size(selector::DEVICE_IS_ALIVE), 4);

        let mut buf = [0u8; 4];
        let written = object.read_property(selector::DEVICE_IS_ALIVE, &mut buf).unwrap();
        assert_eq!(written, 4);
        assert_eq!(u32::from_le_bytes(buf), 1);
    }

    #[test]
    fn zero_object_id_is_reserved() {
        assert!(!ObjectId(0).is_valid());
        assert!(ObjectId(1).is_valid());
        assert_eq!(ObjectId(12).to_string(), "12");
    }
}
