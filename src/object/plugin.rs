//! The plugin root object.

use super::handle::HandleTable;
use super::property::{Property, PropertyTable};
use super::{CameraObject, ObjectClass, ObjectId};
use crate::types::{PropertyValue, selector};

/// Name published by the plugin root.
pub const PLUGIN_NAME: &str = "camveil plugin";

/// Root of the object hierarchy; parent of the device.
///
/// Publishes a single name property. Everything interesting lives on the
/// device and stream below it.
#[derive(Debug)]
pub struct PluginObject {
    object_id: ObjectId,
    properties: PropertyTable,
}

impl PluginObject {
    /// Build the root with its name retained in `handles`.
    pub fn new(object_id: ObjectId, handles: &HandleTable) -> Self {
        let mut properties = PropertyTable::new();
        properties.insert(
            selector::OBJECT_NAME,
            Property::fixed(PropertyValue::Text(handles.retain_text(PLUGIN_NAME))),
        );
        Self { object_id, properties }
    }
}

impl CameraObject for PluginObject {
    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn class(&self) -> ObjectClass {
        ObjectClass::PluginRoot
    }

    fn properties(&self) -> &PropertyTable {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_publishes_its_name_as_a_handle() {
        let handles = HandleTable::new();
        let root = PluginObject::new(ObjectId(1), &handles);

        assert_eq!(root.class(), ObjectClass::PluginRoot);
        assert!(root.has_property(selector::OBJECT_NAME));
        assert!(!root.is_property_settable(selector::OBJECT_NAME));

        let mut buf = [0u8; 8];
        root.read_property(selector::OBJECT_NAME, &mut buf).unwrap();
        let token = crate::types::RawHandle(u64::from_le_bytes(buf));
        let value = handles.resolve(token).unwrap();
        assert_eq!(value.as_text(), Some(PLUGIN_NAME));
    }
}
