//! The virtual capture device object.
//!
//! Publishes the identity and capability properties hosts enumerate before
//! opening a stream. Two scalar slots are writable (exclusive access and
//! control master); both are backed by shared atomic cells so accessor
//! closures and the owning object observe one state. The running flags are
//! computed from the stream's shared lifecycle state, and the stream
//! identifier slot reads a cell that initialization backfills once the
//! stream exists.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use super::handle::HandleTable;
use super::property::{Property, PropertyTable};
use super::{CameraObject, ObjectClass, ObjectId};
use crate::config::CameraConfig;
use crate::pipeline::StreamShared;
use crate::types::{PropertyValue, selector};

/// Transport code for a virtual (non-physical) device.
pub const TRANSPORT_VIRTUAL: u32 = u32::from_be_bytes(*b"virt");

/// The registry's single capture device.
#[derive(Debug)]
pub struct DeviceObject {
    object_id: ObjectId,
    properties: PropertyTable,
    stream_id: Arc<AtomicU32>,
    exclusive_access: Arc<AtomicU32>,
    control_master: Arc<AtomicI32>,
}

impl DeviceObject {
    /// Build the device with its reference property table.
    ///
    /// The stream identifier slot starts at zero and is backfilled through
    /// [`DeviceObject::set_stream_id`] once the stream is registered.
    pub fn new(
        object_id: ObjectId,
        handles: &HandleTable,
        config: &CameraConfig,
        shared: Arc<StreamShared>,
    ) -> Self {
        let stream_id = Arc::new(AtomicU32::new(0));
        let exclusive_access = Arc::new(AtomicU32::new(0));
        let control_master = Arc::new(AtomicI32::new(-1));

        let text = |value: &str| PropertyValue::Text(handles.retain_text(value));

        let mut properties = PropertyTable::new();
        properties.insert(selector::OBJECT_NAME, Property::fixed(text(&config.device_name)));
        properties
            .insert(selector::OBJECT_MANUFACTURER, Property::fixed(text(&config.manufacturer)));
        properties.insert(selector::DEVICE_UID, Property::fixed(text(&config.device_uid)));
        properties.insert(selector::DEVICE_MODEL_UID, Property::fixed(text(&config.model_uid)));
        properties
            .insert(selector::DEVICE_TRANSPORT_TYPE, Property::fixed(TRANSPORT_VIRTUAL));
        properties.insert(selector::DEVICE_IS_ALIVE, Property::fixed(1u32));

        let running = Arc::clone(&shared);
        properties.insert(
            selector::DEVICE_IS_RUNNING,
            Property::computed(move || PropertyValue::UInt32(running.is_running() as u32)),
        );
        let running_somewhere = Arc::clone(&shared);
        properties.insert(
            selector::DEVICE_IS_RUNNING_SOMEWHERE,
            Property::computed(move || {
                PropertyValue::UInt32(running_somewhere.is_running() as u32)
            }),
        );

        properties.insert(selector::DEVICE_CAN_BE_DEFAULT, Property::fixed(1u32));
        properties.insert(selector::DEVICE_HOG_MODE, Property::fixed(-1i32));
        properties.insert(
            selector::DEVICE_EXCLUSIVE_ACCESS,
            Property::shared_u32(Arc::clone(&exclusive_access)),
        );
        properties.insert(
            selector::DEVICE_CONTROL_MASTER,
            Property::shared_i32(Arc::clone(&control_master)),
        );

        let streams = Arc::clone(&stream_id);
        properties.insert(
            selector::DEVICE_STREAMS,
            Property::computed(move || PropertyValue::UInt32(streams.load(Ordering::Acquire))),
        );

        Self { object_id, properties, stream_id, exclusive_access, control_master }
    }

    /// Backfill the stream identifier once the stream is registered.
    pub fn set_stream_id(&self, id: ObjectId) {
        self.stream_id.store(id.as_u32(), Ordering::Release);
    }

    /// The registered stream's identifier, zero before backfill.
    pub fn stream_id(&self) -> ObjectId {
        ObjectId(self.stream_id.load(Ordering::Acquire))
    }

    /// Current exclusive-access flag.
    pub fn exclusive_access(&self) -> u32 {
        self.exclusive_access.load(Ordering::Acquire)
    }

    /// Current control-master token, -1 when unclaimed.
    pub fn control_master(&self) -> i32 {
        self.control_master.load(Ordering::Acquire)
    }
}

impl CameraObject for DeviceObject {
    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn class(&self) -> ObjectClass {
        ObjectClass::Device
    }

    fn properties(&self) -> &PropertyTable {
        &self.properties
    }
}
