//! The object registry and the host-facing dispatch surface.
//!
//! Initialization builds the fixed three-object hierarchy in registration
//! order (root, then device, then stream) and backfills the device's stream
//! identifier once the stream exists. After that the registry is the host's
//! single entry point: property dispatch by object identifier, stream
//! lifecycle, queue hand-off, and handle resolution.
//!
//! An unknown object identifier is the one hard dispatch error; unknown
//! selectors on a known object degrade gracefully inside the object.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use super::device::DeviceObject;
use super::handle::{HandleTable, HandleValue};
use super::plugin::PluginObject;
use super::stream::{FrameUpdates, StreamObject};
use super::{CameraObject, ObjectClass, ObjectId};
use crate::CameraError;
use crate::Result;
use crate::config::CameraConfig;
use crate::detect::Detector;
use crate::pipeline::{FrameQueue, QueueAlteredFn, StreamShared};
use crate::source::CaptureOpener;
use crate::types::{RawHandle, Selector};

/// Assigns host identifiers to objects as they are announced.
///
/// Hosts with their own object namespace implement this; tests and
/// in-process embedding use [`SequentialRegistrar`].
pub trait HostRegistrar {
    /// Assign the identifier for a `class` object created under `parent`.
    fn register_object(&mut self, parent: ObjectId, class: ObjectClass) -> Result<ObjectId>;
}

/// Registrar handing out sequential identifiers after the root's.
#[derive(Debug, Clone)]
pub struct SequentialRegistrar {
    next: u32,
}

impl SequentialRegistrar {
    /// Registrar assigning identifiers following `root`.
    pub fn starting_after(root: ObjectId) -> Self {
        Self { next: root.as_u32().saturating_add(1) }
    }
}

impl Default for SequentialRegistrar {
    fn default() -> Self {
        Self::starting_after(ObjectId(1))
    }
}

impl HostRegistrar for SequentialRegistrar {
    fn register_object(&mut self, _parent: ObjectId, _class: ObjectClass) -> Result<ObjectId> {
        let id = ObjectId(self.next);
        self.next = self.next.saturating_add(1);
        Ok(id)
    }
}

/// The three identifiers of an initialized registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIds {
    pub root: ObjectId,
    pub device: ObjectId,
    pub stream: ObjectId,
}

/// Object store plus the uniform dispatch surface the host drives.
pub struct ObjectRegistry {
    objects: HashMap<ObjectId, Arc<dyn CameraObject>>,
    handles: Arc<HandleTable>,
    device: Arc<DeviceObject>,
    stream: Arc<StreamObject>,
    ids: ObjectIds,
}

impl ObjectRegistry {
    /// Build the registry in registration order.
    ///
    /// `root_id` is the host's identifier for the plugin root; the device
    /// and stream identifiers come from `registrar` as they are announced.
    /// All three must come out non-zero and distinct or initialization
    /// fails without a partially built registry.
    pub fn initialize(
        config: CameraConfig,
        root_id: ObjectId,
        registrar: &mut dyn HostRegistrar,
        opener: Arc<dyn CaptureOpener>,
        detector: Arc<Mutex<dyn Detector>>,
    ) -> Result<Self> {
        config.validate()?;
        if !root_id.is_valid() {
            return Err(CameraError::invalid_registration("root object id must be non-zero"));
        }

        let handles = Arc::new(HandleTable::new());
        let shared = Arc::new(StreamShared::new());

        let root = Arc::new(PluginObject::new(root_id, &handles));
        let device_id = registrar.register_object(root_id, ObjectClass::Device)?;
        let device =
            Arc::new(DeviceObject::new(device_id, &handles, &config, Arc::clone(&shared)));
        let stream_id = registrar.register_object(device_id, ObjectClass::Stream)?;
        let stream =
            Arc::new(StreamObject::new(stream_id, &handles, &config, shared, opener, detector));

        let ids = ObjectIds { root: root_id, device: device_id, stream: stream_id };
        validate_ids(ids)?;
        device.set_stream_id(stream_id);

        let mut objects: HashMap<ObjectId, Arc<dyn CameraObject>> = HashMap::new();
        objects.insert(root_id, root);
        objects.insert(device_id, Arc::clone(&device) as Arc<dyn CameraObject>);
        objects.insert(stream_id, Arc::clone(&stream) as Arc<dyn CameraObject>);

        info!(
            root = %ids.root,
            device = %ids.device,
            stream = %ids.stream,
            "object registry initialized"
        );
        Ok(Self { objects, handles, device, stream, ids })
    }

    /// The registered identifiers.
    pub fn ids(&self) -> ObjectIds {
        self.ids
    }

    /// The device object.
    pub fn device(&self) -> &DeviceObject {
        &self.device
    }

    /// The stream object.
    pub fn stream(&self) -> &StreamObject {
        &self.stream
    }

    fn object(&self, id: ObjectId) -> Result<&Arc<dyn CameraObject>> {
        self.objects.get(&id).ok_or(CameraError::BadObject { object_id: id })
    }

    fn stream_object(&self, id: ObjectId) -> Result<&StreamObject> {
        if id == self.ids.stream {
            Ok(&self.stream)
        } else {
            Err(CameraError::BadObject { object_id: id })
        }
    }

    /// Whether object `id` publishes `selector`.
    pub fn has_property(&self, id: ObjectId, selector: Selector) -> Result<bool> {
        Ok(self.object(id)?.has_property(selector))
    }

    /// Whether `selector` on object `id` accepts writes.
    pub fn is_property_settable(&self, id: ObjectId, selector: Selector) -> Result<bool> {
        Ok(self.object(id)?.is_property_settable(selector))
    }

    /// Serialized size of the property's current value, 0 when absent.
    pub fn property_data_size(&self, id: ObjectId, selector: Selector) -> Result<usize> {
        Ok(self.object(id)?.property_data_size(selector))
    }

    /// Encode the property's current value into `dest`, returning the bytes
    /// written (0 when absent).
    pub fn property_data(
        &self,
        id: ObjectId,
        selector: Selector,
        dest: &mut [u8],
    ) -> Result<usize> {
        self.object(id)?.read_property(selector, dest)
    }

    /// Decode `src` into the property. Unknown and read-only selectors are
    /// silent no-ops.
    pub fn set_property_data(&self, id: ObjectId, selector: Selector, src: &[u8]) -> Result<()> {
        self.object(id)?.write_property(selector, src)
    }

    /// Start the stream with identifier `id`.
    pub fn start_stream(&self, id: ObjectId) -> Result<()> {
        self.stream_object(id)?.start();
        Ok(())
    }

    /// Stop the stream with identifier `id`.
    pub fn stop_stream(&self, id: ObjectId) -> Result<()> {
        self.stream_object(id)?.stop();
        Ok(())
    }

    /// Hand the host the stream's frame queue, registering its
    /// queue-altered callback.
    pub fn copy_buffer_queue(
        &self,
        id: ObjectId,
        on_altered: QueueAlteredFn,
    ) -> Result<Arc<FrameQueue>> {
        Ok(self.stream_object(id)?.copy_buffer_queue(on_altered))
    }

    /// Subscribe to frames the stream accepts into its queue.
    pub fn frame_updates(&self, id: ObjectId) -> Result<FrameUpdates> {
        Ok(self.stream_object(id)?.frame_updates())
    }

    /// Resolve a handle token published through a property slot.
    pub fn resolve_handle(&self, handle: RawHandle) -> Option<HandleValue> {
        self.handles.resolve(handle)
    }
}

impl std::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("ids", &self.ids)
            .field("retained_handles", &self.handles.len())
            .finish_non_exhaustive()
    }
}

fn validate_ids(ids: ObjectIds) -> Result<()> {
    for id in [ids.root, ids.device, ids.stream] {
        if !id.is_valid() {
            return Err(CameraError::invalid_registration(format!(
                "zero object id assigned (root {}, device {}, stream {})",
                ids.root, ids.device, ids.stream
            )));
        }
    }
    if ids.root == ids.device || ids.root == ids.stream || ids.device == ids.stream {
        return Err(CameraError::invalid_registration(format!(
            "duplicate object ids assigned (root {}, device {}, stream {})",
            ids.root, ids.device, ids.stream
        )));
    }
    Ok(())
}
