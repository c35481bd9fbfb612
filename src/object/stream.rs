//! The video stream object.
//!
//! Owns the production side of the pipeline: the bounded queue, the clock,
//! the detector, and the lifecycle of the worker task. `start` and `stop`
//! are idempotent; a start without an available capture device is absorbed
//! and the stream simply stays stopped.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::handle::{HandleTable, HandleValue};
use super::property::{Property, PropertyTable};
use super::{CameraObject, ObjectClass, ObjectId};
use crate::CameraError;
use crate::config::CameraConfig;
use crate::detect::Detector;
use crate::pipeline::{
    FrameQueue, QueueAlteredFn, StreamClock, StreamShared, WorkerContext, worker,
};
use crate::source::CaptureOpener;
use crate::types::{PropertyValue, StreamFormat, ValueRange, VideoFrame, selector};

/// The device's single video stream.
pub struct StreamObject {
    object_id: ObjectId,
    properties: PropertyTable,
    config: CameraConfig,
    format: Arc<StreamFormat>,
    shared: Arc<StreamShared>,
    queue: Arc<FrameQueue>,
    clock: Arc<StreamClock>,
    opener: Arc<dyn CaptureOpener>,
    detector: Arc<Mutex<dyn Detector>>,
    cancel: Mutex<Option<CancellationToken>>,
    frames_tx: watch::Sender<Option<Arc<VideoFrame>>>,
}

impl StreamObject {
    /// Build the stream, retaining its format, format list, and clock in
    /// `handles`.
    pub fn new(
        object_id: ObjectId,
        handles: &HandleTable,
        config: &CameraConfig,
        shared: Arc<StreamShared>,
        opener: Arc<dyn CaptureOpener>,
        detector: Arc<Mutex<dyn Detector>>,
    ) -> Self {
        let format = Arc::new(config.stream_format());
        let clock = Arc::new(StreamClock::new(
            format!("{} clock", config.device_name),
            config.frame_rate,
        ));
        let queue = Arc::new(FrameQueue::with_capacity(config.queue_capacity));
        let (frames_tx, _) = watch::channel(None);

        let format_handle = handles.retain(HandleValue::Format(Arc::clone(&format)));
        let list_handle = handles
            .retain(HandleValue::FormatList(Arc::from(vec![Arc::clone(&format)])));
        let clock_handle = handles.retain(HandleValue::Clock(Arc::clone(&clock)));

        let text = |value: &str| PropertyValue::Text(handles.retain_text(value));
        let rate = config.frame_rate;

        let mut properties = PropertyTable::new();
        properties.insert(selector::OBJECT_NAME, Property::fixed(text(&config.device_name)));
        properties.insert(selector::STREAM_DIRECTION, Property::fixed(0u32));
        properties
            .insert(selector::STREAM_FORMAT, Property::fixed(PropertyValue::Handle(format_handle)));
        properties.insert(
            selector::STREAM_FORMAT_LIST,
            Property::fixed(PropertyValue::HandleList(list_handle)),
        );
        properties.insert(selector::STREAM_FRAME_RATE, Property::fixed(rate));
        properties.insert(selector::STREAM_FRAME_RATE_LIST, Property::fixed(rate));
        properties.insert(selector::STREAM_MINIMUM_FRAME_RATE, Property::fixed(rate));
        properties.insert(
            selector::STREAM_FRAME_RATE_RANGES,
            Property::fixed(ValueRange::new(rate, rate)),
        );
        properties
            .insert(selector::STREAM_CLOCK, Property::fixed(PropertyValue::Handle(clock_handle)));

        Self {
            object_id,
            properties,
            config: config.clone(),
            format,
            shared,
            queue,
            clock,
            opener,
            detector,
            cancel: Mutex::new(None),
            frames_tx,
        }
    }

    /// Begin producing frames. No-op while already running or when no
    /// capture device is available. Must be called within a tokio runtime.
    pub fn start(&self) {
        // Lifecycle calls serialize on the token slot; without it two
        // concurrent starts could each spawn a worker.
        let mut slot = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.is_running() {
            debug!(stream = %self.object_id, "start ignored, already running");
            return;
        }
        let Some(source) = self.opener.open_default() else {
            debug!(stream = %self.object_id, "no capture device available, stream stays stopped");
            return;
        };

        let epoch = self.shared.begin_run();
        let cancel = CancellationToken::new();
        *slot = Some(cancel.clone());

        let _task = worker::spawn(WorkerContext {
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            queue: Arc::clone(&self.queue),
            clock: Arc::clone(&self.clock),
            detector: Arc::clone(&self.detector),
            frames: self.frames_tx.clone(),
            cancel,
            epoch,
            source,
        });
        info!(stream = %self.object_id, epoch, "stream started");
    }

    /// Stop producing frames. No-op while already stopped.
    ///
    /// The running flag drops before this returns; the worker retires
    /// asynchronously and discards any in-flight detection result.
    pub fn stop(&self) {
        let mut slot = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.shared.is_running() {
            debug!(stream = %self.object_id, "stop ignored, not running");
            return;
        }
        if let Some(cancel) = slot.take() {
            cancel.cancel();
        }
        self.shared.end_run();
        self.frames_tx.send_replace(None);
        info!(stream = %self.object_id, "stream stopped");
    }

    /// Hand the host the frame queue, registering its queue-altered
    /// callback. The callback runs synchronously on each accepted frame.
    pub fn copy_buffer_queue(&self, on_altered: QueueAlteredFn) -> Arc<FrameQueue> {
        self.queue.set_altered_callback(on_altered);
        Arc::clone(&self.queue)
    }

    /// Subscribe to frames accepted into the queue.
    ///
    /// Built on a watch channel: a slow monitor observes the latest
    /// accepted frame rather than every frame, and the producer never waits
    /// for it. Stopped periods surface as silence; the stream ends when the
    /// owning object goes away.
    pub fn frame_updates(&self) -> FrameUpdates {
        FrameUpdates { inner: WatchStream::new(self.frames_tx.subscribe()) }
    }

    /// Whether a worker currently owns the stream.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// The stream's published format.
    pub fn format(&self) -> &StreamFormat {
        &self.format
    }

    /// The queue the host drains.
    pub fn queue(&self) -> &Arc<FrameQueue> {
        &self.queue
    }

    /// The clock timestamps are posted against.
    pub fn clock(&self) -> &Arc<StreamClock> {
        &self.clock
    }

    /// Sequence slot the next accepted frame will occupy.
    pub fn next_sequence(&self) -> u64 {
        self.shared.next_sequence()
    }

    /// Take the terminal failure from the last run, if it ended in one.
    pub fn take_failure(&self) -> Option<CameraError> {
        self.shared.take_failure()
    }
}

impl CameraObject for StreamObject {
    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn class(&self) -> ObjectClass {
        ObjectClass::Stream
    }

    fn properties(&self) -> &PropertyTable {
        &self.properties
    }
}

impl Drop for StreamObject {
    fn drop(&mut self) {
        if let Some(cancel) =
            self.cancel.lock().unwrap_or_else(PoisonError::into_inner).take()
        {
            cancel.cancel();
        }
    }
}

impl fmt::Debug for StreamObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamObject")
            .field("object_id", &self.object_id)
            .field("running", &self.is_running())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Stream of frames accepted into the queue. See
/// [`StreamObject::frame_updates`].
pub struct FrameUpdates {
    inner: WatchStream<Option<Arc<VideoFrame>>>,
}

impl Stream for FrameUpdates {
    type Item = Arc<VideoFrame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // The watch value is None between runs; skip those and yield frames.
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(frame))) => return Poll::Ready(Some(frame)),
                Poll::Ready(Some(None)) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl fmt::Debug for FrameUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameUpdates").finish_non_exhaustive()
    }
}
