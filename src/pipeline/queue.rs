//! Bounded frame queue between the worker and the host.
//!
//! The producer and the consumer never wait on each other. At capacity the
//! incoming frame is dropped (drop-newest), so frames already accepted keep
//! their relative order and timestamps from the host's last drain point.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::types::VideoFrame;

/// Callback invoked synchronously after each successful enqueue.
///
/// Hosts typically drain from inside the callback; it runs outside the
/// queue's interior lock so that is safe.
pub type QueueAlteredFn = Arc<dyn Fn(Arc<VideoFrame>) + Send + Sync>;

/// Fixed-capacity FIFO of produced frames.
pub struct FrameQueue {
    frames: Mutex<VecDeque<Arc<VideoFrame>>>,
    capacity: usize,
    altered: Mutex<Option<QueueAlteredFn>>,
}

impl FrameQueue {
    /// Empty queue holding at most `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            altered: Mutex::new(None),
        }
    }

    /// Maximum number of buffered frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of frames currently buffered.
    pub fn len(&self) -> usize {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the queue holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the next enqueue would be dropped.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Register the queue-altered callback, replacing any previous one.
    pub fn set_altered_callback(&self, callback: QueueAlteredFn) {
        *self.altered.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Offer a frame, returning whether it was accepted.
    ///
    /// At capacity the frame is dropped and `false` comes back without
    /// invoking the callback. On acceptance the registered callback runs
    /// before this method returns.
    pub fn enqueue(&self, frame: Arc<VideoFrame>) -> bool {
        {
            let mut frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
            if frames.len() >= self.capacity {
                trace!(sequence = frame.sequence, "queue full, dropping incoming frame");
                return false;
            }
            frames.push_back(Arc::clone(&frame));
        }

        let callback =
            self.altered.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(callback) = callback {
            callback(frame);
        }
        true
    }

    /// Remove and return the oldest frame.
    pub fn dequeue(&self) -> Option<Arc<VideoFrame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
