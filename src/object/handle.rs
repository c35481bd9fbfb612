//! Retained storage for reference-typed property payloads.
//!
//! Text, format descriptors, format lists, and clocks do not serialize into
//! property slots by value. The owning object retains the payload here at
//! construction and publishes an opaque [`RawHandle`] token instead; hosts
//! resolve tokens back through the registry. Registry objects live until
//! process teardown, so retained payloads are never released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::pipeline::StreamClock;
use crate::types::{RawHandle, StreamFormat};

/// Payload kinds a handle token can resolve to.
#[derive(Debug, Clone)]
pub enum HandleValue {
    /// Human-readable string payload.
    Text(Arc<str>),
    /// A single stream format descriptor.
    Format(Arc<StreamFormat>),
    /// An ordered list of supported format descriptors.
    FormatList(Arc<[Arc<StreamFormat>]>),
    /// A stream's clock.
    Clock(Arc<StreamClock>),
}

impl HandleValue {
    /// The text payload, if this is a text handle.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HandleValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The format payload, if this is a format handle.
    pub fn as_format(&self) -> Option<&StreamFormat> {
        match self {
            HandleValue::Format(format) => Some(format),
            _ => None,
        }
    }

    /// The format list payload, if this is a format-list handle.
    pub fn as_format_list(&self) -> Option<&[Arc<StreamFormat>]> {
        match self {
            HandleValue::FormatList(list) => Some(list),
            _ => None,
        }
    }

    /// The clock payload, if this is a clock handle.
    pub fn as_clock(&self) -> Option<&Arc<StreamClock>> {
        match self {
            HandleValue::Clock(clock) => Some(clock),
            _ => None,
        }
    }
}

/// Process-lifetime store of retained handle payloads.
///
/// Tokens start at 1 so the zero token stays reserved as "no handle".
#[derive(Debug)]
pub struct HandleTable {
    next_token: AtomicU64,
    entries: Mutex<HashMap<u64, HandleValue>>,
}

impl HandleTable {
    /// Empty table.
    pub fn new() -> Self {
        Self { next_token: AtomicU64::new(1), entries: Mutex::new(HashMap::new()) }
    }

    /// Retain `value` and mint the token that refers to it.
    pub fn retain(&self, value: HandleValue) -> RawHandle {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, value);
        RawHandle(token)
    }

    /// Retain a text payload.
    pub fn retain_text(&self, text: impl Into<Arc<str>>) -> RawHandle {
        self.retain(HandleValue::Text(text.into()))
    }

    /// Resolve a token back to its retained payload.
    pub fn resolve(&self, handle: RawHandle) -> Option<HandleValue> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle.0)
            .cloned()
    }

    /// Number of retained payloads.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been retained yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
