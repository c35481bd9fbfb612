//! Virtual camera core with person-aware masking.
//!
//! Camveil provides the device model and frame pipeline of a virtual
//! video-capture device: a host-dispatchable object registry (plugin root,
//! device, stream) plus a worker that pulls frames from a capture source,
//! watches for people, and substitutes blank frames while anyone is in
//! view.
//!
//! # Features
//!
//! - **Uniform property dispatch**: five operations over every object,
//!   addressed by four-character selectors
//! - **Presence masking**: pluggable detection with a non-refreshing
//!   cooldown window
//! - **Bounded delivery**: drop-newest frame queue with a synchronous
//!   queue-altered callback
//! - **Deterministic timing**: sequence-derived timestamps posted against
//!   a per-stream clock
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use camveil::{Camveil, CameraConfig, ObjectId, SequentialRegistrar};
//!
//! #[tokio::main]
//! async fn main() -> camveil::Result<()> {
//!     let mut registrar = SequentialRegistrar::default();
//!     let registry =
//!         Camveil::initialize(CameraConfig::default(), ObjectId(1), &mut registrar)?;
//!
//!     let ids = registry.ids();
//!     let queue = registry.copy_buffer_queue(
//!         ids.stream,
//!         std::sync::Arc::new(|frame| println!("frame {} ready", frame.sequence)),
//!     )?;
//!     registry.start_stream(ids.stream)?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     while let Some(frame) = queue.dequeue() {
//!         println!("pts {} ticks", frame.timing.presentation.value);
//!     }
//!     registry.stop_stream(ids.stream)?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex};

// Core types and error handling
mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Object registry and host dispatch
pub mod object;

// Frame production
pub mod detect;
pub mod pipeline;
pub mod source;
pub mod sources;

// Core exports
pub use config::CameraConfig;
pub use error::*;
pub use object::*;
pub use types::*;

// Pipeline exports
pub use detect::{Detector, LumaDeltaDetector, PresenceReport};
pub use pipeline::{CooldownState, FrameQueue, QueueAlteredFn, StreamClock};
pub use source::{CaptureOpener, CaptureSource};
pub use sources::{SyntheticOpener, SyntheticSource};

/// Unified entry point for building the virtual camera.
///
/// Wires the object registry together with a capture opener and a person
/// detector, either the built-in defaults or host-supplied implementations.
///
/// # Examples
///
/// ## Default stack
/// ```rust,no_run
/// use camveil::{Camveil, CameraConfig, ObjectId, SequentialRegistrar};
///
/// # fn main() -> camveil::Result<()> {
/// let mut registrar = SequentialRegistrar::default();
/// let registry = Camveil::initialize(CameraConfig::default(), ObjectId(1), &mut registrar)?;
/// # Ok(())
/// # }
/// ```
///
/// ## Injected capture stack
/// ```rust,no_run
/// use std::sync::{Arc, Mutex};
/// use camveil::{
///     Camveil, CameraConfig, LumaDeltaDetector, ObjectId, SequentialRegistrar, SyntheticOpener,
/// };
///
/// # fn main() -> camveil::Result<()> {
/// let config = CameraConfig::default();
/// let opener = Arc::new(SyntheticOpener::new(config.stream_format()));
/// let detector = Arc::new(Mutex::new(LumaDeltaDetector::new()));
/// let mut registrar = SequentialRegistrar::default();
/// let registry =
///     Camveil::initialize_with(config, ObjectId(1), &mut registrar, opener, detector)?;
/// # Ok(())
/// # }
/// ```
pub struct Camveil;

impl Camveil {
    /// Initialize the registry with the built-in stack: a synthetic capture
    /// source and luminance-delta detection.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configuration fails validation
    /// - the registrar hands out zero or colliding identifiers
    pub fn initialize(
        config: CameraConfig,
        root_id: ObjectId,
        registrar: &mut dyn HostRegistrar,
    ) -> Result<ObjectRegistry> {
        let opener = Arc::new(SyntheticOpener::new(config.stream_format()));
        let detector = Arc::new(Mutex::new(LumaDeltaDetector::new()));
        Self::initialize_with(config, root_id, registrar, opener, detector)
    }

    /// Initialize the registry with an injected capture opener and
    /// detector.
    ///
    /// Hosts bring their platform capture stack here; tests bring scripted
    /// sources and detectors.
    pub fn initialize_with(
        config: CameraConfig,
        root_id: ObjectId,
        registrar: &mut dyn HostRegistrar,
        opener: Arc<dyn CaptureOpener>,
        detector: Arc<Mutex<dyn Detector>>,
    ) -> Result<ObjectRegistry> {
        ObjectRegistry::initialize(config, root_id, registrar, opener, detector)
    }
}
