//! Error types for the virtual camera core.
//!
//! This module provides error handling for the camveil library. All errors
//! implement the `std::error::Error` trait and carry structured context.
//!
//! ## Error Categories
//!
//! - **Dispatch Errors**: Property operations against unknown objects
//! - **Codec Errors**: Undersized buffers or decode of read-only value types
//! - **Capture Errors**: Missing capture devices and source failures
//! - **Detection Errors**: Classifier faults (always absorbed, fail-open)
//! - **Configuration Errors**: Invalid settings or registration state
//!
//! ## Absorb or Surface
//!
//! Only structurally invalid requests surface to callers. Expected
//! steady-state conditions (full queue, missing capture device, detector
//! fault) are absorbed where they occur and expressed through data-path
//! behavior alone:
//!
//! ```rust
//! use camveil::CameraError;
//!
//! let error = CameraError::queue_full(30);
//! if error.is_steady_state() {
//!     // log and continue; the frame was dropped, nothing to propagate
//! }
//! ```
//!
//! ## Helper Constructors
//!
//! Use helper methods for common error scenarios:
//!
//! ```rust
//! use camveil::{CameraError, ObjectId};
//!
//! let dispatch_error = CameraError::bad_object(ObjectId(17));
//! let codec_error = CameraError::short_buffer(8, 4);
//! let detector_error = CameraError::detector_failure("model returned no output");
//! ```

use thiserror::Error;

use crate::object::ObjectId;

/// Result type alias for camera core operations.
pub type Result<T, E = CameraError> = std::result::Result<T, E>;

/// Main error type for the virtual camera core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CameraError {
    #[error("Unknown object identifier {object_id}")]
    BadObject { object_id: ObjectId },

    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    #[error("No default capture device is available")]
    CaptureUnavailable,

    #[error("Detector failure: {reason}")]
    Detector {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Frame queue at capacity ({capacity})")]
    QueueFull { capacity: usize },

    #[error("Buffer too small: needed {needed} bytes, got {got}")]
    ShortBuffer { needed: usize, got: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    #[error("Stream terminated after {consecutive_errors} consecutive source errors")]
    StreamTerminated { consecutive_errors: u32 },
}

impl CameraError {
    /// Returns whether this error is an expected steady-state condition that
    /// callers absorb locally rather than propagate.
    pub fn is_steady_state(&self) -> bool {
        match self {
            CameraError::CaptureUnavailable => true,
            CameraError::Detector { .. } => true,
            CameraError::QueueFull { .. } => true,
            CameraError::BadObject { .. } => false,
            CameraError::Unsupported { .. } => false,
            CameraError::ShortBuffer { .. } => false,
            CameraError::InvalidConfig { .. } => false,
            CameraError::InvalidRegistration { .. } => false,
            CameraError::StreamTerminated { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CameraError::BadObject { .. } => vec![
                "Use only identifiers returned by initialize()",
                "Check that initialization completed before dispatching",
            ],
            CameraError::Unsupported { .. } => vec![
                "Check is_property_settable() before writing",
                "Read-only value types cannot be decoded from buffers",
            ],
            CameraError::CaptureUnavailable => vec![
                "Connect a capture device and call start again",
                "Inject a capture opener when running without hardware",
            ],
            CameraError::Detector { .. } => vec![
                "Check detector model assets and warm-up state",
                "Detection fails open; masking is simply not triggered",
            ],
            CameraError::QueueFull { .. } => vec![
                "Drain the buffer queue from the host callback",
                "Raise queue_capacity if the consumer is bursty",
            ],
            CameraError::ShortBuffer { .. } => vec![
                "Size buffers with get_property_data_size() first",
            ],
            CameraError::InvalidConfig { .. } => vec![
                "Check dimensions, frame rate, and capacities are non-zero",
                "Validate YAML configuration against CameraConfig fields",
            ],
            CameraError::InvalidRegistration { .. } => vec![
                "Host registrars must assign distinct, non-zero identifiers",
            ],
            CameraError::StreamTerminated { .. } => vec![
                "Check the capture source logs for the underlying fault",
                "Call start_stream again to reattach with a fresh source",
            ],
        }
    }

    /// Helper constructor for unknown-object dispatch errors.
    pub fn bad_object(object_id: ObjectId) -> Self {
        CameraError::BadObject { object_id }
    }

    /// Helper constructor for unsupported operations.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        CameraError::Unsupported { operation: operation.into() }
    }

    /// Helper constructor for detector failures.
    pub fn detector_failure(reason: impl Into<String>) -> Self {
        CameraError::Detector { reason: reason.into(), source: None }
    }

    /// Helper constructor for detector failures with an underlying source.
    pub fn detector_failure_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        CameraError::Detector { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for drop-newest queue rejections.
    pub fn queue_full(capacity: usize) -> Self {
        CameraError::QueueFull { capacity }
    }

    /// Helper constructor for undersized codec buffers.
    pub fn short_buffer(needed: usize, got: usize) -> Self {
        CameraError::ShortBuffer { needed, got }
    }

    /// Helper constructor for configuration validation failures.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        CameraError::InvalidConfig { reason: reason.into(), source: None }
    }

    /// Helper constructor for registration-order or identifier violations.
    pub fn invalid_registration(reason: impl Into<String>) -> Self {
        CameraError::InvalidRegistration { reason: reason.into() }
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::InvalidConfig {
            reason: "Failed to read configuration".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml_ng::Error> for CameraError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        CameraError::InvalidConfig {
            reason: "Failed to parse configuration YAML".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_format_correctly_with_arbitrary_context(
            reason in ".*",
            object_id in 1u32..0x10000u32,
            needed in 1usize..1024usize,
            got in 0usize..1024usize,
            capacity in 1usize..256usize
          ) {
            // Property: Error messages contain their structured context
            let dispatch_error = CameraError::bad_object(ObjectId(object_id));
            let codec_error = CameraError::short_buffer(needed, got);
            let queue_error = CameraError::queue_full(capacity);
            let detector_error = CameraError::detector_failure(reason.clone());

            prop_assert!(dispatch_error.to_string().contains(&object_id.to_string()));
            prop_assert!(codec_error.to_string().contains(&needed.to_string()));
            prop_assert!(codec_error.to_string().contains(&got.to_string()));
            prop_assert!(queue_error.to_string().contains(&capacity.to_string()));
            prop_assert!(detector_error.to_string().contains(&reason));

            // Property: No error message is empty
            prop_assert!(!dispatch_error.to_string().is_empty());
            prop_assert!(!codec_error.to_string().is_empty());
            prop_assert!(!queue_error.to_string().is_empty());
            prop_assert!(!detector_error.to_string().is_empty());
          }

          #[test]
          fn steady_state_classification_is_stable_across_context(
            reason in ".*",
            capacity in 1usize..256usize,
            object_id in 1u32..0x10000u32
          ) {
            // Property: Classification depends on the variant, never the payload
            prop_assert!(CameraError::queue_full(capacity).is_steady_state());
            prop_assert!(CameraError::detector_failure(reason.clone()).is_steady_state());
            prop_assert!(CameraError::CaptureUnavailable.is_steady_state());

            prop_assert!(!CameraError::bad_object(ObjectId(object_id)).is_steady_state());
            prop_assert!(!CameraError::unsupported(reason).is_steady_state());
          }

          #[test]
          fn error_source_chaining_preserves_information(
            base_message in ".*",
            reason in ".*"
          ) {
            // Property: The base cause stays reachable through the source chain
            let base: Box<dyn std::error::Error + Send + Sync> =
              Box::new(std::io::Error::other(base_message.clone()));
            let top = CameraError::detector_failure_with_source(reason, base);

            let source = std::error::Error::source(&top).expect("source attached");
            prop_assert!(source.to_string().contains(&base_message));
          }
        }
    }

    #[test]
    fn error_constructors_validation() {
        let dispatch_error = CameraError::bad_object(ObjectId(42));
        assert!(matches!(dispatch_error, CameraError::BadObject { .. }));

        let codec_error = CameraError::short_buffer(16, 8);
        assert!(matches!(codec_error, CameraError::ShortBuffer { needed: 16, got: 8 }));

        let config_error = CameraError::invalid_config("zero width");
        assert!(matches!(config_error, CameraError::InvalidConfig { .. }));

        let registration_error = CameraError::invalid_registration("duplicate id");
        assert!(matches!(registration_error, CameraError::InvalidRegistration { .. }));
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: CameraError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<CameraError>();

        let error = CameraError::CaptureUnavailable;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let dispatch_error = CameraError::bad_object(ObjectId(9));
        let capture_error = CameraError::CaptureUnavailable;
        let queue_error = CameraError::queue_full(30);

        assert!(!dispatch_error.is_steady_state());
        assert!(capture_error.is_steady_state());
        assert!(queue_error.is_steady_state());

        for suggestion in dispatch_error
            .recovery_suggestions()
            .iter()
            .chain(capture_error.recovery_suggestions().iter())
            .chain(queue_error.recovery_suggestions().iter())
        {
            assert!(!suggestion.is_empty());
            assert!(suggestion.len() > 5);
        }
    }

    #[test]
    fn from_conversions_work() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing config");
        let camera_err: CameraError = io_err.into();

        match camera_err {
            CameraError::InvalidConfig { source, .. } => {
                let source = source.expect("io conversion keeps its source");
                assert_eq!(source.to_string(), "missing config");
            }
            _ => panic!("Expected InvalidConfig from io::Error conversion"),
        }
    }
}
