//! Virtual camera configuration.
//!
//! [`CameraConfig`] carries everything the registry and the pipeline need at
//! construction time: device identity strings, the published stream format,
//! and the masking parameters. Defaults reproduce the reference device
//! (1280x720 at 30 fps, a 30-frame queue, a 3-tick cooldown at one tick per
//! second). Hosts that carry a config file can load overrides from YAML;
//! unspecified fields keep their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CameraError, Result};
use crate::types::{PixelFormat, StreamFormat};

/// Settings for the virtual device, its stream, and the masking pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Display name of the device and its stream.
    pub device_name: String,
    /// Manufacturer string published by the device.
    pub manufacturer: String,
    /// Stable unique identifier for the device.
    pub device_uid: String,
    /// Model identifier.
    pub model_uid: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frame rate in frames per second.
    pub frame_rate: f64,
    /// Pixel layout of produced frames.
    pub pixel_format: PixelFormat,
    /// Capacity of the host-drained frame queue.
    pub queue_capacity: usize,
    /// Cooldown length in timer ticks.
    pub cooldown_ticks: u32,
    /// Cooldown tick cadence in seconds, independent of the frame rate.
    pub tick_interval_secs: f64,
    /// Consecutive capture-source errors tolerated before the stream stops.
    pub source_error_budget: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            device_name: "Camveil".to_string(),
            manufacturer: "camveil project".to_string(),
            device_uid: "Camveil Device".to_string(),
            model_uid: "Camveil Model".to_string(),
            width: 1280,
            height: 720,
            frame_rate: 30.0,
            pixel_format: PixelFormat::Bgra32,
            queue_capacity: 30,
            cooldown_ticks: 3,
            tick_interval_secs: 1.0,
            source_error_budget: 10,
        }
    }
}

impl CameraConfig {
    /// Validate the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.device_name.is_empty() || self.device_uid.is_empty() {
            return Err(CameraError::invalid_config("device_name and device_uid must be set"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::invalid_config(format!(
                "frame dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(CameraError::invalid_config(format!(
                "frame_rate must be positive and finite, got {}",
                self.frame_rate
            )));
        }
        if self.queue_capacity == 0 {
            return Err(CameraError::invalid_config("queue_capacity must be at least 1"));
        }
        if self.cooldown_ticks == 0 {
            return Err(CameraError::invalid_config("cooldown_ticks must be at least 1"));
        }
        if !self.tick_interval_secs.is_finite() || self.tick_interval_secs <= 0.0 {
            return Err(CameraError::invalid_config(format!(
                "tick_interval_secs must be positive and finite, got {}",
                self.tick_interval_secs
            )));
        }
        if self.source_error_budget == 0 {
            return Err(CameraError::invalid_config("source_error_budget must be at least 1"));
        }
        Ok(())
    }

    /// The cooldown tick cadence as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_interval_secs)
    }

    /// The stream format this configuration publishes.
    pub fn stream_format(&self) -> StreamFormat {
        StreamFormat {
            width: self.width,
            height: self.height,
            pixel_format: self.pixel_format,
            frame_rate: self.frame_rate,
        }
    }

    /// Size in bytes of one uncompressed frame.
    pub fn frame_bytes(&self) -> usize {
        self.stream_format().frame_bytes()
    }

    /// Parse a configuration from YAML, applying defaults for absent fields.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: CameraConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
