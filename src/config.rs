use crate::defaults;
use crate::error::{HandvolError, Result};
use crate::pipeline::conditioner::{ConditionerConfig, DistanceRange};
use crate::pipeline::types::PipelineMode;
use crate::volume::BackendKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub measure: MeasureConfig,
    pub smoothing: SmoothingConfig,
    pub mapping: MappingConfig,
    pub volume: VolumeConfig,
    pub display: DisplayConfig,
}

/// Landmark tracker process and detector policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Helper argv; the first entry is the program.
    pub command: Vec<String>,
    pub camera: u32,
    pub max_hands: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

/// Overrides for the distance-readout pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeasureConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

/// Exponential smoothing factors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    pub distance_alpha: f64,
    pub control_alpha: f64,
}

/// Finger distance range mapped onto volume 0..1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MappingConfig {
    pub min_distance: f64,
    pub max_distance: f64,
}

/// System volume backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeConfig {
    pub backend: BackendKind,
    /// ALSA simple control used by the amixer backend.
    pub mixer_control: String,
}

/// Overlay and quit-key polling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub key_poll_ms: u64,
    pub color: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: defaults::tracker_command(),
            camera: defaults::CAMERA_INDEX,
            max_hands: defaults::MAX_HANDS,
            min_detection_confidence: defaults::VOLUME_CONFIDENCE,
            min_tracking_confidence: defaults::VOLUME_CONFIDENCE,
        }
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: defaults::MEASURE_CONFIDENCE,
            min_tracking_confidence: defaults::MEASURE_CONFIDENCE,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            distance_alpha: defaults::DISTANCE_ALPHA,
            control_alpha: defaults::CONTROL_ALPHA,
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            min_distance: defaults::MIN_DISTANCE,
            max_distance: defaults::MAX_DISTANCE,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            mixer_control: defaults::MIXER_CONTROL.to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            key_poll_ms: defaults::KEY_POLL_MS,
            color: true,
        }
    }
}

fn check_confidence(key: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HandvolError::ConfigInvalidValue {
            key: key.to_string(),
            message: format!("must be within [0, 1], got {}", value),
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HandvolError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                HandvolError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(HandvolError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - HANDVOL_VOLUME_BACKEND → volume.backend
    /// - HANDVOL_CAMERA → tracker.camera
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(backend) = std::env::var("HANDVOL_VOLUME_BACKEND")
            && !backend.is_empty()
        {
            self.volume.backend = backend.parse()?;
        }

        if let Ok(camera) = std::env::var("HANDVOL_CAMERA")
            && !camera.is_empty()
        {
            self.tracker.camera =
                camera
                    .trim()
                    .parse()
                    .map_err(|_| HandvolError::ConfigInvalidValue {
                        key: "tracker.camera".to_string(),
                        message: format!("HANDVOL_CAMERA is not a camera index: '{}'", camera),
                    })?;
        }

        Ok(self)
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/handvol/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("handvol").join("config.toml"))
    }

    /// Check every value before anything is opened.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.command.is_empty() {
            return Err(HandvolError::ConfigInvalidValue {
                key: "tracker.command".to_string(),
                message: "must name the tracker program".to_string(),
            });
        }
        if self.tracker.max_hands == 0 {
            return Err(HandvolError::ConfigInvalidValue {
                key: "tracker.max_hands".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        check_confidence(
            "tracker.min_detection_confidence",
            self.tracker.min_detection_confidence,
        )?;
        check_confidence(
            "tracker.min_tracking_confidence",
            self.tracker.min_tracking_confidence,
        )?;
        check_confidence(
            "measure.min_detection_confidence",
            self.measure.min_detection_confidence,
        )?;
        check_confidence(
            "measure.min_tracking_confidence",
            self.measure.min_tracking_confidence,
        )?;
        self.conditioner_config(PipelineMode::Volume)?;
        Ok(())
    }

    /// Conditioner settings for `mode`. The measure pipeline has no control stage.
    pub fn conditioner_config(&self, mode: PipelineMode) -> Result<ConditionerConfig> {
        let range = DistanceRange::new(self.mapping.min_distance, self.mapping.max_distance)?;
        let control_alpha = match mode {
            PipelineMode::Measure => None,
            PipelineMode::Volume => Some(self.smoothing.control_alpha),
        };
        ConditionerConfig::new(self.smoothing.distance_alpha, control_alpha, range)
    }

    /// Tracker settings for `mode`.
    pub fn tracker_for(&self, mode: PipelineMode) -> TrackerConfig {
        let mut tracker = self.tracker.clone();
        if mode == PipelineMode::Measure {
            tracker.min_detection_confidence = self.measure.min_detection_confidence;
            tracker.min_tracking_confidence = self.measure.min_tracking_confidence;
        }
        tracker
    }

    pub fn key_poll(&self) -> Duration {
        Duration::from_millis(self.display.key_poll_ms)
    }
}
