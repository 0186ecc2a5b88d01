//! Linux volume backends driven through command-line tools.
//!
//! - `wpctl` (PipeWire): scalar volume on the default sink
//! - `pactl` (PulseAudio, pipewire-pulse): scalar volume as a percentage
//! - `amixer` (ALSA): raw mixer level within the control's playback limits

use crate::error::{HandvolError, Result};
use crate::volume::control::{VolumeCapability, VolumeControl};
use crate::volume::executor::CommandExecutor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const WPCTL_SINK: &str = "@DEFAULT_AUDIO_SINK@";
const PACTL_SINK: &str = "@DEFAULT_SINK@";

/// Volume backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Try wpctl, pactl, amixer in that order.
    #[default]
    Auto,
    Wpctl,
    Pactl,
    Amixer,
}

impl BackendKind {
    /// Concrete backends, in detection order.
    pub const DETECTION_ORDER: [BackendKind; 3] =
        [BackendKind::Wpctl, BackendKind::Pactl, BackendKind::Amixer];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Wpctl => "wpctl",
            BackendKind::Pactl => "pactl",
            BackendKind::Amixer => "amixer",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = HandvolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "wpctl" => Ok(BackendKind::Wpctl),
            "pactl" => Ok(BackendKind::Pactl),
            "amixer" => Ok(BackendKind::Amixer),
            other => Err(HandvolError::ConfigInvalidValue {
                key: "volume.backend".to_string(),
                message: format!("unknown backend '{}' (auto, wpctl, pactl, amixer)", other),
            }),
        }
    }
}

/// Open failure for `tool`. A missing tool keeps its own variant.
fn unavailable(tool: &str, err: HandvolError) -> HandvolError {
    match err {
        HandvolError::VolumeToolNotFound { .. } => err,
        other => HandvolError::AudioUnavailable {
            message: format!("{}: {}", tool, other),
        },
    }
}

/// Parse `wpctl get-volume` output, e.g. `Volume: 0.40 [MUTED]`.
pub fn parse_wpctl_volume(output: &str) -> Option<f64> {
    output
        .trim()
        .strip_prefix("Volume:")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

/// Parse the playback limits from `amixer sget <control>` output.
///
/// Looks for a line like `  Limits: Playback 0 - 87`.
pub fn parse_amixer_limits(output: &str) -> Option<(f64, f64)> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Limits:")?.trim();
        let rest = rest.strip_prefix("Playback").unwrap_or(rest).trim();
        let (min, max) = rest.split_once(" - ")?;
        Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
    })
}

/// PipeWire backend via `wpctl`.
pub struct WpctlVolume {
    executor: Arc<dyn CommandExecutor>,
}

impl WpctlVolume {
    /// Check that wpctl can read the default sink volume.
    pub fn open(executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let output = executor
            .execute("wpctl", &["get-volume", WPCTL_SINK])
            .map_err(|e| unavailable("wpctl", e))?;
        let current = parse_wpctl_volume(&output).ok_or_else(|| HandvolError::AudioUnavailable {
            message: format!("wpctl: unexpected output '{}'", output.trim()),
        })?;
        tracing::debug!(current, "wpctl default sink found");
        Ok(Self { executor })
    }
}

impl VolumeControl for WpctlVolume {
    fn name(&self) -> &str {
        "wpctl"
    }

    fn capability(&self) -> VolumeCapability {
        VolumeCapability::Scalar
    }

    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()> {
        let value = format!("{:.3}", scalar.clamp(0.0, 1.0));
        self.executor
            .execute("wpctl", &["set-volume", WPCTL_SINK, value.as_str()])?;
        Ok(())
    }

    fn set_volume_level(&mut self, level: f64) -> Result<()> {
        self.set_volume_scalar(level)
    }
}

/// PulseAudio backend via `pactl`.
pub struct PactlVolume {
    executor: Arc<dyn CommandExecutor>,
}

impl PactlVolume {
    /// Check that pactl can reach the default sink.
    pub fn open(executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        executor
            .execute("pactl", &["get-sink-volume", PACTL_SINK])
            .map_err(|e| unavailable("pactl", e))?;
        Ok(Self { executor })
    }
}

impl VolumeControl for PactlVolume {
    fn name(&self) -> &str {
        "pactl"
    }

    fn capability(&self) -> VolumeCapability {
        VolumeCapability::Scalar
    }

    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()> {
        let value = format!("{:.1}%", scalar.clamp(0.0, 1.0) * 100.0);
        self.executor
            .execute("pactl", &["set-sink-volume", PACTL_SINK, value.as_str()])?;
        Ok(())
    }

    fn set_volume_level(&mut self, level: f64) -> Result<()> {
        self.set_volume_scalar(level)
    }
}

/// ALSA backend via `amixer`. Only takes raw levels, so the playback range
/// is read once when the backend is opened.
pub struct AmixerVolume {
    executor: Arc<dyn CommandExecutor>,
    control: String,
    min: f64,
    max: f64,
}

impl AmixerVolume {
    pub fn open(executor: Arc<dyn CommandExecutor>, control: &str) -> Result<Self> {
        let output = executor
            .execute("amixer", &["sget", control])
            .map_err(|e| unavailable("amixer", e))?;
        let (min, max) =
            parse_amixer_limits(&output).ok_or_else(|| HandvolError::AudioUnavailable {
                message: format!("amixer: no playback limits reported for '{}'", control),
            })?;
        if max <= min {
            return Err(HandvolError::AudioUnavailable {
                message: format!("amixer: empty playback range {}..{}", min, max),
            });
        }
        Ok(Self {
            executor,
            control: control.to_string(),
            min,
            max,
        })
    }
}

impl VolumeControl for AmixerVolume {
    fn name(&self) -> &str {
        "amixer"
    }

    fn capability(&self) -> VolumeCapability {
        VolumeCapability::Level {
            min: self.min,
            max: self.max,
        }
    }

    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()> {
        let level = crate::volume::control::level_for(scalar, self.min, self.max);
        self.set_volume_level(level)
    }

    fn set_volume_level(&mut self, level: f64) -> Result<()> {
        let value = (level.clamp(self.min, self.max).round() as i64).to_string();
        self.executor
            .execute("amixer", &["-q", "sset", self.control.as_str(), value.as_str()])?;
        Ok(())
    }
}

/// Open the selected backend; `Auto` returns the first one that answers.
pub fn open_backend(
    kind: BackendKind,
    executor: Arc<dyn CommandExecutor>,
    mixer_control: &str,
) -> Result<Box<dyn VolumeControl>> {
    match kind {
        BackendKind::Wpctl => Ok(Box::new(WpctlVolume::open(executor)?)),
        BackendKind::Pactl => Ok(Box::new(PactlVolume::open(executor)?)),
        BackendKind::Amixer => Ok(Box::new(AmixerVolume::open(executor, mixer_control)?)),
        BackendKind::Auto => {
            let mut failures = Vec::new();
            for candidate in BackendKind::DETECTION_ORDER {
                match open_backend(candidate, executor.clone(), mixer_control) {
                    Ok(backend) => return Ok(backend),
                    Err(e) => {
                        tracing::debug!(backend = %candidate, "volume backend unavailable: {}", e);
                        failures.push(e.to_string());
                    }
                }
            }
            Err(HandvolError::AudioUnavailable {
                message: format!("no volume backend available ({})", failures.join("; ")),
            })
        }
    }
}
