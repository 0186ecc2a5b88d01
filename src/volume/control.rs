use crate::error::{HandvolError, Result};
use crate::pipeline::error::StationError;

/// How a backend accepts volume changes, fixed when the backend is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeCapability {
    /// Takes a scalar in [0, 1] directly.
    Scalar,
    /// Takes a host-specific level within the range reported at startup.
    Level { min: f64, max: f64 },
}

/// Trait for system volume backends.
pub trait VolumeControl {
    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &str;

    fn capability(&self) -> VolumeCapability;

    /// Set the volume from a scalar in [0, 1].
    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()>;

    /// Set the volume to a raw host level.
    fn set_volume_level(&mut self, level: f64) -> Result<()>;
}

impl<T: VolumeControl + ?Sized> VolumeControl for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capability(&self) -> VolumeCapability {
        (**self).capability()
    }

    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()> {
        (**self).set_volume_scalar(scalar)
    }

    fn set_volume_level(&mut self, level: f64) -> Result<()> {
        (**self).set_volume_level(level)
    }
}

/// Re-scale a control value into a host level range.
pub fn level_for(scalar: f64, min: f64, max: f64) -> f64 {
    scalar * (max - min) + min
}

/// Forward a control value to the backend, using whichever call it supports.
///
/// Failures are recoverable: the caller logs them and keeps the loop running.
pub fn apply_volume(
    control: &mut dyn VolumeControl,
    scalar: f64,
) -> std::result::Result<(), StationError> {
    let result = match control.capability() {
        VolumeCapability::Scalar => control.set_volume_scalar(scalar),
        VolumeCapability::Level { min, max } => {
            control.set_volume_level(level_for(scalar, min, max))
        }
    };
    result.map_err(|e| StationError::new("volume", e.to_string()))
}

/// Mock volume backend for testing
#[derive(Debug, Clone)]
pub struct MockVolume {
    capability: VolumeCapability,
    scalars: Vec<f64>,
    levels: Vec<f64>,
    fail_sets: bool,
}

impl MockVolume {
    /// Create a mock that accepts scalars
    pub fn scalar() -> Self {
        Self {
            capability: VolumeCapability::Scalar,
            scalars: Vec::new(),
            levels: Vec::new(),
            fail_sets: false,
        }
    }

    /// Create a mock that only accepts levels in `min..=max`
    pub fn level(min: f64, max: f64) -> Self {
        Self {
            capability: VolumeCapability::Level { min, max },
            ..Self::scalar()
        }
    }

    /// Configure every set call to fail
    pub fn with_set_failure(mut self) -> Self {
        self.fail_sets = true;
        self
    }

    /// Scalars received so far
    pub fn scalars(&self) -> &[f64] {
        &self.scalars
    }

    /// Levels received so far
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Number of set calls received, successful or not
    pub fn set_count(&self) -> usize {
        self.scalars.len() + self.levels.len()
    }

    fn outcome(&self) -> Result<()> {
        if self.fail_sets {
            Err(HandvolError::VolumeSetFailed {
                message: "mock volume failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl VolumeControl for MockVolume {
    fn name(&self) -> &str {
        "mock"
    }

    fn capability(&self) -> VolumeCapability {
        self.capability
    }

    fn set_volume_scalar(&mut self, scalar: f64) -> Result<()> {
        self.scalars.push(scalar);
        self.outcome()
    }

    fn set_volume_level(&mut self, level: f64) -> Result<()> {
        self.levels.push(level);
        self.outcome()
    }
}
