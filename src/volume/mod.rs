//! System volume control behind a capability interface.

pub mod backends;
pub mod control;
pub mod executor;

pub use backends::{BackendKind, open_backend};
pub use control::{MockVolume, VolumeCapability, VolumeControl, apply_volume};
pub use executor::{CommandExecutor, SystemCommandExecutor};
