//! handvol - hand-gesture volume control
//!
//! The distance between thumb tip and index fingertip, seen by a webcam hand
//! tracker, is smoothed, mapped onto [0, 1] and sent to the system volume.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod pipeline;
mod sys;
pub mod tracking;
pub mod volume;

// Composition root
pub mod app;

// Core traits (source → detect → actuate → display)
pub use display::{Display, KeyPoller};
pub use tracking::detector::HandDetector;
pub use tracking::frame::FrameSource;
pub use volume::{CommandExecutor, SystemCommandExecutor, VolumeControl};

// Pipeline
pub use pipeline::dispatch::{LoopConfig, Session, run};
pub use pipeline::types::{EndReason, PipelineMode, RunSummary};

// Error handling
pub use error::{HandvolError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_has_short_hash_when_built_from_git() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(hash_part.len(), 7, "Git hash should be 7 chars, got: {}", hash_part);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
