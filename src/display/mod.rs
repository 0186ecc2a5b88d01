//! Display and quit-key input.
//!
//! The display shows one overlay per frame; the key poller is checked once per
//! frame with a bounded wait so the loop can stop on request.

pub mod terminal;

use crate::error::Result;
use crate::pipeline::geometry::PixelPoint;
use std::collections::VecDeque;
use std::time::Duration;

pub use terminal::{TerminalDisplay, TtyKeys, format_overlay};

/// What to draw for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// A hand was measured this frame.
    Hand {
        thumb: PixelPoint,
        index: PixelPoint,
        /// Smoothed thumb-to-index distance in pixels.
        distance: f64,
        /// Control value in [0, 1]; `None` in the measure pipeline.
        volume: Option<f64>,
    },
    /// No hand in this frame; the last volume stays in effect.
    NoHand,
    /// A hand was reported but could not be measured; nothing new to draw.
    Skipped,
}

/// Trait for overlay displays.
pub trait Display {
    fn render(&mut self, overlay: &Overlay) -> Result<()>;
}

/// Trait for the quit-key poll.
pub trait KeyPoller {
    /// Wait at most `timeout` for a key.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>>;
}

/// Key poller for headless runs: never reports a key and never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeys;

impl KeyPoller for NoKeys {
    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<char>> {
        Ok(None)
    }
}

/// Key poller that replays a fixed script, one entry per poll, then `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    script: VecDeque<Option<char>>,
}

impl ScriptedKeys {
    pub fn new(script: Vec<Option<char>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Report `key` on poll number `n` (0-based), nothing before it.
    pub fn key_at(n: usize, key: char) -> Self {
        let mut script = vec![None; n];
        script.push(Some(key));
        Self::new(script)
    }
}

impl KeyPoller for ScriptedKeys {
    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<char>> {
        Ok(self.script.pop_front().flatten())
    }
}

/// Display that records every overlay, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    overlays: Vec<Overlay>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, overlay: &Overlay) -> Result<()> {
        self.overlays.push(*overlay);
        Ok(())
    }
}
