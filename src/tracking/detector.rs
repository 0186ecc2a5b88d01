//! Hand detection stage.
//!
//! The landmark model runs inside the tracker; this stage applies the
//! pipeline's own detection policy (hand count, minimum score) to what the
//! tracker reported.

use crate::config::TrackerConfig;
use crate::tracking::frame::Frame;
use crate::tracking::landmarks::LandmarkSet;

/// Trait for hand landmark detectors.
pub trait HandDetector {
    /// Landmarks of the tracked hand in `frame`, or `None` when no hand passes.
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet>;
}

/// Detector that reads the hands the tracker annotated each frame with.
#[derive(Debug, Clone)]
pub struct FeedDetector {
    max_hands: usize,
    min_detection_confidence: f32,
}

impl FeedDetector {
    pub fn new(max_hands: u32, min_detection_confidence: f32) -> Self {
        Self {
            max_hands: max_hands as usize,
            min_detection_confidence,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.max_hands, config.min_detection_confidence)
    }
}

impl HandDetector for FeedDetector {
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet> {
        frame
            .hands
            .iter()
            .take(self.max_hands)
            .find(|hand| hand.score >= self.min_detection_confidence && !hand.landmarks.is_empty())
            .map(|hand| hand.landmarks.clone())
    }
}
