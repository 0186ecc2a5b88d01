//! Hand landmark types shared by the detector and the geometry stage.

use serde::{Deserialize, Serialize};

/// A keypoint in normalized frame coordinates (0.0–1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for NormalizedPoint {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<NormalizedPoint> for [f32; 2] {
    fn from(p: NormalizedPoint) -> Self {
        [p.x, p.y]
    }
}

/// Keypoints of one tracked hand, ordered by landmark index.
///
/// A full set has 21 entries; shorter sets are accepted here and rejected
/// per frame by the geometry stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<NormalizedPoint>,
}

impl LandmarkSet {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    /// Landmark at `index`, if the detector reported that many.
    pub fn get(&self, index: usize) -> Option<NormalizedPoint> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }
}

/// A detected hand as reported by the tracker: landmarks plus a detection score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedHand {
    /// Detection confidence (0.0–1.0). Trackers that do not report one get 1.0.
    #[serde(default = "full_score")]
    pub score: f32,
    pub landmarks: LandmarkSet,
}

fn full_score() -> f32 {
    1.0
}
