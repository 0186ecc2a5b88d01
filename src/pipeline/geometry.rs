//! Landmark geometry: normalized keypoints to pixel points and distances.

use crate::defaults::{INDEX_TIP, THUMB_TIP};
use crate::pipeline::error::{SkipReason, StageOutcome};
use crate::tracking::landmarks::{LandmarkSet, NormalizedPoint};

/// A landmark in pixel coordinates of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other` in pixels.
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy)
    }
}

/// Scale a normalized point to the frame: `round(x * w)`, `round(y * h)`.
pub fn to_pixel(point: NormalizedPoint, width: u32, height: u32) -> PixelPoint {
    PixelPoint {
        x: (point.x as f64 * width as f64).round() as i32,
        y: (point.y as f64 * height as f64).round() as i32,
    }
}

/// Thumb tip and index fingertip of one frame, and the raw distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub thumb: PixelPoint,
    pub index: PixelPoint,
    pub distance: f64,
}

/// Measure the thumb-to-index distance of a hand in a `width` x `height` frame.
///
/// Skips the frame when the landmark set is too short to contain both tips.
pub fn measure(landmarks: &LandmarkSet, width: u32, height: u32) -> StageOutcome<Measurement> {
    let pick = |index: usize| {
        landmarks
            .get(index)
            .map(|p| to_pixel(p, width, height))
            .ok_or(SkipReason::MissingLandmark {
                index,
                available: landmarks.len(),
            })
    };

    let (thumb, index) = match (pick(THUMB_TIP), pick(INDEX_TIP)) {
        (Ok(thumb), Ok(index)) => (thumb, index),
        (Err(reason), _) | (_, Err(reason)) => return StageOutcome::Skip(reason),
    };

    StageOutcome::Ok(Measurement {
        thumb,
        index,
        distance: thumb.distance_to(&index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with(thumb: (f32, f32), index: (f32, f32)) -> LandmarkSet {
        let mut points = vec![NormalizedPoint::new(0.5, 0.5); 21];
        points[THUMB_TIP] = NormalizedPoint::new(thumb.0, thumb.1);
        points[INDEX_TIP] = NormalizedPoint::new(index.0, index.1);
        LandmarkSet::new(points)
    }

    #[test]
    fn to_pixel_rounds_to_nearest() {
        let p = to_pixel(NormalizedPoint::new(0.5, 0.25), 640, 480);
        assert_eq!(p, PixelPoint::new(320, 120));

        // 0.0015 * 1000 = 1.5 rounds away from zero
        let p = to_pixel(NormalizedPoint::new(0.0015, 0.0), 1000, 10);
        assert_eq!(p.x, 2);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(30, 40);
        assert_eq!(a.distance_to(&b), 50.0);
        assert_eq!(b.distance_to(&a), 50.0);
    }

    #[test]
    fn measure_full_hand() {
        let hand = hand_with((0.25, 0.5), (0.5, 0.5));
        let m = measure(&hand, 400, 200).ok().unwrap();
        assert_eq!(m.thumb, PixelPoint::new(100, 100));
        assert_eq!(m.index, PixelPoint::new(200, 100));
        assert_eq!(m.distance, 100.0);
    }

    #[test]
    fn measure_short_set_skips() {
        let hand = LandmarkSet::new(vec![NormalizedPoint::new(0.1, 0.1); 5]);
        assert_eq!(
            measure(&hand, 640, 480),
            StageOutcome::Skip(SkipReason::MissingLandmark {
                index: INDEX_TIP,
                available: 5,
            })
        );
    }

    #[test]
    fn measure_needs_nine_entries() {
        let eight = LandmarkSet::new(vec![NormalizedPoint::new(0.1, 0.1); 8]);
        assert!(!measure(&eight, 640, 480).is_ok());

        let nine = LandmarkSet::new(vec![NormalizedPoint::new(0.1, 0.1); 9]);
        let m = measure(&nine, 640, 480).ok().unwrap();
        assert_eq!(m.distance, 0.0);
    }

    #[test]
    fn coordinates_outside_the_frame_do_not_overflow() {
        let hand = hand_with((-0.2, 0.5), (1.2, 0.5));
        let m = measure(&hand, 4_000_000_000, 480).ok().unwrap();
        assert!(m.distance.is_finite());
        assert!(m.distance > 0.0);

        let a = PixelPoint::new(i32::MIN, 0);
        let b = PixelPoint::new(i32::MAX, 0);
        assert_eq!(a.distance_to(&b), u32::MAX as f64);
    }

    #[test]
    fn measure_reports_thumb_first_when_both_missing() {
        let hand = LandmarkSet::new(vec![NormalizedPoint::new(0.1, 0.1); 2]);
        assert_eq!(
            measure(&hand, 640, 480),
            StageOutcome::Skip(SkipReason::MissingLandmark {
                index: THUMB_TIP,
                available: 2,
            })
        );
    }
}
