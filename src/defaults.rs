//! Default configuration constants for handvol.
//!
//! Shared by the config types, the CLI and the tests so that tuning values
//! live in one place.

/// Landmark index of the thumb tip in the 21-point hand model.
pub const THUMB_TIP: usize = 4;

/// Landmark index of the index fingertip in the 21-point hand model.
pub const INDEX_TIP: usize = 8;

/// Number of keypoints the hand model reports per hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Smoothing factor for the measured finger distance.
///
/// Higher values damp detector jitter more but make the readout lag.
pub const DISTANCE_ALPHA: f64 = 0.75;

/// Smoothing factor for the volume control value.
pub const CONTROL_ALPHA: f64 = 0.65;

/// Finger separation in pixels that maps to 0% volume.
pub const MIN_DISTANCE: f64 = 20.0;

/// Finger separation in pixels that maps to 100% volume.
///
/// Depends on camera resolution and hand size; 220px suits a 640x480 feed
/// with the hand at arm's length.
pub const MAX_DISTANCE: f64 = 220.0;

/// Only one hand is tracked.
pub const MAX_HANDS: u32 = 1;

/// Detection and tracking confidence used by the volume pipeline.
pub const VOLUME_CONFIDENCE: f32 = 0.6;

/// Detection and tracking confidence used by the measure pipeline
/// (the detector library's own default).
pub const MEASURE_CONFIDENCE: f32 = 0.5;

/// Default camera device index.
pub const CAMERA_INDEX: u32 = 0;

/// Bounded wait for the quit key, once per frame.
pub const KEY_POLL_MS: u64 = 1;

/// Key that requests quit from the display.
pub const QUIT_KEY: char = 'q';

/// ALSA mixer control driven by the amixer backend.
pub const MIXER_CONTROL: &str = "Master";

/// Environment variable that silences TensorFlow Lite logging in the tracker.
pub const TF_LOG_ENV: &str = "TF_CPP_MIN_LOG_LEVEL";

/// "2" hides info and warning records, keeping errors.
pub const TF_LOG_LEVEL: &str = "2";

/// Default argv of the landmark helper process.
///
/// The helper must print one JSON frame per line on stdout.
pub fn tracker_command() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "handvol_tracker".to_string(),
    ]
}
