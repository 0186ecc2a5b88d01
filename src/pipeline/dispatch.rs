//! Per-frame dispatch and the main loop.
//!
//! One frame at a time: read → detect → measure → condition → actuate →
//! render → poll quit key. Frames without a hand run nothing and leave the
//! last volume in effect.

use crate::defaults::QUIT_KEY;
use crate::display::{Display, KeyPoller, Overlay};
use crate::error::Result;
use crate::pipeline::conditioner::{ConditionerConfig, SmoothingState, condition};
use crate::pipeline::error::StageOutcome;
use crate::pipeline::geometry::measure;
use crate::pipeline::types::{EndReason, FrameMode, FrameReport, PipelineMode, RunSummary};
use crate::tracking::detector::HandDetector;
use crate::tracking::frame::{Frame, FrameSource};
use crate::volume::control::{VolumeControl, apply_volume};
use std::time::Duration;

/// Pipeline state carried across frames.
pub struct Session<V: VolumeControl> {
    conditioner: ConditionerConfig,
    state: SmoothingState,
    last_control: Option<f64>,
    volume: Option<V>,
}

impl<V: VolumeControl> Session<V> {
    /// Distance readout only; the conditioner should have no control stage.
    pub fn measure(conditioner: ConditionerConfig) -> Self {
        Self {
            conditioner,
            state: SmoothingState::default(),
            last_control: None,
            volume: None,
        }
    }

    /// Volume pipeline driving `volume`.
    pub fn volume(conditioner: ConditionerConfig, volume: V) -> Self {
        Self {
            conditioner,
            state: SmoothingState::default(),
            last_control: None,
            volume: Some(volume),
        }
    }

    pub fn mode(&self) -> PipelineMode {
        if self.volume.is_some() {
            PipelineMode::Volume
        } else {
            PipelineMode::Measure
        }
    }

    pub fn state(&self) -> SmoothingState {
        self.state
    }

    /// Last control value computed from a measured hand.
    pub fn last_control(&self) -> Option<f64> {
        self.last_control
    }

    pub fn volume_backend(&self) -> Option<&V> {
        self.volume.as_ref()
    }

    /// Run one frame through the pipeline.
    pub fn process_frame(&mut self, detector: &mut dyn HandDetector, frame: &Frame) -> FrameReport {
        let Some(landmarks) = detector.detect(frame) else {
            return FrameReport::no_hand(frame.sequence);
        };

        let measurement = match measure(&landmarks, frame.width, frame.height) {
            StageOutcome::Ok(m) => m,
            StageOutcome::Skip(reason) => {
                tracing::trace!(frame = frame.sequence, "frame skipped: {}", reason);
                return FrameReport::skipped(frame.sequence, reason);
            }
        };

        let (state, conditioned) = condition(&self.conditioner, self.state, measurement.distance);
        self.state = state;
        self.last_control = Some(conditioned.control);

        let mut failure = None;
        if let Some(volume) = self.volume.as_mut()
            && let Err(err) = apply_volume(volume, conditioned.control)
        {
            tracing::warn!(frame = frame.sequence, "Setting system volume failed: {}", err);
            failure = Some(err);
        }

        FrameReport {
            sequence: frame.sequence,
            mode: FrameMode::HandDetected,
            overlay: Overlay::Hand {
                thumb: measurement.thumb,
                index: measurement.index,
                distance: conditioned.smoothed_distance,
                volume: self.volume.as_ref().map(|_| conditioned.control),
            },
            conditioned: Some(conditioned),
            skipped: None,
            failure,
        }
    }
}

/// Main loop settings.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Bounded wait for the quit key, once per frame.
    pub key_timeout: Duration,
}

/// Open `source` and run frames until quit, end of stream, or a read failure.
///
/// The source is closed on the way out, including when rendering or key
/// polling fails.
pub fn run<V: VolumeControl>(
    session: &mut Session<V>,
    source: &mut dyn FrameSource,
    detector: &mut dyn HandDetector,
    display: &mut dyn Display,
    keys: &mut dyn KeyPoller,
    config: LoopConfig,
) -> Result<RunSummary> {
    source.open()?;
    tracing::info!(mode = ?session.mode(), "pipeline started");

    let summary = match run_frames(session, source, detector, display, keys, config) {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(close_err) = source.close() {
                tracing::warn!("Failed to close frame source: {}", close_err);
            }
            return Err(e);
        }
    };

    source.close()?;
    tracing::info!(
        frames = summary.frames,
        hands = summary.hands,
        skipped = summary.skipped,
        volume_failures = summary.volume_failures,
        end = ?summary.end,
        "pipeline stopped"
    );
    Ok(summary)
}

fn run_frames<V: VolumeControl>(
    session: &mut Session<V>,
    source: &mut dyn FrameSource,
    detector: &mut dyn HandDetector,
    display: &mut dyn Display,
    keys: &mut dyn KeyPoller,
    config: LoopConfig,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    loop {
        let frame = match source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                summary.end = EndReason::EndOfStream;
                break;
            }
            Err(e) => {
                tracing::warn!("Failed to read frame: {}", e);
                summary.end = EndReason::ReadFailed(e.to_string());
                break;
            }
        };

        let report = session.process_frame(detector, &frame);
        summary.record(&report);

        display.render(&report.overlay)?;

        if keys.poll_key(config.key_timeout)? == Some(QUIT_KEY) {
            summary.end = EndReason::QuitRequested;
            break;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{INDEX_TIP, THUMB_TIP};
    use crate::display::{NoKeys, RecordingDisplay, ScriptedKeys};
    use crate::error::HandvolError;
    use crate::pipeline::conditioner::DistanceRange;
    use crate::tracking::detector::FeedDetector;
    use crate::tracking::frame::MockFrameSource;
    use crate::tracking::landmarks::{LandmarkSet, NormalizedPoint, TrackedHand};
    use crate::volume::control::MockVolume;

    fn conditioner(control_alpha: Option<f64>) -> ConditionerConfig {
        ConditionerConfig::new(0.0, control_alpha, DistanceRange::new(20.0, 220.0).unwrap())
            .unwrap()
    }

    /// Frame 400 px wide with thumb and index `distance_px` apart horizontally.
    fn hand_frame(sequence: u64, distance_px: f32) -> Frame {
        let mut points = vec![NormalizedPoint::new(0.5, 0.5); 21];
        points[THUMB_TIP] = NormalizedPoint::new(0.0, 0.5);
        points[INDEX_TIP] = NormalizedPoint::new(distance_px / 400.0, 0.5);
        Frame::new(400, 200, sequence).with_hands(vec![TrackedHand {
            score: 0.9,
            landmarks: LandmarkSet::new(points),
        }])
    }

    fn short_hand_frame(sequence: u64) -> Frame {
        Frame::new(400, 200, sequence).with_hands(vec![TrackedHand {
            score: 0.9,
            landmarks: LandmarkSet::new(vec![NormalizedPoint::new(0.1, 0.1); 5]),
        }])
    }

    fn detector() -> FeedDetector {
        FeedDetector::new(1, 0.6)
    }

    #[test]
    fn detected_hand_sets_volume() {
        let mut session = Session::volume(conditioner(None), MockVolume::scalar());
        let report = session.process_frame(&mut detector(), &hand_frame(0, 120.0));

        assert_eq!(report.mode, FrameMode::HandDetected);
        let out = report.conditioned.unwrap();
        assert_eq!(out.smoothed_distance, 120.0);
        assert_eq!(out.norm, 0.5);
        assert_eq!(session.volume_backend().unwrap().scalars(), &[0.5]);
        assert_eq!(session.last_control(), Some(0.5));
    }

    #[test]
    fn no_hand_holds_state_and_volume() {
        let mut session = Session::volume(conditioner(Some(0.65)), MockVolume::scalar());
        session.process_frame(&mut detector(), &hand_frame(0, 150.0));
        let state_before = session.state();
        let control_before = session.last_control();

        let report = session.process_frame(&mut detector(), &Frame::new(400, 200, 1));

        assert_eq!(report.mode, FrameMode::NoHandDetected);
        assert_eq!(report.overlay, Overlay::NoHand);
        assert_eq!(
            session.state().prev_distance.to_bits(),
            state_before.prev_distance.to_bits()
        );
        assert_eq!(
            session.state().prev_control.to_bits(),
            state_before.prev_control.to_bits()
        );
        assert_eq!(session.last_control(), control_before);
        // Only the first frame touched the volume
        assert_eq!(session.volume_backend().unwrap().set_count(), 1);
    }

    #[test]
    fn short_landmark_set_skips_without_touching_state() {
        let mut session = Session::volume(conditioner(Some(0.65)), MockVolume::scalar());
        let report = session.process_frame(&mut detector(), &short_hand_frame(0));

        assert!(report.skipped.is_some());
        assert_eq!(report.overlay, Overlay::Skipped);
        assert_eq!(session.state(), SmoothingState::default());
        assert_eq!(session.last_control(), None);
        assert_eq!(session.volume_backend().unwrap().set_count(), 0);
    }

    #[test]
    fn volume_failure_is_reported_and_state_kept() {
        let mut session = Session::volume(
            conditioner(None),
            MockVolume::scalar().with_set_failure(),
        );
        let report = session.process_frame(&mut detector(), &hand_frame(0, 220.0));

        assert!(report.failure.is_some());
        assert_eq!(report.failure.as_ref().unwrap().stage, "volume");
        assert_eq!(session.state().prev_distance, 220.0);
        assert_eq!(session.last_control(), Some(1.0));
    }

    #[test]
    fn measure_session_reports_distance_without_volume() {
        let mut session: Session<MockVolume> = Session::measure(conditioner(None));
        assert_eq!(session.mode(), PipelineMode::Measure);
        let report = session.process_frame(&mut detector(), &hand_frame(0, 100.0));
        match report.overlay {
            Overlay::Hand {
                distance, volume, ..
            } => {
                assert_eq!(distance, 100.0);
                assert_eq!(volume, None);
            }
            other => panic!("expected hand overlay, got {:?}", other),
        }
    }

    #[test]
    fn run_until_end_of_stream() {
        let mut session = Session::volume(conditioner(None), MockVolume::scalar());
        let mut source = MockFrameSource::new(vec![
            hand_frame(0, 120.0),
            Frame::new(400, 200, 1),
            short_hand_frame(2),
            hand_frame(3, 220.0),
        ]);
        let mut display = RecordingDisplay::new();
        let summary = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut display,
            &mut NoKeys,
            LoopConfig {
                key_timeout: Duration::from_millis(1),
            },
        )
        .unwrap();

        assert_eq!(summary.end, EndReason::EndOfStream);
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.hands, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(display.overlays().len(), 4);
        assert_eq!(display.overlays()[1], Overlay::NoHand);
        assert_eq!(session.volume_backend().unwrap().scalars(), &[0.5, 1.0]);
        assert!(!source.is_open());
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut session = Session::volume(conditioner(None), MockVolume::scalar());
        let frames = (0..10).map(|i| hand_frame(i, 120.0)).collect();
        let mut source = MockFrameSource::new(frames);
        let mut keys = ScriptedKeys::key_at(2, 'q');
        let summary = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut RecordingDisplay::new(),
            &mut keys,
            LoopConfig {
                key_timeout: Duration::from_millis(1),
            },
        )
        .unwrap();

        assert_eq!(summary.end, EndReason::QuitRequested);
        assert_eq!(summary.frames, 3);
        assert_eq!(source.remaining(), 7);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut session: Session<MockVolume> = Session::measure(conditioner(None));
        let mut source = MockFrameSource::new(vec![Frame::new(1, 1, 0), Frame::new(1, 1, 1)]);
        let mut keys = ScriptedKeys::new(vec![Some('x'), Some('Q')]);
        let summary = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut RecordingDisplay::new(),
            &mut keys,
            LoopConfig {
                key_timeout: Duration::ZERO,
            },
        )
        .unwrap();
        assert_eq!(summary.end, EndReason::EndOfStream);
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn read_failure_ends_the_loop() {
        let mut session: Session<MockVolume> = Session::measure(conditioner(None));
        let mut source =
            MockFrameSource::new(vec![Frame::new(1, 1, 0), Frame::new(1, 1, 1)]).with_read_failure_at(1);
        let summary = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut RecordingDisplay::new(),
            &mut NoKeys,
            LoopConfig {
                key_timeout: Duration::ZERO,
            },
        )
        .unwrap();
        assert!(matches!(summary.end, EndReason::ReadFailed(_)));
        assert_eq!(summary.frames, 1);
    }

    #[test]
    fn open_failure_never_enters_the_loop() {
        let mut session: Session<MockVolume> = Session::measure(conditioner(None));
        let mut source = MockFrameSource::new(vec![Frame::new(1, 1, 0)]).with_open_failure();
        let mut display = RecordingDisplay::new();
        let result = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut display,
            &mut NoKeys,
            LoopConfig {
                key_timeout: Duration::ZERO,
            },
        );
        assert!(matches!(
            result,
            Err(HandvolError::TrackerUnavailable { .. })
        ));
        assert!(display.overlays().is_empty());
    }

    struct BrokenDisplay;

    impl Display for BrokenDisplay {
        fn render(&mut self, _overlay: &Overlay) -> Result<()> {
            Err(HandvolError::Display {
                message: "terminal gone".to_string(),
            })
        }
    }

    #[test]
    fn render_failure_still_closes_the_source() {
        let mut session: Session<MockVolume> = Session::measure(conditioner(None));
        let mut source = MockFrameSource::new(vec![Frame::new(640, 480, 0), Frame::new(640, 480, 1)]);
        let result = run(
            &mut session,
            &mut source,
            &mut detector(),
            &mut BrokenDisplay,
            &mut NoKeys,
            LoopConfig {
                key_timeout: Duration::ZERO,
            },
        );
        assert!(matches!(result, Err(HandvolError::Display { .. })));
        assert!(!source.is_open());
        assert_eq!(source.remaining(), 1);
    }
}
