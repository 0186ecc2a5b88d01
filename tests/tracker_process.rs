//! The frame loop driven by a real child process standing in for the tracker.

use handvol::config::TrackerConfig;
use handvol::display::{NoKeys, RecordingDisplay};
use handvol::pipeline::{LoopConfig, Session, run};
use handvol::tracking::detector::FeedDetector;
use handvol::tracking::feed::TrackerProcess;
use handvol::volume::MockVolume;
use handvol::{Config, EndReason, HandvolError, PipelineMode};
use std::path::PathBuf;
use std::time::Duration;

fn replaying_tracker(script: String) -> TrackerConfig {
    TrackerConfig {
        command: vec!["sh".to_string(), "-c".to_string(), script],
        ..TrackerConfig::default()
    }
}

#[test]
fn tracker_output_drives_the_volume() {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pinch_sweep.jsonl");
    let tracker = replaying_tracker(format!("cat '{}'", fixture.display()));
    let config = Config::default();
    let conditioner = config.conditioner_config(PipelineMode::Volume).unwrap();

    let mut session = Session::volume(conditioner, MockVolume::scalar());
    let mut source = TrackerProcess::new(&tracker);
    let summary = run(
        &mut session,
        &mut source,
        &mut FeedDetector::from_config(&tracker),
        &mut RecordingDisplay::new(),
        &mut NoKeys,
        LoopConfig {
            key_timeout: Duration::ZERO,
        },
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::EndOfStream);
    assert_eq!(summary.frames, 6);
    assert_eq!(session.volume_backend().unwrap().set_count(), 3);
}

#[test]
fn tracker_without_frames_is_a_startup_failure() {
    let tracker = replaying_tracker("echo 'cannot open camera' >&2; exit 1".to_string());
    let mut session: Session<MockVolume> =
        Session::measure(Config::default().conditioner_config(PipelineMode::Measure).unwrap());
    let mut display = RecordingDisplay::new();
    let result = run(
        &mut session,
        &mut TrackerProcess::new(&tracker),
        &mut FeedDetector::from_config(&tracker),
        &mut display,
        &mut NoKeys,
        LoopConfig {
            key_timeout: Duration::ZERO,
        },
    );

    match result {
        Err(HandvolError::TrackerUnavailable { message }) => {
            assert!(message.contains("camera 0"), "unexpected message: {}", message)
        }
        other => panic!("expected TrackerUnavailable, got {:?}", other),
    }
    assert!(display.overlays().is_empty());
}

#[test]
fn long_running_tracker_is_stopped_on_quit() {
    // Prints one empty frame, then would stream forever
    let tracker = replaying_tracker(
        "echo '{\"width\":640,\"height\":480}'; while :; do sleep 1; done".to_string(),
    );
    let mut session: Session<MockVolume> =
        Session::measure(Config::default().conditioner_config(PipelineMode::Measure).unwrap());
    let mut source = TrackerProcess::new(&tracker);
    let summary = run(
        &mut session,
        &mut source,
        &mut FeedDetector::from_config(&tracker),
        &mut RecordingDisplay::new(),
        &mut handvol::display::ScriptedKeys::key_at(0, 'q'),
        LoopConfig {
            key_timeout: Duration::ZERO,
        },
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::QuitRequested);
    assert_eq!(summary.frames, 1);
}
