//! Data types for the frame pipeline.

use crate::display::Overlay;
use crate::pipeline::conditioner::Conditioned;
use crate::pipeline::error::{SkipReason, StationError};

/// Which pipeline is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Distance readout only.
    Measure,
    /// Distance drives the system volume.
    Volume,
}

/// Per-frame detection state. Re-evaluated every frame, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    HandDetected,
    NoHandDetected,
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub sequence: u64,
    pub mode: FrameMode,
    pub overlay: Overlay,
    /// Conditioner output, when the frame was measured.
    pub conditioned: Option<Conditioned>,
    pub skipped: Option<SkipReason>,
    /// Stage failure, e.g. a volume call that did not go through.
    pub failure: Option<StationError>,
}

impl FrameReport {
    pub fn no_hand(sequence: u64) -> Self {
        Self {
            sequence,
            mode: FrameMode::NoHandDetected,
            overlay: Overlay::NoHand,
            conditioned: None,
            skipped: None,
            failure: None,
        }
    }

    pub fn skipped(sequence: u64, reason: SkipReason) -> Self {
        Self {
            sequence,
            mode: FrameMode::HandDetected,
            overlay: Overlay::Skipped,
            conditioned: None,
            skipped: Some(reason),
            failure: None,
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    QuitRequested,
    EndOfStream,
    ReadFailed(String),
}

/// Counters for one run, logged at exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub hands: u64,
    pub skipped: u64,
    pub volume_failures: u64,
    pub end: EndReason,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            frames: 0,
            hands: 0,
            skipped: 0,
            volume_failures: 0,
            end: EndReason::EndOfStream,
        }
    }
}

impl RunSummary {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.mode == FrameMode::HandDetected {
            self.hands += 1;
        }
        if report.skipped.is_some() {
            self.skipped += 1;
        }
        if report.failure.is_some() {
            self.volume_failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_frames_by_kind() {
        let mut summary = RunSummary::default();
        summary.record(&FrameReport::no_hand(0));
        summary.record(&FrameReport::skipped(
            1,
            SkipReason::MissingLandmark {
                index: 8,
                available: 5,
            },
        ));
        let mut failed = FrameReport::no_hand(2);
        failed.mode = FrameMode::HandDetected;
        failed.failure = Some(StationError::new("volume", "sink gone"));
        summary.record(&failed);

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.hands, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.volume_failures, 1);
    }

    #[test]
    fn no_hand_report_has_no_output() {
        let report = FrameReport::no_hand(4);
        assert_eq!(report.mode, FrameMode::NoHandDetected);
        assert_eq!(report.overlay, Overlay::NoHand);
        assert!(report.conditioned.is_none());
    }
}
