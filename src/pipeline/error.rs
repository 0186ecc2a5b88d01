//! Stage outcomes and error classification for the frame pipeline.

use std::fmt;

/// Result of one per-frame stage.
///
/// `Skip` drops the rest of the pipeline for this frame without touching
/// state.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Ok(T),
    Skip(SkipReason),
}

impl<T> StageOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            StageOutcome::Ok(v) => Some(v),
            _ => None,
        }
    }
}

/// Why a frame was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The landmark set ended before the requested index.
    MissingLandmark { index: usize, available: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingLandmark { index, available } => {
                write!(f, "landmark {} missing ({} reported)", index, available)
            }
        }
    }
}

/// A per-frame stage error. The loop logs it and carries on with the next
/// frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StationError {
    pub stage: &'static str,
    pub message: String,
}

impl StationError {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

impl std::error::Error for StationError {}
