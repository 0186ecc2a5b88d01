//! Per-frame processing pipeline.
//!
//! Stages run in order on the loop thread: geometry extraction, signal
//! conditioning, then actuation. Geometry returns a [`StageOutcome`] so a
//! frame can be skipped or fail without stopping the loop.

pub mod conditioner;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod types;

pub use conditioner::{
    Conditioned, ConditionerConfig, DistanceRange, SmoothingState, condition, smooth,
};
pub use dispatch::{LoopConfig, Session, run};
pub use error::{SkipReason, StageOutcome, StationError};
pub use geometry::{Measurement, PixelPoint, measure, to_pixel};
pub use types::{EndReason, FrameMode, FrameReport, PipelineMode, RunSummary};
