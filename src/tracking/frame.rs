//! Frames and the frame source seam.

use crate::error::{HandvolError, Result};
use crate::tracking::landmarks::TrackedHand;
use std::collections::VecDeque;

/// One video frame as seen by the pipeline.
///
/// Pixel data stays with the tracker; the pipeline only needs the frame
/// dimensions and whatever hands the tracker annotated the frame with.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Sequence number assigned by the source, starting at 0.
    pub sequence: u64,
    /// Hands the upstream tracker reported for this frame, best first.
    pub hands: Vec<TrackedHand>,
}

impl Frame {
    pub fn new(width: u32, height: u32, sequence: u64) -> Self {
        Self {
            width,
            height,
            sequence,
            hands: Vec::new(),
        }
    }

    pub fn with_hands(mut self, hands: Vec<TrackedHand>) -> Self {
        self.hands = hands;
        self
    }
}

/// Trait for frame sources.
///
/// This trait allows swapping implementations (tracker process, recorded feed, mock).
pub trait FrameSource {
    /// Open the source.
    ///
    /// # Returns
    /// Ok(()) if frames can be read, or an error (fatal at startup)
    fn open(&mut self) -> Result<()>;

    /// Block until the next frame is available.
    ///
    /// # Returns
    /// `Ok(Some(frame))` for a frame, `Ok(None)` at end of stream, or an error
    fn read(&mut self) -> Result<Option<Frame>>;

    /// Release the source. Called again on drop, so it must be idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Mock frame source for testing
#[derive(Debug, Clone, Default)]
pub struct MockFrameSource {
    is_open: bool,
    frames: VecDeque<Frame>,
    should_fail_open: bool,
    fail_read_at: Option<usize>,
    reads: usize,
}

impl MockFrameSource {
    /// Create a mock that yields `frames` and then ends the stream
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            ..Self::default()
        }
    }

    /// Configure the mock to fail on open
    pub fn with_open_failure(mut self) -> Self {
        self.should_fail_open = true;
        self
    }

    /// Configure the mock to fail on the n-th read (0-based)
    pub fn with_read_failure_at(mut self, n: usize) -> Self {
        self.fail_read_at = Some(n);
        self
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Number of frames not yet read
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MockFrameSource {
    fn open(&mut self) -> Result<()> {
        if self.should_fail_open {
            return Err(HandvolError::TrackerUnavailable {
                message: "mock camera unavailable".to_string(),
            });
        }
        self.is_open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if !self.is_open {
            return Err(HandvolError::FrameRead {
                message: "source not open".to_string(),
            });
        }
        let n = self.reads;
        self.reads += 1;
        if self.fail_read_at == Some(n) {
            return Err(HandvolError::FrameRead {
                message: "mock read error".to_string(),
            });
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }
}
