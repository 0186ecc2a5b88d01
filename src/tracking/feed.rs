//! Landmark feed: JSON-lines frames produced by an external hand tracker.
//!
//! The tracker (a MediaPipe Hands helper, or a recording of one) prints one
//! object per frame:
//!
//! ```text
//! {"width":640,"height":480,"hands":[{"score":0.93,"landmarks":[[0.41,0.62], ...]}]}
//! ```
//!
//! `hands` may be empty or missing when nothing was detected.

use crate::config::TrackerConfig;
use crate::defaults;
use crate::error::{HandvolError, Result};
use crate::tracking::frame::{Frame, FrameSource};
use crate::tracking::landmarks::TrackedHand;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

#[derive(Debug, Deserialize)]
struct FeedRecord {
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<TrackedHand>,
}

/// Parse one feed line into a frame.
pub fn parse_frame(line: &str, line_number: u64, sequence: u64) -> Result<Frame> {
    let record: FeedRecord =
        serde_json::from_str(line).map_err(|source| HandvolError::FrameParse {
            line: line_number,
            source,
        })?;
    Ok(Frame::new(record.width, record.height, sequence).with_hands(record.hands))
}

/// Frame source reading a landmark feed from any buffered reader.
pub struct FeedSource<R: BufRead> {
    reader: R,
    is_open: bool,
    line_number: u64,
    sequence: u64,
    buf: String,
}

impl<R: BufRead> FeedSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            is_open: false,
            line_number: 0,
            sequence: 0,
            buf: String::new(),
        }
    }
}

impl FeedSource<Box<dyn BufRead>> {
    /// Open a recorded feed file, or stdin when `path` is `-`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader: Box<dyn BufRead> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(path).map_err(|e| HandvolError::TrackerUnavailable {
                message: format!("cannot open feed {}: {}", path.display(), e),
            })?;
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> FrameSource for FeedSource<R> {
    fn open(&mut self) -> Result<()> {
        self.is_open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if !self.is_open {
            return Err(HandvolError::FrameRead {
                message: "feed not open".to_string(),
            });
        }
        loop {
            self.buf.clear();
            let n = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|e| HandvolError::FrameRead {
                    message: e.to_string(),
                })?;
            if n == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            let frame = parse_frame(line, self.line_number, self.sequence)?;
            self.sequence += 1;
            return Ok(Some(frame));
        }
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }
}

/// Build the tracker argv: configured command plus camera and detector settings.
pub fn tracker_args(config: &TrackerConfig) -> Vec<String> {
    let mut args: Vec<String> = config.command.iter().skip(1).cloned().collect();
    args.extend([
        "--camera".to_string(),
        config.camera.to_string(),
        "--max-hands".to_string(),
        config.max_hands.to_string(),
        "--min-detection-confidence".to_string(),
        config.min_detection_confidence.to_string(),
        "--min-tracking-confidence".to_string(),
        config.min_tracking_confidence.to_string(),
    ]);
    args
}

/// Frame source backed by a tracker child process.
///
/// The process owns the camera and the landmark model; we read its stdout.
/// It is killed when the source is closed or dropped.
pub struct TrackerProcess {
    config: TrackerConfig,
    child: Option<Child>,
    feed: Option<FeedSource<BufReader<ChildStdout>>>,
    pending: Option<Frame>,
}

impl TrackerProcess {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            config: config.clone(),
            child: None,
            feed: None,
            pending: None,
        }
    }

    fn program(&self) -> Result<&str> {
        self.config
            .command
            .first()
            .map(String::as_str)
            .ok_or_else(|| HandvolError::TrackerUnavailable {
                message: "tracker.command is empty".to_string(),
            })
    }

    /// Exit status of a tracker that closed its stdout, for diagnostics.
    fn exit_description(&mut self) -> String {
        match self.child.as_mut().map(Child::wait) {
            Some(Ok(status)) => format!("tracker exited with {}", status),
            Some(Err(e)) => format!("tracker state unknown: {}", e),
            None => "tracker not running".to_string(),
        }
    }
}

impl FrameSource for TrackerProcess {
    fn open(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let program = self.program()?.to_string();
        let args = tracker_args(&self.config);

        let mut child = Command::new(&program)
            .args(&args)
            .env(defaults::TF_LOG_ENV, defaults::TF_LOG_LEVEL)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| HandvolError::TrackerUnavailable {
                message: format!("failed to launch '{}': {}", program, e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HandvolError::TrackerUnavailable {
                message: "tracker stdout not captured".to_string(),
            })?;

        tracing::info!(
            pid = child.id(),
            camera = self.config.camera,
            "tracker process started"
        );

        self.child = Some(child);
        let mut feed = FeedSource::new(BufReader::new(stdout));
        feed.open()?;

        // A tracker that cannot open the camera exits before its first frame;
        // surface that as a startup failure rather than an empty stream.
        match feed.read()? {
            Some(frame) => self.pending = Some(frame),
            None => {
                let exit = self.exit_description();
                let message = format!(
                    "camera {} could not be opened ({})",
                    self.config.camera, exit
                );
                self.child = None;
                return Err(HandvolError::TrackerUnavailable { message });
            }
        }
        self.feed = Some(feed);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        match self.feed.as_mut() {
            Some(feed) => feed.read(),
            None => Err(HandvolError::FrameRead {
                message: "tracker not started".to_string(),
            }),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.feed = None;
        self.pending = None;
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                child.kill()?;
            }
            child.wait()?;
            tracing::debug!("tracker process stopped");
        }
        Ok(())
    }
}

impl Drop for TrackerProcess {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to stop tracker process: {}", e);
        }
    }
}
