//! Hand-gesture volume application entry point.
//!
//! Wires the concrete pieces together and runs the loop:
//! tracker → detector → geometry → conditioner → volume → overlay

use crate::config::Config;
use crate::display::{KeyPoller, NoKeys, TerminalDisplay, TtyKeys};
use crate::error::Result;
use crate::pipeline::dispatch::{LoopConfig, Session, run};
use crate::pipeline::types::{PipelineMode, RunSummary};
use crate::tracking::detector::FeedDetector;
use crate::tracking::feed::{FeedSource, TrackerProcess};
use crate::tracking::frame::FrameSource;
use crate::volume::{
    SystemCommandExecutor, VolumeCapability, VolumeControl, open_backend,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Recorded or piped landmark feed instead of the tracker process.
    pub feed: Option<PathBuf>,
    pub camera: Option<u32>,
    pub backend: Option<String>,
    /// Skip quit-key polling.
    pub headless: bool,
    pub key_poll: Option<Duration>,
}

impl RunOptions {
    /// Fold the overrides into `config`.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(camera) = self.camera {
            config.tracker.camera = camera;
        }
        if let Some(backend) = &self.backend {
            config.volume.backend = backend.parse()?;
        }
        if let Some(poll) = self.key_poll {
            config.display.key_poll_ms = u64::try_from(poll.as_millis()).unwrap_or(u64::MAX);
        }
        Ok(())
    }
}

/// Run the volume pipeline until the user quits or the frame source ends.
pub fn run_volume_command(config: Config, options: RunOptions) -> Result<RunSummary> {
    run_pipeline(config, PipelineMode::Volume, options)
}

/// Run the distance readout until the user quits or the frame source ends.
pub fn run_measure_command(config: Config, options: RunOptions) -> Result<RunSummary> {
    run_pipeline(config, PipelineMode::Measure, options)
}

fn run_pipeline(mut config: Config, mode: PipelineMode, options: RunOptions) -> Result<RunSummary> {
    options.apply(&mut config)?;
    config.validate()?;

    let conditioner = config.conditioner_config(mode)?;
    let tracker = config.tracker_for(mode);
    let mut detector = FeedDetector::from_config(&tracker);

    let mut session: Session<Box<dyn VolumeControl>> = match mode {
        PipelineMode::Measure => Session::measure(conditioner),
        PipelineMode::Volume => {
            let backend = open_backend(
                config.volume.backend,
                Arc::new(SystemCommandExecutor::new()),
                &config.volume.mixer_control,
            )?;
            match backend.capability() {
                VolumeCapability::Scalar => {
                    tracing::info!(backend = backend.name(), "volume control: scalar");
                }
                VolumeCapability::Level { min, max } => {
                    tracing::info!(backend = backend.name(), min, max, "volume control: level range");
                }
            }
            Session::volume(conditioner, backend)
        }
    };

    let mut source: Box<dyn FrameSource> = match &options.feed {
        Some(path) => {
            tracing::info!(feed = %path.display(), "reading landmark feed");
            Box::new(FeedSource::from_path(path)?)
        }
        None => Box::new(TrackerProcess::new(&tracker)),
    };

    let mut keys: Box<dyn KeyPoller> = if options.headless {
        Box::new(NoKeys)
    } else {
        match TtyKeys::open() {
            Ok(keys) => Box::new(keys),
            Err(e) => {
                tracing::warn!("Quit key unavailable ({}); stop with Ctrl+C", e);
                Box::new(NoKeys)
            }
        }
    };

    let color = config.display.color && std::io::stderr().is_terminal();
    let mut display = TerminalDisplay::stderr(color);

    let result = run(
        &mut session,
        source.as_mut(),
        &mut detector,
        &mut display,
        keys.as_mut(),
        LoopConfig {
            key_timeout: config.key_poll(),
        },
    );
    // End the status line before any error is printed below it
    let finished = display.finish();
    let summary = result?;
    finished?;
    Ok(summary)
}
