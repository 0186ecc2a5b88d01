use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use handvol::app::{RunOptions, run_measure_command, run_volume_command};
use handvol::cli::{Cli, Commands, ConfigAction};
use handvol::config::Config;
use handvol::diagnostics::check_dependencies;
use handvol::pipeline::types::{EndReason, RunSummary};
use handvol::volume::SystemCommandExecutor;
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let options = RunOptions {
        feed: cli.feed.clone(),
        camera: cli.camera,
        backend: cli.backend.clone(),
        headless: cli.headless,
        key_poll: cli.key_poll,
    };

    match cli.command {
        None | Some(Commands::Volume) => {
            let config = load_config(cli.config.as_deref())?;
            tracing::info!("handvol {} (volume)", handvol::version_string());
            let summary = run_volume_command(config, options)?;
            report_summary(&summary, cli.quiet);
        }
        Some(Commands::Measure) => {
            let config = load_config(cli.config.as_deref())?;
            tracing::info!("handvol {} (measure)", handvol::version_string());
            let summary = run_measure_command(config, options)?;
            report_summary(&summary, cli.quiet);
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            if !check_dependencies(&config, Arc::new(SystemCommandExecutor::new())) {
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "handvol", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/handvol/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        }
    };

    Ok(config.with_env_overrides()?)
}

fn report_summary(summary: &RunSummary, quiet: bool) {
    if quiet {
        return;
    }
    let end = match &summary.end {
        EndReason::QuitRequested => "quit".to_string(),
        EndReason::EndOfStream => "end of stream".to_string(),
        EndReason::ReadFailed(message) => format!("frame read failed: {}", message),
    };
    eprintln!(
        "{} frames, {} with a hand, {} skipped, {} volume failures ({})",
        summary.frames,
        summary.hands,
        summary.skipped,
        summary.volume_failures,
        end.dimmed()
    );
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(|p| p.to_path_buf())
                .or_else(Config::default_path)
                .context("could not determine the config directory")?;
            let status = if path.exists() {
                "exists".green().to_string()
            } else {
                "not created, using defaults".yellow().to_string()
            };
            println!("{} ({})", path.display(), status);
        }
    }
    Ok(())
}
