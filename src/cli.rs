//! Command-line interface for handvol
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Hand-gesture volume control
#[derive(Parser, Debug)]
#[command(
    name = "handvol",
    version,
    about = "Control the system volume with the distance between thumb and index finger"
)]
pub struct Cli {
    /// Subcommand to execute (default: volume)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress log output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Read landmark frames from a JSON-lines file instead of starting the tracker ("-" for stdin)
    #[arg(long, global = true, value_name = "PATH")]
    pub feed: Option<PathBuf>,

    /// Camera index passed to the tracker
    #[arg(long, global = true, value_name = "INDEX")]
    pub camera: Option<u32>,

    /// Volume backend override (auto, wpctl, pactl, amixer)
    #[arg(long, global = true, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Do not poll the terminal for the quit key
    #[arg(long, global = true)]
    pub headless: bool,

    /// Quit-key wait per frame (default from config: 1ms). Examples: 1ms, 20ms, 5 (milliseconds)
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_key_poll)]
    pub key_poll: Option<Duration>,
}

/// Parse a key-poll duration.
///
/// Supports any duration format accepted by `humantime`; bare numbers are
/// milliseconds.
fn parse_key_poll(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Drive the system volume with the thumb-index distance
    Volume,

    /// Show the thumb-index distance only
    Measure,

    /// Check the tracker helper and volume backends
    Check,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
