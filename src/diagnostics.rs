//! System diagnostics and dependency checking.
//!
//! Verifies that the tracker helper and a volume tool are installed and usable.

use crate::config::{Config, TrackerConfig};
use crate::error::HandvolError;
use crate::volume::{BackendKind, CommandExecutor, VolumeCapability, open_backend};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok(String),
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues (e.g., no default sink)
    Warning(String),
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResult::Ok(_))
    }
}

/// Check if a command exists and is executable.
fn check_command(command: &str, args: &[&str]) -> CheckResult {
    match Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => CheckResult::Ok(String::new()),
        Ok(output) => CheckResult::Warning(format!(
            "'{} {}' exited with {}: {}",
            command,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check that the tracker helper starts: the full command with `--help`.
pub fn check_tracker(config: &TrackerConfig) -> CheckResult {
    let Some((program, rest)) = config.command.split_first() else {
        return CheckResult::Warning("tracker.command is empty".to_string());
    };
    let mut args: Vec<&str> = rest.iter().map(String::as_str).collect();
    args.push("--help");
    match check_command(program, &args) {
        CheckResult::Ok(_) => CheckResult::Ok(config.command.join(" ")),
        other => other,
    }
}

fn describe(capability: VolumeCapability) -> String {
    match capability {
        VolumeCapability::Scalar => "scalar volume".to_string(),
        VolumeCapability::Level { min, max } => format!("level range {} - {}", min, max),
    }
}

/// Check one volume backend the same way the run loop opens it.
pub fn check_backend(
    kind: BackendKind,
    executor: Arc<dyn CommandExecutor>,
    mixer_control: &str,
) -> CheckResult {
    match open_backend(kind, executor, mixer_control) {
        Ok(backend) => CheckResult::Ok(describe(backend.capability())),
        Err(HandvolError::VolumeToolNotFound { .. }) => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(e.to_string()),
    }
}

fn print_result(label: &str, result: &CheckResult, hint: &[&str]) {
    print!("{}: ", label);
    match result {
        CheckResult::Ok(detail) if detail.is_empty() => println!("✓ OK"),
        CheckResult::Ok(detail) => println!("✓ OK ({})", detail),
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            for line in hint {
                println!("  {}", line);
            }
        }
        CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
    }
}

/// Run all dependency checks and print results.
///
/// Returns `true` when the tracker and at least one volume backend work.
pub fn check_dependencies(config: &Config, executor: Arc<dyn CommandExecutor>) -> bool {
    println!("Checking system dependencies...\n");

    let tracker = check_tracker(&config.tracker);
    print_result(
        "Hand tracker",
        &tracker,
        &[
            "Set [tracker] command in the config file to a landmark helper",
            "that prints one JSON frame per line, or use --feed",
        ],
    );

    let mut any_backend = false;
    for kind in BackendKind::DETECTION_ORDER {
        let result = check_backend(kind, executor.clone(), &config.volume.mixer_control);
        let hint: &[&str] = match kind {
            BackendKind::Wpctl => &["Install: sudo apt install wireplumber  (PipeWire)"],
            BackendKind::Pactl => &["Install: sudo apt install pulseaudio-utils"],
            BackendKind::Amixer | BackendKind::Auto => &["Install: sudo apt install alsa-utils"],
        };
        print_result(&format!("{} (volume)", kind), &result, hint);
        any_backend |= result.is_ok();
    }

    println!();
    let selected = config.volume.backend;
    if selected != BackendKind::Auto {
        println!("Configured backend: {}", selected);
    }
    let ready = tracker.is_ok() && any_backend;
    if ready {
        println!("✓ Ready to control the volume.");
    } else if !any_backend {
        println!("⚠ No volume backend works; `handvol measure` still runs.");
    } else {
        println!("⚠ Tracker not available; only --feed input will work.");
    }
    ready
}
