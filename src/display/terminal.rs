//! Terminal overlay: one status line on stderr, redrawn every frame.

use crate::display::{Display, KeyPoller, Overlay};
use crate::error::{HandvolError, Result};
use crate::sys;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::time::Duration;

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Width of the volume bar in cells.
const BAR_WIDTH: usize = 20;

/// Clear the current terminal line.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Render a volume bar, e.g. `[█████░░░░░░░░░░░░░░░]`.
pub fn format_volume_bar(volume: f64) -> String {
    let filled = ((volume.clamp(0.0, 1.0) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Volume as a whole percentage, truncated.
pub fn volume_percent(volume: f64) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0) as u32
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Text of the overlay line, or `None` when the previous line should stay.
pub fn format_overlay(overlay: &Overlay, color: bool) -> Option<String> {
    match overlay {
        Overlay::Hand {
            thumb,
            index,
            distance,
            volume,
        } => {
            let points = paint(
                &format!(
                    "thumb ({},{}) index ({},{})",
                    thumb.x, thumb.y, index.x, index.y
                ),
                DIM,
                color,
            );
            let line = match volume {
                Some(v) => format!(
                    "{} {} {}  {}",
                    paint(&format!("Dist: {}", *distance as i64), CYAN, color),
                    paint(&format_volume_bar(*v), GREEN, color),
                    paint(&format!("Volume: {}%", volume_percent(*v)), GREEN, color),
                    points
                ),
                None => format!(
                    "{}  {}",
                    paint(&format!("Distance: {}", *distance as i64), GREEN, color),
                    points
                ),
            };
            Some(line)
        }
        Overlay::NoHand => Some(paint("No hand detected", RED, color)),
        Overlay::Skipped => None,
    }
}

/// Display that redraws a single status line on a writer (stderr by default).
pub struct TerminalDisplay<W: Write = io::Stderr> {
    out: W,
    color: bool,
    drawn: bool,
}

impl TerminalDisplay<io::Stderr> {
    pub fn stderr(color: bool) -> Self {
        Self::new(io::stderr(), color)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            drawn: false,
        }
    }

    /// Finish the status line so later output starts on a fresh line.
    pub fn finish(&mut self) -> Result<()> {
        if self.drawn {
            writeln!(self.out).map_err(display_error)?;
            self.out.flush().map_err(display_error)?;
            self.drawn = false;
        }
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

fn display_error(e: io::Error) -> HandvolError {
    HandvolError::Display {
        message: e.to_string(),
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn render(&mut self, overlay: &Overlay) -> Result<()> {
        let Some(line) = format_overlay(overlay, self.color) else {
            return Ok(());
        };
        write!(self.out, "{CLEAR_LINE}{line}").map_err(display_error)?;
        self.out.flush().map_err(display_error)?;
        self.drawn = true;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        // Best effort; the writer may already be gone at shutdown
        self.finish().ok();
    }
}

/// Quit-key poller reading single keypresses from the controlling terminal.
pub struct TtyKeys {
    // Declared before `tty` so the terminal is restored before the fd closes
    _cbreak: sys::CbreakGuard,
    tty: File,
}

impl TtyKeys {
    /// Open `/dev/tty` and switch it to cbreak mode until dropped.
    pub fn open() -> Result<Self> {
        let tty = OpenOptions::new()
            .read(true)
            .open("/dev/tty")
            .map_err(|e| HandvolError::Display {
                message: format!("cannot open /dev/tty: {}", e),
            })?;
        if !sys::is_tty(tty.as_raw_fd()) {
            return Err(HandvolError::Display {
                message: "/dev/tty is not a terminal".to_string(),
            });
        }
        let cbreak = sys::CbreakGuard::enter(tty.as_raw_fd()).map_err(display_error)?;
        Ok(Self {
            _cbreak: cbreak,
            tty,
        })
    }
}

impl KeyPoller for TtyKeys {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        let fd = self.tty.as_raw_fd();
        if !sys::poll_readable(fd, timeout)? {
            return Ok(None);
        }
        Ok(sys::read_byte(fd)?.map(char::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::geometry::PixelPoint;

    fn hand(volume: Option<f64>) -> Overlay {
        Overlay::Hand {
            thumb: PixelPoint::new(100, 200),
            index: PixelPoint::new(130, 240),
            distance: 50.7,
            volume,
        }
    }

    #[test]
    fn volume_bar_edges() {
        assert_eq!(format_volume_bar(0.0), format!("[{}]", "░".repeat(20)));
        assert_eq!(format_volume_bar(1.0), format!("[{}]", "█".repeat(20)));
        assert_eq!(format_volume_bar(2.0), format!("[{}]", "█".repeat(20)));
        assert_eq!(
            format_volume_bar(0.5),
            format!("[{}{}]", "█".repeat(10), "░".repeat(10))
        );
    }

    #[test]
    fn volume_percent_truncates() {
        assert_eq!(volume_percent(0.999), 99);
        assert_eq!(volume_percent(1.0), 100);
        assert_eq!(volume_percent(-0.2), 0);
    }

    #[test]
    fn volume_overlay_plain_text() {
        let line = format_overlay(&hand(Some(0.456)), false).unwrap();
        assert!(line.starts_with("Dist: 50 "));
        assert!(line.contains("Volume: 45%"));
        assert!(line.contains("thumb (100,200) index (130,240)"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn measure_overlay_shows_distance_only() {
        let line = format_overlay(&hand(None), false).unwrap();
        assert!(line.starts_with("Distance: 50"));
        assert!(!line.contains("Volume"));
    }

    #[test]
    fn no_hand_overlay() {
        assert_eq!(
            format_overlay(&Overlay::NoHand, false).as_deref(),
            Some("No hand detected")
        );
        let colored = format_overlay(&Overlay::NoHand, true).unwrap();
        assert!(colored.starts_with(RED));
    }

    #[test]
    fn skipped_frame_keeps_previous_line() {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        display.render(&Overlay::NoHand).unwrap();
        let before = display.writer().len();
        display.render(&Overlay::Skipped).unwrap();
        assert_eq!(display.writer().len(), before);
    }

    #[test]
    fn render_clears_line_first() {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        display.render(&Overlay::NoHand).unwrap();
        let text = String::from_utf8(display.writer().clone()).unwrap();
        assert_eq!(text, "\r\x1b[2KNo hand detected");
    }

    #[test]
    fn finish_ends_the_line_once() {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        display.render(&Overlay::NoHand).unwrap();
        display.finish().unwrap();
        display.finish().unwrap();
        let text = String::from_utf8(display.writer().clone()).unwrap();
        assert!(text.ends_with("detected\n"));
        assert_eq!(text.matches('\n').count(), 1);
    }
}
