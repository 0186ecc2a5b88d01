//! Safe wrappers for platform-specific unsafe operations.
//!
//! Every `unsafe` block in the codebase lives here. Call sites use the safe
//! public API and never touch `unsafe` directly.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// Whether `fd` refers to a terminal.
pub fn is_tty(fd: RawFd) -> bool {
    // SAFETY: isatty only inspects the descriptor; invalid fds return 0.
    unsafe { libc::isatty(fd) == 1 }
}

/// Terminal switched to non-canonical, no-echo mode.
///
/// Single keypresses become readable immediately. The previous settings are
/// restored when the guard is dropped.
pub struct CbreakGuard {
    fd: RawFd,
    saved: libc::termios,
}

impl CbreakGuard {
    /// Put the terminal behind `fd` into cbreak mode.
    ///
    /// # Safety
    /// `tcgetattr`/`tcsetattr` are called on a caller-owned descriptor with a
    /// zeroed struct that is only read after `tcgetattr` succeeds.
    pub fn enter(fd: RawFd) -> io::Result<Self> {
        // SAFETY: termios is plain data; it is only read after tcgetattr
        // filled it, and fd stays owned by the caller for the guard's life.
        unsafe {
            let mut saved: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut saved) != 0 {
                return Err(io::Error::last_os_error());
            }
            let mut raw = saved;
            raw.c_lflag &= !(libc::ICANON | libc::ECHO);
            raw.c_cc[libc::VMIN] = 0;
            raw.c_cc[libc::VTIME] = 0;
            if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { fd, saved })
        }
    }
}

impl Drop for CbreakGuard {
    fn drop(&mut self) {
        // SAFETY: restores the settings captured in `enter` on the same fd.
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved);
        }
    }
}

/// Wait up to `timeout` for `fd` to become readable.
///
/// # Safety
/// `poll` is given a single valid pollfd on the stack.
pub fn poll_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;
    // SAFETY: pfd is a valid pollfd and nfds is 1.
    let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    match rc {
        -1 => {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            }
        }
        0 => Ok(false),
        _ => Ok(pfd.revents & libc::POLLIN != 0),
    }
}

/// Read one byte from `fd` without blocking past what `poll` reported.
///
/// Returns `None` when nothing was available.
pub fn read_byte(fd: RawFd) -> io::Result<Option<u8>> {
    let mut byte = 0u8;
    // SAFETY: reads at most one byte into a valid, writable stack buffer.
    let n = unsafe { libc::read(fd, (&mut byte as *mut u8).cast(), 1) };
    match n {
        -1 => {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock || err.kind() == io::ErrorKind::Interrupted {
                Ok(None)
            } else {
                Err(err)
            }
        }
        0 => Ok(None),
        _ => Ok(Some(byte)),
    }
}
