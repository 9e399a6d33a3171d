//! Scoped terminal control: raw mode, cursor visibility, and stdin bytes.
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{cursor, execute, terminal};

use super::key::ByteSource;
use crate::error::TerminalError;

/// Exit status used when the user cancels or a termination signal arrives.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Flag raised by the first termination signal outside the menu.
///
/// Long-running work polls it between units and stops early.
#[must_use]
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}

/// Holds the terminal in raw, no-echo mode with the cursor hidden.
///
/// Dropping the guard restores both, so every return path (commit, cancel,
/// `?` propagation, unwinding) releases the terminal.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enter raw mode and hide the cursor on `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the cursor command
    /// cannot be written; raw mode is released again in the latter case.
    pub fn acquire(out: &mut impl Write) -> Result<Self, TerminalError> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(out, cursor::Hide) {
            restore();
            return Err(e.into());
        }
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
        restore();
    }
}

/// Show the cursor and leave raw mode. Safe to call when neither is active.
pub fn restore() {
    execute!(io::stdout(), cursor::Show).ok();
    terminal::disable_raw_mode().ok();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Leave it to the running work to stop at [`interrupt_flag`].
    Defer,
    /// Restore the terminal and exit now.
    Exit,
}

fn on_signal(interrupted: &AtomicBool, raw_mode: &AtomicBool) -> SignalAction {
    let repeated = interrupted.swap(true, Ordering::SeqCst);
    if repeated || raw_mode.load(Ordering::SeqCst) {
        SignalAction::Exit
    } else {
        SignalAction::Defer
    }
}

/// Handle SIGINT, SIGTERM, and SIGHUP.
///
/// While the menu holds the terminal, a signal restores it and exits with
/// [`INTERRUPTED_EXIT_CODE`]. Otherwise the first signal only raises
/// [`interrupt_flag`], so the category being written can finish; a second
/// signal exits immediately.
///
/// # Errors
///
/// Returns an error if a handler is already installed or the signal
/// handler cannot be registered.
pub fn install_signal_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        if on_signal(&INTERRUPTED, &RAW_MODE_ACTIVE) == SignalAction::Exit {
            restore();
            std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
        }
    })
}

/// Terminal width in columns, defaulting to 80.
#[must_use]
pub fn terminal_width() -> usize {
    terminal_size::terminal_size().map_or(80, |(terminal_size::Width(w), _)| usize::from(w))
}

/// Unbuffered stdin reader with a polled, bounded read.
///
/// Reads through a duplicated descriptor so no bytes sit in the buffer of
/// [`std::io::Stdin`] while `poll` reports the descriptor as idle.
#[cfg(unix)]
#[derive(Debug)]
pub struct StdinSource {
    file: std::fs::File,
}

#[cfg(unix)]
impl StdinSource {
    /// Open stdin for raw byte reads.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Unsupported`] if stdin is not a terminal, or
    /// an I/O error if the descriptor cannot be duplicated.
    pub fn open() -> Result<Self, TerminalError> {
        use std::io::IsTerminal as _;
        use std::os::fd::AsFd as _;

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(TerminalError::Unsupported(
                "stdin is not a terminal; use --all or --only".to_string(),
            ));
        }
        let fd = stdin.as_fd().try_clone_to_owned()?;
        Ok(Self {
            file: std::fs::File::from(fd),
        })
    }

    fn wait_readable(&self, timeout: nix::poll::PollTimeout) -> io::Result<bool> {
        use nix::poll::{PollFd, PollFlags, poll};
        use std::os::fd::AsFd as _;

        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, timeout) {
                Ok(ready) => return Ok(ready > 0),
                Err(nix::errno::Errno::EINTR) => {}
                Err(errno) => return Err(io::Error::from(errno)),
            }
        }
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read as _;

        let mut buf = [0u8; 1];
        loop {
            match self.file.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    let [byte] = buf;
                    return Ok(Some(byte));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn read_byte_timeout(&mut self, timeout: std::time::Duration) -> io::Result<Option<u8>> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        if self.wait_readable(nix::poll::PollTimeout::from(millis))? {
            self.read_byte()
        } else {
            Ok(None)
        }
    }
}

/// Placeholder on platforms without the Unix raw-input path.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct StdinSource;

#[cfg(not(unix))]
impl StdinSource {
    /// Always fails: raw key input is implemented for Unix terminals only.
    ///
    /// # Errors
    ///
    /// Always returns [`TerminalError::Unsupported`].
    pub fn open() -> Result<Self, TerminalError> {
        Err(TerminalError::Unsupported(
            "raw key input is only implemented on Unix; use --all or --only".to_string(),
        ))
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }

    fn read_byte_timeout(&mut self, _timeout: std::time::Duration) -> io::Result<Option<u8>> {
        Ok(None)
    }
}
