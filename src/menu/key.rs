//! Raw key input and ESC disambiguation.
//!
//! A bare ESC and the first byte of a cursor-key sequence are the same byte,
//! so after ESC the reader performs one bounded read. The decision is an
//! explicit state machine:
//!
//! ```text
//! Idle ──ESC──▶ SawEscape ──timeout──▶ Cancel
//!                   │
//!                   └──'[' / 'O'──▶ Sequence ──'A'──▶ Up
//!                                       ├────'B'──▶ Down
//!                                       └────else─▶ Noop
//! ```
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// High-level input events consumed by the selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Move the cursor up one row.
    Up,
    /// Move the cursor down one row.
    Down,
    /// Flip the focused row.
    ToggleCurrent,
    /// Accept the current selection.
    Commit,
    /// Abandon the menu.
    Cancel,
    /// Unrecognized input; ignored.
    Noop,
}

/// A source of raw input bytes.
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Block until one byte is available. `Ok(None)` means end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Wait at most `timeout` for one byte. `Ok(None)` means nothing arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

/// Where the decoder is within a possible escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    /// Waiting for the start of a key.
    Idle,
    /// Read ESC; the next byte decides between cancel and a sequence.
    SawEscape,
    /// Read ESC plus an introducer; the next byte names the key.
    Sequence,
}

/// Outcome of feeding one input to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More input is needed; continue from this state.
    Pending(EscapeState),
    /// A complete event was decoded; the decoder is back to idle.
    Emit(KeyEvent),
}

/// Advance the decoder. `input` is `None` when a read timed out or input ended.
#[must_use]
pub const fn step(state: EscapeState, input: Option<u8>) -> Step {
    match (state, input) {
        (EscapeState::Idle, Some(ESC)) => Step::Pending(EscapeState::SawEscape),
        (EscapeState::Idle, Some(byte)) => Step::Emit(plain_key(byte)),
        (EscapeState::Idle | EscapeState::SawEscape, None) => Step::Emit(KeyEvent::Cancel),
        (EscapeState::SawEscape, Some(b'[' | b'O')) => Step::Pending(EscapeState::Sequence),
        (EscapeState::SawEscape, Some(_)) | (EscapeState::Sequence, None) => {
            Step::Emit(KeyEvent::Noop)
        }
        (EscapeState::Sequence, Some(b'A')) => Step::Emit(KeyEvent::Up),
        (EscapeState::Sequence, Some(b'B')) => Step::Emit(KeyEvent::Down),
        (EscapeState::Sequence, Some(_)) => Step::Emit(KeyEvent::Noop),
    }
}

/// Map a single non-escape byte to an event.
const fn plain_key(byte: u8) -> KeyEvent {
    match byte {
        b' ' => KeyEvent::ToggleCurrent,
        b'\r' | b'\n' => KeyEvent::Commit,
        b'k' => KeyEvent::Up,
        b'j' => KeyEvent::Down,
        b'q' | CTRL_C => KeyEvent::Cancel,
        _ => KeyEvent::Noop,
    }
}

/// Produces [`KeyEvent`]s from a [`ByteSource`].
#[derive(Debug)]
pub struct KeyReader<S> {
    source: S,
    escape_timeout: Duration,
}

impl<S: ByteSource> KeyReader<S> {
    /// Wrap `source`, waiting `escape_timeout` after ESC before cancelling.
    pub const fn new(source: S, escape_timeout: Duration) -> Self {
        Self {
            source,
            escape_timeout,
        }
    }

    /// Block until the next complete event.
    ///
    /// The only bounded wait is the read following ESC (and the key byte of
    /// a sequence); every other read blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source fails.
    pub fn next_event(&mut self) -> io::Result<KeyEvent> {
        let mut state = EscapeState::Idle;
        loop {
            let input = match state {
                EscapeState::Idle => self.source.read_byte()?,
                EscapeState::SawEscape | EscapeState::Sequence => {
                    self.source.read_byte_timeout(self.escape_timeout)?
                }
            };
            match step(state, input) {
                Step::Pending(next) => state = next,
                Step::Emit(event) => return Ok(event),
            }
        }
    }

    /// Consume the reader and return the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// One scripted input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    /// A byte arriving immediately.
    Byte(u8),
    /// Silence lasting this long before the next item.
    Pause(Duration),
}

/// A deterministic [`ByteSource`] replaying a script of bytes and pauses.
///
/// Pauses are simulated rather than slept: a bounded read whose timeout is
/// shorter than the pending pause times out and consumes that much of the
/// pause, while a blocking read skips pauses entirely.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use dconf_snapshot::menu::key::{KeyEvent, KeyReader, ScriptedInput};
///
/// let input = ScriptedInput::from_bytes(b"\x1b[B ");
/// let mut reader = KeyReader::new(input, Duration::from_millis(50));
/// assert_eq!(reader.next_event().unwrap(), KeyEvent::Down);
/// assert_eq!(reader.next_event().unwrap(), KeyEvent::ToggleCurrent);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    items: VecDeque<Scripted>,
}

impl ScriptedInput {
    /// Build from an explicit script.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Build from bytes that all arrive immediately.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().copied().map(Scripted::Byte))
    }

    /// Append a byte.
    #[must_use]
    pub fn byte(mut self, byte: u8) -> Self {
        self.items.push_back(Scripted::Byte(byte));
        self
    }

    /// Append several immediate bytes.
    #[must_use]
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.items.extend(bytes.iter().copied().map(Scripted::Byte));
        self
    }

    /// Append a pause.
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.items.push_back(Scripted::Pause(duration));
        self
    }

    /// Whether the script is exhausted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        while let Some(item) = self.items.pop_front() {
            if let Scripted::Byte(byte) = item {
                return Ok(Some(byte));
            }
        }
        Ok(None)
    }

    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        let mut waited = Duration::ZERO;
        loop {
            match self.items.front().copied() {
                None => return Ok(None),
                Some(Scripted::Byte(byte)) => {
                    self.items.pop_front();
                    return Ok(Some(byte));
                }
                Some(Scripted::Pause(pause)) => {
                    let remaining = timeout.saturating_sub(waited);
                    if pause >= remaining {
                        if let Some(Scripted::Pause(left)) = self.items.front_mut() {
                            *left = pause.saturating_sub(remaining);
                        }
                        return Ok(None);
                    }
                    waited += pause;
                    self.items.pop_front();
                }
            }
        }
    }
}
