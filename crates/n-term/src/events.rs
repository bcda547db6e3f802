// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event source: stdin chunks in, terminal events out.
//
// `InputSource` sits between the stdin reader and whoever consumes events.
// Each `poll` waits at most one tick on the byte channel:
//
//   - bytes arrive: parse them and queue every complete event
//   - the tick expires: a pending lone ESC becomes the Escape key
//   - SIGWINCH fired: emit `Event::Resize` with the new size
//
// Returning after every tick, even when idle, lets the caller check its own
// stop flag without a second channel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::input::{Event, Parser};
use crate::terminal::{self, Size};

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// Install the SIGWINCH handler. The handler only stores to an atomic.
#[cfg(unix)]
pub fn install_resize_handler() {
    // SAFETY: sigaction is zeroed then filled; the handler is async-signal-safe.
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
pub fn install_resize_handler() {}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Mark a resize as pending, as if SIGWINCH had arrived.
pub fn notify_resize() {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

// ─── Config ─────────────────────────────────────────────────────────────────

/// Timing for [`InputSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Longest wait per poll, in microseconds. Also the ESC timeout.
    pub tick_interval_us: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 8333, // 120 Hz
        }
    }
}

// ─── InputSource ────────────────────────────────────────────────────────────

/// Outcome of one [`InputSource::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Ready(Event),
    /// The tick passed with nothing to report.
    Idle,
    /// The byte channel disconnected and the queue is drained.
    Closed,
}

pub struct InputSource {
    rx: Receiver<Vec<u8>>,
    parser: Parser,
    queue: VecDeque<Event>,
    tick: Duration,
    closed: bool,
    last_size: Option<Size>,
    resize: &'static AtomicBool,
}

impl InputSource {
    #[must_use]
    pub fn new(rx: Receiver<Vec<u8>>, config: SourceConfig) -> Self {
        Self {
            rx,
            parser: Parser::new(),
            queue: VecDeque::new(),
            tick: Duration::from_micros(config.tick_interval_us),
            closed: false,
            last_size: None,
            resize: &RESIZE_PENDING,
        }
    }

    /// Watch `flag` for resizes instead of the SIGWINCH flag.
    #[must_use]
    pub fn with_resize_flag(mut self, flag: &'static AtomicBool) -> Self {
        self.resize = flag;
        self
    }

    /// Wait up to one tick for the next event.
    pub fn poll(&mut self) -> Poll {
        if self.resize.swap(false, Ordering::Relaxed) {
            let size = terminal::get_size()
                .or(self.last_size)
                .unwrap_or(Size::FALLBACK);
            self.last_size = Some(size);
            return Poll::Ready(Event::Resize(size));
        }
        if let Some(event) = self.queue.pop_front() {
            return Poll::Ready(event);
        }
        if self.closed {
            return Poll::Closed;
        }

        match self.rx.recv_timeout(self.tick) {
            Ok(bytes) => self.queue.extend(self.parser.advance(&bytes)),
            Err(RecvTimeoutError::Timeout) => {
                if self.parser.has_pending() {
                    self.queue.extend(self.parser.flush());
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("input channel closed");
                self.closed = true;
                self.queue.extend(self.parser.flush());
            }
        }

        self.queue.pop_front().map_or(Poll::Idle, Poll::Ready)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent, Modifiers};
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> Poll {
        Poll::Ready(Event::Key(KeyEvent {
            code,
            modifiers: Modifiers::empty(),
        }))
    }

    fn fast() -> SourceConfig {
        SourceConfig {
            tick_interval_us: 1000,
        }
    }

    #[test]
    fn default_tick_is_120hz() {
        assert_eq!(SourceConfig::default().tick_interval_us, 8333);
    }

    #[test]
    fn queued_events_come_out_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut source = InputSource::new(rx, fast());
        tx.send(b"ab".to_vec()).unwrap();
        assert_eq!(source.poll(), key(KeyCode::Char('a')));
        assert_eq!(source.poll(), key(KeyCode::Char('b')));
        assert_eq!(source.poll(), Poll::Idle);
    }

    #[test]
    fn lone_escape_resolves_after_a_tick() {
        let (tx, rx) = mpsc::channel();
        let mut source = InputSource::new(rx, fast());
        tx.send(vec![0x1B]).unwrap();
        assert_eq!(source.poll(), Poll::Idle);
        assert_eq!(source.poll(), key(KeyCode::Escape));
    }

    #[test]
    fn disconnect_drains_then_closes() {
        let (tx, rx) = mpsc::channel();
        let mut source = InputSource::new(rx, fast());
        tx.send(b"q".to_vec()).unwrap();
        drop(tx);
        assert_eq!(source.poll(), key(KeyCode::Char('q')));
        assert_eq!(source.poll(), Poll::Closed);
        assert_eq!(source.poll(), Poll::Closed);
    }

    #[test]
    fn pending_resize_wins() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut source = InputSource::new(rx, fast()).with_resize_flag(&FLAG);
        FLAG.store(true, Ordering::Relaxed);
        assert!(matches!(source.poll(), Poll::Ready(Event::Resize(_))));
    }
}
