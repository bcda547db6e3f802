//! The terminal capability interface and its two implementations.
//!
//! The loop only ever talks to a [`Backend`]: it initialises it, asks for
//! the size, pushes cells, places the cursor and shows the frame. Input
//! comes from the [`EventSource`] that `init` hands back, which the loop
//! moves onto its pump thread.
//!
//! - [`TerminalBackend`] drives a real terminal through n-term: raw mode,
//!   the stdin reader thread, the input parser and the diff renderer.
//! - [`HeadlessBackend`] keeps the shown frame in memory and takes events
//!   from a [`HeadlessHandle`], for tests and embedding.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use n_term::ansi;
use n_term::buffer::FrameBuffer;
use n_term::cell::Cell;
use n_term::diff::DiffRenderer;
use n_term::events::{self, InputSource, SourceConfig};
use n_term::input::{self, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use n_term::reader::StdinReader;
use n_term::terminal::Terminal;

use crate::config::GuiConfig;
use crate::event::Event;
use crate::keybinding::{Key, KeyPress, KeyTrigger, Modifier};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Outcome of one [`EventSource::poll_event`].
#[derive(Debug)]
pub enum Poll {
    Ready(Event),
    /// Nothing arrived within the source's tick.
    Idle,
    /// The source is exhausted; no more events will come.
    Closed,
}

/// A blocking event stream. Each poll waits at most a short tick so the
/// pump thread can notice shutdown.
pub trait EventSource: Send {
    fn poll_event(&mut self) -> Poll;
}

pub trait Backend {
    /// Take over the terminal. Returns the event stream for the pump thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the terminal cannot be set up.
    fn init(&mut self, config: &GuiConfig) -> io::Result<Box<dyn EventSource>>;

    /// Give the terminal back. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error when restoring the terminal fails.
    fn close(&mut self) -> io::Result<()>;

    /// Current size in cells, `(width, height)`.
    fn size(&mut self) -> (u16, u16);

    /// Stage one cell of the next frame.
    fn set_cell(&mut self, x: u16, y: u16, cell: Cell);

    /// Blank the staged frame.
    fn clear(&mut self);

    fn set_cursor(&mut self, x: u16, y: u16);

    fn hide_cursor(&mut self);

    /// Put the staged frame on screen.
    ///
    /// # Errors
    ///
    /// Returns an error when writing to the terminal fails.
    fn show(&mut self) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// Terminal backend
// ---------------------------------------------------------------------------

/// A real terminal on stdin/stdout.
pub struct TerminalBackend {
    terminal: Terminal,
    reader: Option<StdinReader>,
    renderer: DiffRenderer,
    frame: FrameBuffer,
    cursor: Option<(u16, u16)>,
    source: SourceConfig,
}

impl TerminalBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_source_config(SourceConfig::default())
    }

    /// Use `source` for the input tick (and so the lone-ESC timeout).
    #[must_use]
    pub fn with_source_config(source: SourceConfig) -> Self {
        let terminal = Terminal::new();
        let size = terminal.size();
        Self {
            terminal,
            reader: None,
            renderer: DiffRenderer::new(),
            frame: FrameBuffer::new(size.cols, size.rows),
            cursor: None,
            source,
        }
    }
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for TerminalBackend {
    fn init(&mut self, config: &GuiConfig) -> io::Result<Box<dyn EventSource>> {
        self.terminal.enter(config.mouse)?;
        events::install_resize_handler();
        let (reader, rx) = StdinReader::spawn()?;
        self.reader = Some(reader);

        let size = self.terminal.refresh_size();
        self.frame.resize(size.cols, size.rows);
        self.renderer.force_redraw();
        Ok(Box::new(TerminalEvents {
            source: InputSource::new(rx, self.source),
        }))
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
        }
        self.terminal.leave()
    }

    fn size(&mut self) -> (u16, u16) {
        let size = self.terminal.refresh_size();
        (size.cols, size.rows)
    }

    fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        let size = self.terminal.size();
        if self.frame.width() != size.cols || self.frame.height() != size.rows {
            self.frame.resize(size.cols, size.rows);
        }
        self.frame.set(x, y, cell);
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    fn show(&mut self) -> io::Result<()> {
        self.renderer.render(&self.frame);
        let cursor = self.cursor;
        self.renderer.queue(|out| match cursor {
            Some((x, y)) => {
                ansi::cursor_to(out, x, y)?;
                ansi::cursor_show(out)
            }
            None => ansi::cursor_hide(out),
        })?;
        self.renderer.flush()
    }
}

struct TerminalEvents {
    source: InputSource,
}

impl EventSource for TerminalEvents {
    fn poll_event(&mut self) -> Poll {
        loop {
            match self.source.poll() {
                events::Poll::Ready(ev) => {
                    if let Some(ev) = translate(ev) {
                        return Poll::Ready(ev);
                    }
                }
                events::Poll::Idle => return Poll::Idle,
                events::Poll::Closed => return Poll::Closed,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Map an n-term input event onto the loop's vocabulary. Bare pointer
/// motion has no binding form and maps to `None`.
#[must_use]
pub fn translate(event: input::Event) -> Option<Event> {
    match event {
        input::Event::Key(key) => Some(Event::Key(translate_key(key))),
        input::Event::Mouse(mouse) => translate_mouse(mouse),
        input::Event::Paste(text) => Some(Event::Raw(text)),
        input::Event::Resize(size) => Some(Event::Resize {
            width: size.cols,
            height: size.rows,
        }),
    }
}

fn modifiers(m: Modifiers) -> Modifier {
    let mut mods = Modifier::empty();
    if m.contains(Modifiers::ALT) {
        mods |= Modifier::ALT;
    }
    if m.contains(Modifiers::CTRL) {
        mods |= Modifier::CTRL;
    }
    if m.contains(Modifiers::SHIFT) {
        mods |= Modifier::SHIFT;
    }
    mods
}

fn translate_key(key: KeyEvent) -> KeyPress {
    let mut mods = modifiers(key.modifiers);
    let trigger = match key.code {
        KeyCode::Char(ch) if mods.contains(Modifier::CTRL) && (ch.is_ascii_alphabetic() || "\\]^_ ".contains(ch)) => {
            mods.remove(Modifier::CTRL | Modifier::SHIFT);
            KeyTrigger::Key(Key::Ctrl(ch.to_ascii_lowercase()))
        }
        KeyCode::Char(' ') => KeyTrigger::Key(Key::Space),
        KeyCode::Char(ch) => {
            mods.remove(Modifier::SHIFT);
            KeyTrigger::Rune(ch)
        }
        KeyCode::BackTab => {
            mods.remove(Modifier::SHIFT);
            KeyTrigger::Key(Key::BackTab)
        }
        KeyCode::Enter => KeyTrigger::Key(Key::Enter),
        KeyCode::Tab => KeyTrigger::Key(Key::Tab),
        KeyCode::Backspace => KeyTrigger::Key(Key::Backspace),
        KeyCode::Escape => KeyTrigger::Key(Key::Esc),
        KeyCode::Delete => KeyTrigger::Key(Key::Delete),
        KeyCode::Insert => KeyTrigger::Key(Key::Insert),
        KeyCode::Up => KeyTrigger::Key(Key::ArrowUp),
        KeyCode::Down => KeyTrigger::Key(Key::ArrowDown),
        KeyCode::Left => KeyTrigger::Key(Key::ArrowLeft),
        KeyCode::Right => KeyTrigger::Key(Key::ArrowRight),
        KeyCode::Home => KeyTrigger::Key(Key::Home),
        KeyCode::End => KeyTrigger::Key(Key::End),
        KeyCode::PageUp => KeyTrigger::Key(Key::PageUp),
        KeyCode::PageDown => KeyTrigger::Key(Key::PageDown),
        KeyCode::F(n) => KeyTrigger::Key(Key::F(n)),
    };
    KeyPress::new(trigger, mods)
}

fn translate_mouse(mouse: MouseEvent) -> Option<Event> {
    let button = |b: MouseButton| match b {
        MouseButton::Left => Key::MouseLeft,
        MouseButton::Middle => Key::MouseMiddle,
        MouseButton::Right => Key::MouseRight,
    };
    let mut mods = modifiers(mouse.modifiers);
    let key = match mouse.kind {
        MouseEventKind::Press(b) => button(b),
        MouseEventKind::Drag(b) => {
            mods |= Modifier::MOTION;
            button(b)
        }
        MouseEventKind::Release => Key::MouseRelease,
        MouseEventKind::ScrollUp => Key::MouseWheelUp,
        MouseEventKind::ScrollDown => Key::MouseWheelDown,
        MouseEventKind::Move => return None,
    };
    Some(Event::Mouse {
        press: KeyPress::new(KeyTrigger::Key(key), mods),
        x: i32::from(mouse.x),
        y: i32::from(mouse.y),
    })
}

// ---------------------------------------------------------------------------
// Headless backend
// ---------------------------------------------------------------------------

const HEADLESS_TICK: Duration = Duration::from_millis(5);

struct Screen {
    shown: FrameBuffer,
    cursor: Option<(u16, u16)>,
    size: (u16, u16),
    frames: usize,
    closed: bool,
}

fn lock(screen: &Mutex<Screen>) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory terminal. What [`show`](Backend::show) puts on screen is
/// readable through the paired [`HeadlessHandle`].
pub struct HeadlessBackend {
    screen: Arc<Mutex<Screen>>,
    staged: FrameBuffer,
    cursor: Option<(u16, u16)>,
    events: Option<Receiver<Event>>,
}

/// The outside of a [`HeadlessBackend`]: feeds events in, reads frames out.
/// Cheap to clone and usable from any thread.
#[derive(Clone)]
pub struct HeadlessHandle {
    screen: Arc<Mutex<Screen>>,
    tx: Sender<Event>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new(width: u16, height: u16) -> (Self, HeadlessHandle) {
        let (tx, rx) = mpsc::channel();
        let screen = Arc::new(Mutex::new(Screen {
            shown: FrameBuffer::new(width, height),
            cursor: None,
            size: (width, height),
            frames: 0,
            closed: false,
        }));
        let backend = Self {
            screen: Arc::clone(&screen),
            staged: FrameBuffer::new(width, height),
            cursor: None,
            events: Some(rx),
        };
        (backend, HeadlessHandle { screen, tx })
    }
}

impl Backend for HeadlessBackend {
    fn init(&mut self, _config: &GuiConfig) -> io::Result<Box<dyn EventSource>> {
        let rx = self
            .events
            .take()
            .ok_or_else(|| io::Error::other("headless backend already initialised"))?;
        Ok(Box::new(HeadlessEvents { rx }))
    }

    fn close(&mut self) -> io::Result<()> {
        lock(&self.screen).closed = true;
        Ok(())
    }

    fn size(&mut self) -> (u16, u16) {
        lock(&self.screen).size
    }

    fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        let (w, h) = lock(&self.screen).size;
        if self.staged.width() != w || self.staged.height() != h {
            self.staged.resize(w, h);
        }
        self.staged.set(x, y, cell);
    }

    fn clear(&mut self) {
        self.staged.clear();
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    fn show(&mut self) -> io::Result<()> {
        let mut screen = lock(&self.screen);
        screen.shown.clone_from(&self.staged);
        screen.cursor = self.cursor;
        screen.frames += 1;
        Ok(())
    }
}

struct HeadlessEvents {
    rx: Receiver<Event>,
}

impl EventSource for HeadlessEvents {
    fn poll_event(&mut self) -> Poll {
        match self.rx.recv_timeout(HEADLESS_TICK) {
            Ok(ev) => Poll::Ready(ev),
            Err(RecvTimeoutError::Timeout) => Poll::Idle,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }
}

impl HeadlessHandle {
    /// Queue an event. Returns `false` once the backend side is gone.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn key(&self, press: KeyPress) -> bool {
        self.send(Event::Key(press))
    }

    /// Change the screen size and report it to the loop.
    pub fn resize(&self, width: u16, height: u16) -> bool {
        lock(&self.screen).size = (width, height);
        self.send(Event::Resize { width, height })
    }

    /// Row `y` of the last shown frame.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        lock(&self.screen).shown.row_text(y)
    }

    /// Every row of the last shown frame.
    #[must_use]
    pub fn screen(&self) -> Vec<String> {
        let screen = lock(&self.screen);
        (0..screen.shown.height()).map(|y| screen.shown.row_text(y)).collect()
    }

    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        lock(&self.screen).shown.get(x, y).copied()
    }

    /// Hardware cursor of the last shown frame, `None` when hidden.
    #[must_use]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        lock(&self.screen).cursor
    }

    /// Number of frames shown so far.
    #[must_use]
    pub fn frames(&self) -> usize {
        lock(&self.screen).frames
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock(&self.screen).closed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
