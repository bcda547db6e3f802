//! The event/update loop and the state it owns.
//!
//! A [`Gui`] owns every view, the keybinding table, the layout managers and
//! the backend. Everything runs on the thread that calls
//! [`main_loop`](Gui::main_loop). Other threads reach in only through an
//! [`UpdateSender`], whose closures are queued on the same channel as input
//! events.
//!
//! Each iteration blocks for one message, drains whatever else is queued,
//! dispatches the drained events, runs the drained closures in submission
//! order, and then lays out, draws and shows one frame.

use std::mem;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use n_term::buffer::FrameBuffer;

use crate::backend::{Backend, EventSource, Poll};
use crate::compositor::{draw_frame, resolve_junctions};
use crate::config::GuiConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::geometry::{Geometry, Rect};
use crate::keybinding::{parse_binding, Key, KeyPress, KeyTrigger, Keybinding, Keybindings, Modifier};
use crate::view::View;

// ---------------------------------------------------------------------------
// Messages and handles
// ---------------------------------------------------------------------------

type Update = Box<dyn FnOnce(&mut Gui) -> Result<()> + Send>;

type ResizeHandler = Box<dyn FnMut(&mut Gui, u16, u16) -> Result<()>>;

enum Message {
    Event(Event),
    Update(Update),
    Wake,
}

/// Lays views out before every frame.
pub trait Manager {
    /// # Errors
    ///
    /// Any error stops the loop and is returned from it.
    fn layout(&mut self, gui: &mut Gui) -> Result<()>;
}

impl<F> Manager for F
where
    F: FnMut(&mut Gui) -> Result<()>,
{
    fn layout(&mut self, gui: &mut Gui) -> Result<()> {
        self(gui)
    }
}

/// Schedules closures on the loop thread from anywhere.
#[derive(Clone)]
pub struct UpdateSender {
    tx: Sender<Message>,
}

impl UpdateSender {
    /// Queue `f` to run on the loop thread during its next iteration.
    ///
    /// # Errors
    ///
    /// [`Error::LoopClosed`] once the [`Gui`] is gone.
    pub fn update(&self, f: impl FnOnce(&mut Gui) -> Result<()> + Send + 'static) -> Result<()> {
        self.tx
            .send(Message::Update(Box::new(f)))
            .map_err(|_| Error::LoopClosed)
    }

    /// Wake the loop for a redraw without changing anything.
    ///
    /// # Errors
    ///
    /// [`Error::LoopClosed`] once the [`Gui`] is gone.
    pub fn wake(&self) -> Result<()> {
        self.tx.send(Message::Wake).map_err(|_| Error::LoopClosed)
    }
}

/// Ends [`Gui::main_loop`] with `Ok(())` after its current iteration.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
    tx: Sender<Message>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
        let _ = self.tx.send(Message::Wake);
    }
}

// ---------------------------------------------------------------------------
// Gui
// ---------------------------------------------------------------------------

pub struct Gui {
    backend: Box<dyn Backend>,
    events: Option<Box<dyn EventSource>>,
    pump: Option<JoinHandle<()>>,
    closing: Arc<AtomicBool>,
    closed: bool,

    tx: Sender<Message>,
    rx: Receiver<Message>,
    stop: Arc<AtomicBool>,

    views: Vec<View>,
    current: Option<String>,
    managers: Vec<Box<dyn Manager>>,
    resize_handler: Option<ResizeHandler>,
    keybindings: Keybindings,

    canvas: FrameBuffer,
    width: u16,
    height: u16,
    config: GuiConfig,
}

impl Gui {
    /// Initialise `backend` and take over the terminal.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`] when the backend cannot be initialised.
    pub fn new(mut backend: Box<dyn Backend>, config: GuiConfig) -> Result<Self> {
        let events = backend.init(&config)?;
        let (width, height) = backend.size();
        let (tx, rx) = mpsc::channel();
        tracing::debug!(width, height, mode = ?config.output_mode, "gui initialised");

        Ok(Self {
            backend,
            events: Some(events),
            pump: None,
            closing: Arc::new(AtomicBool::new(false)),
            closed: false,
            tx,
            rx,
            stop: Arc::new(AtomicBool::new(false)),
            views: Vec::new(),
            current: None,
            managers: Vec::new(),
            resize_handler: None,
            keybindings: Keybindings::new(),
            canvas: FrameBuffer::new(width, height),
            width,
            height,
            config,
        })
    }

    /// Stop the input pump and restore the terminal. Also done on drop.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`] when restoring the terminal fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.closing.store(true, Ordering::Release);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        tracing::debug!("gui closed");
        self.backend.close()?;
        Ok(())
    }

    /// Terminal size in cells, `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (i32::from(self.width), i32::from(self.height))
    }

    #[must_use]
    pub const fn config(&self) -> &GuiConfig {
        &self.config
    }

    /// Settings read on every frame. `mouse` only applies at construction.
    pub fn config_mut(&mut self) -> &mut GuiConfig {
        &mut self.config
    }

    // -- Views --------------------------------------------------------------

    /// Create `name` or move an existing view to `geometry`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidViewName`] for an empty name, [`Error::InvalidGeometry`]
    /// when `geometry` leaves no room at the current size.
    pub fn set_view(&mut self, name: &str, geometry: Geometry) -> Result<&mut View> {
        if name.is_empty() {
            return Err(Error::InvalidViewName);
        }
        let (w, h) = self.size();
        let rect = geometry.resolve(w, h);
        if rect.is_degenerate() {
            tracing::debug!(name, ?rect, "geometry rejected");
            let Rect { x0, y0, x1, y1 } = rect;
            return Err(Error::InvalidGeometry {
                name: name.to_string(),
                x0,
                y0,
                x1,
                y1,
            });
        }

        if let Some(i) = self.view_index(name) {
            let view = &mut self.views[i];
            view.geometry = geometry;
            view.rect = rect;
            return Ok(view);
        }

        let mut view = View::new(name, geometry, rect);
        view.set_fg_color(self.config.fg_color);
        view.set_bg_color(self.config.bg_color);
        view.set_sel_fg_color(self.config.sel_fg_color);
        view.set_sel_bg_color(self.config.sel_bg_color);
        view.set_frame_color(self.config.frame_color);
        tracing::debug!(name, ?rect, "view created");
        self.views.push(view);
        let last = self.views.len() - 1;
        Ok(&mut self.views[last])
    }

    /// Like [`set_view`](Self::set_view) but refuses existing names.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateView`] when `name` exists, otherwise as `set_view`.
    pub fn create_view(&mut self, name: &str, geometry: Geometry) -> Result<&mut View> {
        if self.view_index(name).is_some() {
            return Err(Error::DuplicateView(name.to_string()));
        }
        self.set_view(name, geometry)
    }

    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn view(&self, name: &str) -> Result<&View> {
        self.views
            .iter()
            .find(|v| v.name() == name)
            .ok_or_else(|| Error::UnknownView(name.to_string()))
    }

    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn view_mut(&mut self, name: &str) -> Result<&mut View> {
        self.views
            .iter_mut()
            .find(|v| v.name() == name)
            .ok_or_else(|| Error::UnknownView(name.to_string()))
    }

    /// All views, bottom first.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Remove a view. Its keybindings stay until
    /// [`delete_view_keybindings`](Self::delete_view_keybindings).
    ///
    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn delete_view(&mut self, name: &str) -> Result<()> {
        let i = self.index_of(name)?;
        self.views.remove(i);
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        tracing::debug!(name, "view deleted");
        Ok(())
    }

    /// Focus `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn set_current_view(&mut self, name: &str) -> Result<&mut View> {
        let i = self.index_of(name)?;
        self.current = Some(name.to_string());
        Ok(&mut self.views[i])
    }

    #[must_use]
    pub fn current_view(&self) -> Option<&View> {
        let name = self.current.as_deref()?;
        self.views.iter().find(|v| v.name() == name)
    }

    pub fn current_view_mut(&mut self) -> Option<&mut View> {
        let name = self.current.as_deref()?;
        self.views.iter_mut().find(|v| v.name() == name)
    }

    /// Draw `name` above every other view.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn set_view_on_top(&mut self, name: &str) -> Result<&mut View> {
        let i = self.index_of(name)?;
        let view = self.views.remove(i);
        self.views.push(view);
        let last = self.views.len() - 1;
        Ok(&mut self.views[last])
    }

    /// Draw `name` below every other view.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownView`] when no view has this name.
    pub fn set_view_on_bottom(&mut self, name: &str) -> Result<&mut View> {
        let i = self.index_of(name)?;
        let view = self.views.remove(i);
        self.views.insert(0, view);
        Ok(&mut self.views[0])
    }

    /// The topmost visible view whose rectangle contains `(x, y)`.
    #[must_use]
    pub fn view_by_position(&self, x: i32, y: i32) -> Option<&View> {
        self.top_view_at(x, y).map(|i| &self.views[i])
    }

    fn view_index(&self, name: &str) -> Option<usize> {
        self.views.iter().position(|v| v.name() == name)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.view_index(name)
            .ok_or_else(|| Error::UnknownView(name.to_string()))
    }

    fn top_view_at(&self, x: i32, y: i32) -> Option<usize> {
        self.views
            .iter()
            .rposition(|v| v.visible && v.rect.contains(x, y))
    }

    fn current_index(&self) -> Option<usize> {
        self.current.as_deref().and_then(|n| self.view_index(n))
    }

    // -- Layout -------------------------------------------------------------

    /// Replace all layout managers with `manager`.
    pub fn set_manager(&mut self, manager: impl Manager + 'static) {
        self.managers = vec![Box::new(manager)];
    }

    /// Replace all layout managers. They run in order before every frame.
    pub fn set_managers(&mut self, managers: Vec<Box<dyn Manager>>) {
        self.managers = managers;
    }

    /// Called with the new `(width, height)` after every resize.
    pub fn set_resize_handler(&mut self, handler: impl FnMut(&mut Self, u16, u16) -> Result<()> + 'static) {
        self.resize_handler = Some(Box::new(handler));
    }

    // -- Keybindings --------------------------------------------------------

    /// Bind `trigger` with `mods`, globally (`view = None`) or for one view.
    pub fn set_keybinding(
        &mut self,
        view: Option<&str>,
        trigger: impl Into<KeyTrigger>,
        mods: Modifier,
        handler: impl Fn(&mut Self, Option<&str>) -> Result<()> + 'static,
    ) {
        self.keybindings
            .add(Keybinding::new(view, trigger.into(), mods, handler));
    }

    /// Like [`set_keybinding`](Self::set_keybinding), but a rune binding
    /// keeps firing while an editable view is focused.
    pub fn set_edit_keybinding(
        &mut self,
        view: Option<&str>,
        trigger: impl Into<KeyTrigger>,
        mods: Modifier,
        handler: impl Fn(&mut Self, Option<&str>) -> Result<()> + 'static,
    ) {
        self.keybindings
            .add(Keybinding::new(view, trigger.into(), mods, handler).on_edit());
    }

    /// Bind a key written as a string, e.g. `"ctrl+c"` or `"Alt+Enter"`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] when the string does not parse.
    pub fn bind(
        &mut self,
        view: Option<&str>,
        key: &str,
        handler: impl Fn(&mut Self, Option<&str>) -> Result<()> + 'static,
    ) -> Result<()> {
        let (trigger, mods) = parse_binding(key)?;
        self.set_keybinding(view, trigger, mods, handler);
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::UnknownKeybinding`] when nothing was bound this way.
    pub fn delete_keybinding(&mut self, view: Option<&str>, trigger: impl Into<KeyTrigger>, mods: Modifier) -> Result<()> {
        self.keybindings.remove(view, trigger.into(), mods)
    }

    pub fn delete_view_keybindings(&mut self, view: &str) {
        self.keybindings.remove_view(view);
    }

    /// Stop `trigger` from matching any binding.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyBlacklisted`] when it already is.
    pub fn blacklist_keybinding(&mut self, trigger: impl Into<KeyTrigger>) -> Result<()> {
        self.keybindings.blacklist(trigger.into())
    }

    /// # Errors
    ///
    /// [`Error::NotBlacklisted`] when `trigger` was not blacklisted.
    pub fn whitelist_keybinding(&mut self, trigger: impl Into<KeyTrigger>) -> Result<()> {
        self.keybindings.whitelist(trigger.into())
    }

    // -- Cross-thread access ------------------------------------------------

    /// Queue `f` to run after the events of the current iteration.
    pub fn update(&self, f: impl FnOnce(&mut Self) -> Result<()> + Send + 'static) {
        let _ = self.tx.send(Message::Update(Box::new(f)));
    }

    #[must_use]
    pub fn update_sender(&self) -> UpdateSender {
        UpdateSender { tx: self.tx.clone() }
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: Arc::clone(&self.stop),
            tx: self.tx.clone(),
        }
    }

    // -- Main loop ----------------------------------------------------------

    /// Run until a handler returns an error or a [`StopHandle`] fires.
    ///
    /// # Errors
    ///
    /// [`Error::Quit`] when a handler, closure or manager asked to quit, and
    /// any other error that escaped one of them or the backend.
    pub fn main_loop(&mut self) -> Result<()> {
        self.start_pump()?;
        tracing::debug!("main loop started");

        let result = self.run();
        match &result {
            Ok(()) => tracing::debug!("main loop stopped"),
            Err(e) if e.is_quit() => tracing::debug!("main loop quit"),
            Err(e) => tracing::warn!(error = %e, "main loop failed"),
        }
        result
    }

    fn run(&mut self) -> Result<()> {
        self.flush()?;
        loop {
            let first = self.rx.recv().map_err(|_| Error::LoopClosed)?;
            self.iterate(first)?;
            if self.stop.swap(false, Ordering::AcqRel) {
                return Ok(());
            }
        }
    }

    fn start_pump(&mut self) -> Result<()> {
        let Some(mut events) = self.events.take() else {
            return Ok(());
        };
        let tx = self.tx.clone();
        let closing = Arc::clone(&self.closing);
        let pump = thread::Builder::new()
            .name("gui-events".into())
            .spawn(move || {
                while !closing.load(Ordering::Acquire) {
                    match events.poll_event() {
                        Poll::Ready(ev) => {
                            if tx.send(Message::Event(ev)).is_err() {
                                break;
                            }
                        }
                        Poll::Idle => {}
                        Poll::Closed => {
                            tracing::debug!("event source closed");
                            break;
                        }
                    }
                }
            })?;
        self.pump = Some(pump);
        Ok(())
    }

    /// One iteration: `first` plus everything already queued.
    fn iterate(&mut self, first: Message) -> Result<()> {
        let mut updates = Vec::new();
        for msg in std::iter::once(first).chain(self.rx.try_iter().collect::<Vec<_>>()) {
            match msg {
                Message::Event(ev) => self.handle_event(ev)?,
                Message::Update(f) => updates.push(f),
                Message::Wake => {}
            }
        }
        for f in updates {
            f(self)?;
        }
        self.flush()
    }

    // -- Dispatch -----------------------------------------------------------

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(press) => self.dispatch_key(press),
            Event::Mouse { press, x, y } => self.dispatch_mouse(press, x, y),
            Event::Resize { width, height } => self.handle_resize(width, height),
            Event::Raw(text) => {
                self.type_raw(&text);
                Ok(())
            }
            Event::Error(e) => Err(Error::Backend(e)),
        }
    }

    fn dispatch_key(&mut self, press: KeyPress) -> Result<()> {
        let focused = self
            .current_index()
            .map(|i| (self.views[i].name().to_string(), self.views[i].editable));
        let handlers = self
            .keybindings
            .matching(press, focused.as_ref().map(|(n, e)| (n.as_str(), *e)));

        if !handlers.is_empty() {
            let scope = focused.map(|(name, _)| name);
            for handler in handlers {
                handler(self, scope.as_deref())?;
            }
            return Ok(());
        }

        if let Some(view) = self.current_view_mut().filter(|v| v.editable) {
            let editor = Rc::clone(&view.editor);
            if !editor.edit(view, press) {
                tracing::trace!(?press, "key not handled");
            }
        }
        Ok(())
    }

    fn dispatch_mouse(&mut self, press: KeyPress, x: i32, y: i32) -> Result<()> {
        let target = self.top_view_at(x, y);
        if let Some(i) = target {
            let moves_cursor = matches!(
                press.trigger,
                KeyTrigger::Key(Key::MouseLeft | Key::MouseMiddle | Key::MouseRight)
            );
            let view = &mut self.views[i];
            let (w, h) = view.inner_size();
            let (cx, cy) = (x - view.rect.x0 - 1, y - view.rect.y0 - 1);
            if let (true, Ok(cx), Ok(cy)) = (moves_cursor, usize::try_from(cx), usize::try_from(cy)) {
                if cx < w && cy < h {
                    let (dx, dy) = view.document_position(cx, cy);
                    view.set_cursor(dx, dy);
                }
            }
        }

        let scope = target.map(|i| self.views[i].name().to_string());
        let handlers = self.keybindings.matching(
            press,
            target.map(|i| (self.views[i].name(), self.views[i].editable)),
        );
        for handler in handlers {
            handler(self, scope.as_deref())?;
        }
        Ok(())
    }

    fn handle_resize(&mut self, width: u16, height: u16) -> Result<()> {
        tracing::debug!(width, height, "resize");
        self.width = width;
        self.height = height;
        self.canvas.resize(width, height);
        if let Some(mut handler) = self.resize_handler.take() {
            let result = handler(self, width, height);
            if self.resize_handler.is_none() {
                self.resize_handler = Some(handler);
            }
            result?;
        }
        Ok(())
    }

    /// Type pasted text into the focused editable view.
    fn type_raw(&mut self, text: &str) {
        let Some(view) = self.current_view_mut().filter(|v| v.editable) else {
            return;
        };
        let text = text.replace("\r\n", "\n");
        for ch in text.chars() {
            match ch {
                '\n' | '\r' => view.edit_break_line(),
                '\t' => view.edit_write(' '),
                c if c.is_control() => {}
                c => view.edit_write(c),
            }
        }
    }

    // -- Drawing ------------------------------------------------------------

    fn flush(&mut self) -> Result<()> {
        let (width, height) = self.backend.size();
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
        }
        if (self.canvas.width(), self.canvas.height()) != (self.width, self.height) {
            self.canvas.resize(self.width, self.height);
        }

        self.run_managers()?;
        self.draw();
        self.present()
    }

    fn run_managers(&mut self) -> Result<()> {
        let mut managers = mem::take(&mut self.managers);
        let result = managers.iter_mut().try_for_each(|m| m.layout(self));
        managers.append(&mut self.managers);
        self.managers = managers;
        result
    }

    fn draw(&mut self) {
        let mode = self.config.output_mode;
        let (w, h) = self.size();
        self.canvas
            .clear_with_bg(self.config.bg_color.to_cell_color(mode));

        let mut frames = Vec::new();
        for view in &mut self.views {
            if !view.visible {
                continue;
            }
            let rect = view.geometry.resolve(w, h);
            if rect.is_degenerate() {
                tracing::trace!(name = view.name(), ?rect, "view skipped");
                continue;
            }
            view.rect = rect;
            view.draw_content(&mut self.canvas, mode);
            if view.frame {
                let focused = self.current.as_deref() == Some(view.name());
                draw_frame(&mut self.canvas, view, &self.config, focused);
                frames.push(rect);
            }
        }
        if !self.config.ascii {
            resolve_junctions(&mut self.canvas, &frames);
        }
    }

    /// Screen position of the hardware cursor, if it should be shown.
    fn cursor_position(&self) -> Option<(u16, u16)> {
        if !self.config.cursor {
            return None;
        }
        let view = &self.views[self.current_index()?];
        if !view.visible || !view.editable {
            return None;
        }
        let (x, y) = view.visible_cursor()?;
        let x = view.rect.x0 + 1 + i32::try_from(x).ok()?;
        let y = view.rect.y0 + 1 + i32::try_from(y).ok()?;
        Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
    }

    fn present(&mut self) -> Result<()> {
        self.backend.clear();
        for y in 0..self.canvas.height() {
            let Some(row) = self.canvas.row(y) else { break };
            for (x, cell) in (0..).zip(row) {
                self.backend.set_cell(x, y, *cell);
            }
        }
        match self.cursor_position() {
            Some((x, y)) => self.backend.set_cursor(x, y),
            None => self.backend.hide_cursor(),
        }
        self.backend.show()?;
        Ok(())
    }
}

impl Drop for Gui {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "closing gui failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
