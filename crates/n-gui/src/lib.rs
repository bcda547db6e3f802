//! # n-gui — Terminal UI core
//!
//! Turns a character terminal into a surface of independently positioned,
//! styled and editable text panes ("views"), composited with borders and
//! driven by a single-threaded loop that other threads can schedule work into.
//!
//! - **[`attribute`]** — packed color + text-style values and output modes
//! - **[`escape`]** — the SGR / erase-in-line interpreter behind `View::write`
//! - **[`cell`]**, **[`wrap`]** — cell buffers and the width-aware line wrapper
//! - **[`view`]**, **[`edit`]**, **[`editor`]** — panes, the edit engine, key-to-edit mapping
//! - **[`geometry`]**, **[`compositor`]**, **[`scrollbar`]** — layout and frame drawing
//! - **[`keybinding`]** — key triggers, parsing, and the dispatch table
//! - **[`backend`]** — the terminal capability trait, n-term and headless implementations
//! - **[`event`]**, **[`config`]** — the loop's event vocabulary and settings
//! - **[`gui`]** — the event/update loop that owns everything above
//!
//! ```no_run
//! use n_gui::{Error, Geometry, Gui, GuiConfig, TerminalBackend};
//!
//! fn main() -> n_gui::Result<()> {
//!     let mut gui = Gui::new(Box::new(TerminalBackend::new()), GuiConfig::default())?;
//!     gui.set_manager(|gui: &mut Gui| {
//!         let (w, h) = gui.size();
//!         let v = gui.set_view("hello", Geometry::absolute(0, 0, w - 1, h - 1))?;
//!         v.set_content("Hello, world!");
//!         Ok(())
//!     });
//!     gui.bind(None, "ctrl+c", |_, _| Err(Error::Quit))?;
//!     match gui.main_loop() {
//!         Err(e) if e.is_quit() => Ok(()),
//!         other => other,
//!     }
//! }
//! ```

pub mod attribute;
pub mod backend;
pub mod cell;
pub mod compositor;
pub mod config;
pub mod edit;
pub mod editor;
pub mod error;
pub mod escape;
pub mod event;
pub mod geometry;
pub mod gui;
pub mod keybinding;
pub mod scrollbar;
pub mod view;
pub mod wrap;

pub use attribute::{Attribute, OutputMode};
pub use backend::{Backend, EventSource, HeadlessBackend, HeadlessHandle, TerminalBackend};
pub use config::GuiConfig;
pub use editor::{DefaultEditor, Editor};
pub use error::{Error, Result};
pub use event::Event;
pub use geometry::{Geometry, Rect};
pub use gui::{Gui, Manager, StopHandle, UpdateSender};
pub use keybinding::{Key, KeyPress, KeyTrigger, Modifier};
pub use view::{FrameRunes, Overlap, View};
