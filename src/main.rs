// SPDX-License-Identifier: MIT
//
// n-panes — a small multi-pane terminal program built on n-gui.
//
// It wires the real terminal backend to a three-pane layout:
//
//   ┌ Items ──┬ Notes ──────────────────┐
//   │ alpha   │ editable, wrapped text  │
//   │ bravo   │                         │
//   ├ Status ─┴─────────────── up 00:42 ┤
//   │ focus, key help                   │
//   └───────────────────────────────────┘
//
// Keys flow stdin → n-term parser → pump thread → Gui dispatch. A clock
// thread schedules a subtitle update every second through an UpdateSender,
// so the status pane redraws without any input.
//
// Logging goes to the file named by N_PANES_LOG (stdout belongs to the UI);
// RUST_LOG filters it, defaulting to `debug`.

use std::env;
use std::fs::File;
use std::process;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use n_gui::{Attribute, Error, Geometry, Gui, GuiConfig, Key, Modifier, TerminalBackend, UpdateSender, View};
use tracing_subscriber::EnvFilter;

const ITEMS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliett",
];

const HELP: &str = "Tab switch  Enter insert  Ctrl+L clear  Ctrl+C quit";

// ─── Layout ─────────────────────────────────────────────────────────────────

fn layout(gui: &mut Gui) -> n_gui::Result<()> {
    let (w, h) = gui.size();
    if w < 24 || h < 8 {
        return Ok(());
    }
    let split = (w / 3).max(12);
    let bottom = h - 4;
    let first = gui.view("side").is_err();

    let side = gui.set_view("side", Geometry::absolute(0, 0, split, bottom))?;
    side.set_title("Items");
    side.set_highlight(true);
    side.set_sel_bg_color(Attribute::BLUE);
    side.set_sel_fg_color(Attribute::WHITE | Attribute::BOLD);
    if first {
        side.set_content(&ITEMS.join("\n"));
    }

    let main = gui.set_view("main", Geometry::absolute(split, 0, w - 1, bottom))?;
    main.set_title("Notes");
    main.set_editable(true);
    main.set_wrap(true);
    main.set_scrollbar(true);
    let lines = main.lines_height();
    main.set_subtitle(format!("{lines} lines"));

    gui.set_view("status", Geometry::absolute(0, bottom, w - 1, h - 1))?
        .set_title("Status");
    if first {
        gui.set_current_view("side")?;
    }

    let focus = gui.current_view().map_or("-", View::name).to_string();
    gui.view_mut("status")?
        .set_content(&format!("focus: \x1b[1m{focus}\x1b[0m\n{HELP}"));
    Ok(())
}

// ─── Keys ───────────────────────────────────────────────────────────────────

fn bind_keys(gui: &mut Gui) -> n_gui::Result<()> {
    gui.bind(None, "ctrl+c", |_, _| Err(Error::Quit))?;

    gui.bind(None, "tab", |gui, current| {
        let next = if current == Some("side") { "main" } else { "side" };
        gui.set_current_view(next)?;
        Ok(())
    })?;

    gui.bind(Some("side"), "up", |gui, _| {
        gui.view_mut("side")?.move_cursor(0, -1);
        Ok(())
    })?;
    gui.bind(Some("side"), "down", |gui, _| {
        gui.view_mut("side")?.move_cursor(0, 1);
        Ok(())
    })?;
    gui.bind(Some("side"), "enter", |gui, _| {
        let side = gui.view("side")?;
        let item = side.line(side.cursor().1).unwrap_or_default();
        let main = gui.view_mut("main")?;
        for ch in item.chars() {
            main.edit_write(ch);
        }
        main.edit_break_line();
        Ok(())
    })?;

    gui.bind(Some("main"), "ctrl+l", |gui, _| {
        gui.view_mut("main")?.clear();
        Ok(())
    })?;

    for name in ["side", "main"] {
        gui.set_keybinding(Some(name), Key::MouseLeft, Modifier::empty(), |gui, view| {
            if let Some(view) = view {
                gui.set_current_view(view)?;
            }
            Ok(())
        });
    }
    gui.set_keybinding(Some("main"), Key::MouseWheelUp, Modifier::empty(), |gui, _| {
        let main = gui.view_mut("main")?;
        let (ox, oy) = main.origin();
        main.set_origin(ox, oy.saturating_sub(1));
        Ok(())
    });
    gui.set_keybinding(Some("main"), Key::MouseWheelDown, Modifier::empty(), |gui, _| {
        let main = gui.view_mut("main")?;
        let (ox, oy) = main.origin();
        main.set_origin(ox, (oy + 1).min(main.view_lines_height().saturating_sub(1)));
        Ok(())
    });
    Ok(())
}

// ─── Clock ──────────────────────────────────────────────────────────────────

/// Update the status subtitle once a second until the loop goes away.
fn spawn_clock(updates: UpdateSender) {
    let spawned = thread::Builder::new().name("clock".into()).spawn(move || {
        let start = Instant::now();
        loop {
            thread::sleep(Duration::from_secs(1));
            let secs = start.elapsed().as_secs();
            let sent = updates.update(move |gui| {
                gui.view_mut("status")?
                    .set_subtitle(format!("up {:02}:{:02}", secs / 60, secs % 60));
                Ok(())
            });
            if sent.is_err() {
                break;
            }
        }
    });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "clock thread not started");
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging() {
    let Some(path) = env::var_os("N_PANES_LOG") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("n-panes: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run() -> n_gui::Result<()> {
    let config = GuiConfig {
        mouse: true,
        cursor: true,
        highlight: true,
        sel_frame_color: Attribute::GREEN,
        ..GuiConfig::default()
    };
    let mut gui = Gui::new(Box::new(TerminalBackend::new()), config)?;
    gui.set_manager(layout);
    bind_keys(&mut gui)?;
    spawn_clock(gui.update_sender());

    let result = gui.main_loop();
    gui.close()?;
    match result {
        Err(e) if e.is_quit() => Ok(()),
        other => other,
    }
}

fn main() {
    init_logging();

    if !n_term::terminal::is_tty() {
        eprintln!("n-panes: stdout is not a terminal");
        process::exit(1);
    }

    if let Err(e) = run() {
        tracing::error!(error = %e, "n-panes failed");
        eprintln!("n-panes: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use n_gui::{HeadlessBackend, HeadlessHandle, KeyPress};

    fn demo() -> (Gui, HeadlessHandle) {
        let (backend, handle) = HeadlessBackend::new(60, 20);
        let mut gui = Gui::new(Box::new(backend), GuiConfig::default()).unwrap();
        gui.set_manager(layout);
        bind_keys(&mut gui).unwrap();
        (gui, handle)
    }

    fn run_until_quit(gui: &mut Gui, handle: &HeadlessHandle) {
        handle.key(KeyPress::key(Key::Ctrl('c')));
        assert!(gui.main_loop().unwrap_err().is_quit());
    }

    #[test]
    fn layout_builds_three_panes() {
        let (mut gui, handle) = demo();
        run_until_quit(&mut gui, &handle);
        let names: Vec<_> = gui.views().iter().map(View::name).collect();
        assert_eq!(names, ["side", "main", "status"]);
        assert_eq!(gui.current_view().map(View::name), Some("side"));
        assert!(handle.row_text(0).starts_with("┌─Items"));
        assert!(handle.row_text(16).starts_with("├─Status"));
    }

    #[test]
    fn enter_copies_the_selected_item() {
        let (mut gui, handle) = demo();
        handle.key(KeyPress::key(Key::ArrowDown));
        handle.key(KeyPress::key(Key::Enter));
        run_until_quit(&mut gui, &handle);
        assert_eq!(gui.view("main").unwrap().buffer(), "bravo\n");
    }

    #[test]
    fn tab_moves_focus_to_the_editor() {
        let (mut gui, handle) = demo();
        handle.key(KeyPress::key(Key::Tab));
        handle.key(KeyPress::rune('x'));
        run_until_quit(&mut gui, &handle);
        assert_eq!(gui.current_view().map(View::name), Some("main"));
        assert_eq!(gui.view("main").unwrap().buffer(), "x");
    }

    #[test]
    fn tiny_terminals_get_no_layout() {
        let (backend, handle) = HeadlessBackend::new(10, 4);
        let mut gui = Gui::new(Box::new(backend), GuiConfig::default()).unwrap();
        gui.set_manager(layout);
        bind_keys(&mut gui).unwrap();
        run_until_quit(&mut gui, &handle);
        assert!(gui.views().is_empty());
    }
}
