// SPDX-License-Identifier: MIT
//
// n-term — Terminal backend for n-gui.
//
// The lowest layer of the pane engine: it owns the terminal's raw state and
// speaks ANSI in both directions. Output goes through a frame buffer that is
// diffed against the previous frame, so only changed cells reach the wire.
// Input bytes are collected on a background thread, parsed into key, mouse
// and paste events, and merged with resize notifications from SIGWINCH.
//
// Nothing here knows about views, frames or keybindings. n-gui consumes this
// crate through its `Backend` capability trait and could swap it out.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod events;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
