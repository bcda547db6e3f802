//! Events as the loop sees them, after backend translation.

use std::io;

use crate::keybinding::KeyPress;

#[derive(Debug)]
pub enum Event {
    Key(KeyPress),
    /// A mouse press, release, wheel or drag at screen cell `(x, y)`.
    /// Drags carry [`Modifier::MOTION`](crate::Modifier::MOTION).
    Mouse { press: KeyPress, x: i32, y: i32 },
    Resize { width: u16, height: u16 },
    /// Text delivered in one piece (bracketed paste).
    Raw(String),
    /// The backend failed; the loop returns it as `Error::Backend`.
    Error(io::Error),
}
