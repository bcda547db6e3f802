//! Error type shared by every fallible operation in the crate.
//!
//! [`Error::Quit`] is not a failure: handlers return it to ask the main loop
//! to stop, and the loop hands it back to the caller unchanged.

use std::io;

use thiserror::Error;

/// Errors produced by [`Gui`](crate::Gui) and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Graceful shutdown request.
    #[error("quit")]
    Quit,

    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("view already exists: {0}")]
    DuplicateView(String),

    #[error("invalid view name")]
    InvalidViewName,

    #[error("invalid geometry for view {name}: ({x0},{y0})-({x1},{y1})")]
    InvalidGeometry {
        name: String,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    },

    #[error("keybinding not found")]
    UnknownKeybinding,

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("key already blacklisted: {0}")]
    AlreadyBlacklisted(String),

    #[error("key not blacklisted: {0}")]
    NotBlacklisted(String),

    /// The main loop has exited and no longer accepts updates.
    #[error("main loop is not running")]
    LoopClosed,

    #[error("backend error: {0}")]
    Backend(#[from] io::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether this is the [`Quit`](Self::Quit) signal.
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }

    /// Wrap an arbitrary application error.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
