//! Key triggers, binding strings, and the dispatch table.
//!
//! A binding is keyed by scope (global or a view name), trigger and modifier
//! mask. Triggers are either a special [`Key`] or a printable rune; the two
//! never match each other.
//!
//! ```
//! use n_gui::keybinding::{parse_binding, Key, KeyTrigger, Modifier};
//!
//! assert_eq!(parse_binding("ctrl+c").unwrap(), (KeyTrigger::Key(Key::Ctrl('c')), Modifier::empty()));
//! assert_eq!(parse_binding("alt+x").unwrap(), (KeyTrigger::Rune('x'), Modifier::ALT));
//! assert_eq!(parse_binding("F5").unwrap(), (KeyTrigger::Key(Key::F(5)), Modifier::empty()));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::gui::Gui;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Non-printable keys and mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// F1 through F12.
    F(u8),
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Tab,
    BackTab,
    Backspace,
    Esc,
    Space,
    /// A control chord such as Ctrl+C. Letters are lowercase.
    Ctrl(char),
    MouseLeft,
    MouseMiddle,
    MouseRight,
    MouseRelease,
    MouseWheelUp,
    MouseWheelDown,
}

impl Key {
    #[must_use]
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseLeft
                | Self::MouseMiddle
                | Self::MouseRight
                | Self::MouseRelease
                | Self::MouseWheelUp
                | Self::MouseWheelDown
        )
    }
}

/// What a binding listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTrigger {
    Key(Key),
    Rune(char),
}

impl From<Key> for KeyTrigger {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

impl From<char> for KeyTrigger {
    fn from(ch: char) -> Self {
        Self::Rune(ch)
    }
}

impl fmt::Display for KeyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Rune(ch) => return write!(f, "{ch}"),
            Self::Key(key) => *key,
        };
        match key {
            Key::F(n) => write!(f, "f{n}"),
            Key::Ctrl(' ') => f.write_str("ctrl+space"),
            Key::Ctrl(ch) => write!(f, "ctrl+{ch}"),
            other => f.write_str(
                KEY_NAMES
                    .iter()
                    .find(|(_, k)| *k == other)
                    .map_or("?", |(name, _)| *name),
            ),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifier: u8 {
        const ALT    = 1;
        const CTRL   = 2;
        const SHIFT  = 4;
        /// Mouse movement with a button held.
        const MOTION = 8;
    }
}

/// A key event as seen by bindings and editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub trigger: KeyTrigger,
    pub mods: Modifier,
}

impl KeyPress {
    #[must_use]
    pub const fn new(trigger: KeyTrigger, mods: Modifier) -> Self {
        Self { trigger, mods }
    }

    #[must_use]
    pub const fn key(key: Key) -> Self {
        Self::new(KeyTrigger::Key(key), Modifier::empty())
    }

    #[must_use]
    pub const fn rune(ch: char) -> Self {
        Self::new(KeyTrigger::Rune(ch), Modifier::empty())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Lowercase names accepted by [`parse_binding`]. The first name for a key is
/// the one it displays as.
const KEY_NAMES: &[(&str, Key)] = &[
    ("enter", Key::Enter),
    ("return", Key::Enter),
    ("tab", Key::Tab),
    ("backtab", Key::BackTab),
    ("backspace", Key::Backspace),
    ("esc", Key::Esc),
    ("escape", Key::Esc),
    ("space", Key::Space),
    ("insert", Key::Insert),
    ("ins", Key::Insert),
    ("delete", Key::Delete),
    ("del", Key::Delete),
    ("home", Key::Home),
    ("end", Key::End),
    ("pgup", Key::PageUp),
    ("pageup", Key::PageUp),
    ("pgdn", Key::PageDown),
    ("pagedown", Key::PageDown),
    ("up", Key::ArrowUp),
    ("down", Key::ArrowDown),
    ("left", Key::ArrowLeft),
    ("right", Key::ArrowRight),
    ("mouseleft", Key::MouseLeft),
    ("mousemiddle", Key::MouseMiddle),
    ("mouseright", Key::MouseRight),
    ("mouserelease", Key::MouseRelease),
    ("wheelup", Key::MouseWheelUp),
    ("wheeldown", Key::MouseWheelDown),
];

/// Parse strings like `"q"`, `"Enter"`, `"Ctrl+C"`, `"Alt+x"` or `"F5"`.
///
/// Names and modifiers are case-insensitive; a single-character key keeps
/// its case. Ctrl with a letter becomes [`Key::Ctrl`], the form terminals
/// deliver it in.
///
/// # Errors
///
/// [`Error::UnknownKey`] when the string names no key or modifier.
pub fn parse_binding(spec: &str) -> Result<(KeyTrigger, Modifier)> {
    let unknown = || Error::UnknownKey(spec.to_string());

    let (mod_part, key_part) = split_key(spec);
    if key_part.is_empty() {
        return Err(unknown());
    }

    let mut mods = Modifier::empty();
    for name in mod_part.split('+').filter(|p| !p.is_empty()) {
        mods |= match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Modifier::CTRL,
            "alt" | "meta" => Modifier::ALT,
            "shift" => Modifier::SHIFT,
            _ => return Err(unknown()),
        };
    }

    let mut chars = key_part.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if mods.contains(Modifier::CTRL) && (ch.is_ascii_alphabetic() || "\\]^_ ".contains(ch)) {
            mods.remove(Modifier::CTRL);
            return Ok((KeyTrigger::Key(Key::Ctrl(ch.to_ascii_lowercase())), mods));
        }
        if ch == ' ' {
            return Ok((KeyTrigger::Key(Key::Space), mods));
        }
        return Ok((KeyTrigger::Rune(ch), mods));
    }

    let name = key_part.to_ascii_lowercase();
    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return if (1..=12).contains(&n) {
            Ok((KeyTrigger::Key(Key::F(n)), mods))
        } else {
            Err(unknown())
        };
    }
    let key = KEY_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, k)| *k)
        .ok_or_else(unknown)?;
    if key == Key::Space && mods.contains(Modifier::CTRL) {
        mods.remove(Modifier::CTRL);
        return Ok((KeyTrigger::Key(Key::Ctrl(' ')), mods));
    }
    Ok((KeyTrigger::Key(key), mods))
}

/// Split `"ctrl+alt+x"` into `("ctrl+alt", "x")`. A trailing `+` is the key.
fn split_key(spec: &str) -> (&str, &str) {
    if spec.len() > 1 && spec.ends_with("++") {
        return (&spec[..spec.len() - 2], "+");
    }
    match spec.rsplit_once('+') {
        Some((mods, key)) if !key.is_empty() => (mods, key),
        _ => ("", spec),
    }
}

// ---------------------------------------------------------------------------
// Dispatch table
// ---------------------------------------------------------------------------

/// A binding handler. It receives the GUI and the name of the view in scope.
pub type Handler = Rc<dyn Fn(&mut Gui, Option<&str>) -> Result<()>>;

pub struct Keybinding {
    pub(crate) view: Option<String>,
    pub(crate) trigger: KeyTrigger,
    pub(crate) mods: Modifier,
    pub(crate) on_edit: bool,
    pub(crate) handler: Handler,
}

impl Keybinding {
    pub fn new(
        view: Option<&str>,
        trigger: KeyTrigger,
        mods: Modifier,
        handler: impl Fn(&mut Gui, Option<&str>) -> Result<()> + 'static,
    ) -> Self {
        Self {
            view: view.map(str::to_string),
            trigger,
            mods,
            on_edit: false,
            handler: Rc::new(handler),
        }
    }

    /// Let a rune binding fire while an editable view is focused.
    #[must_use]
    pub const fn on_edit(mut self) -> Self {
        self.on_edit = true;
        self
    }

    fn matches(&self, press: KeyPress, focused: Option<(&str, bool)>) -> bool {
        if self.trigger != press.trigger || self.mods != press.mods {
            return false;
        }
        let editable = match (&self.view, focused) {
            (None, focused) => focused.is_some_and(|(_, editable)| editable),
            (Some(scope), Some((name, editable))) if scope == name => editable,
            _ => return false,
        };
        !(editable && matches!(self.trigger, KeyTrigger::Rune(_)) && !self.on_edit)
    }
}

impl fmt::Debug for Keybinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keybinding")
            .field("view", &self.view)
            .field("trigger", &self.trigger)
            .field("mods", &self.mods)
            .field("on_edit", &self.on_edit)
            .finish_non_exhaustive()
    }
}

/// Registered bindings plus the trigger blacklist.
#[derive(Debug, Default)]
pub struct Keybindings {
    bindings: Vec<Keybinding>,
    blacklist: HashSet<KeyTrigger>,
}

impl Keybindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, binding: Keybinding) {
        self.bindings.push(binding);
    }

    /// Remove bindings with exactly this scope, trigger and modifier.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKeybinding`] when none matched.
    pub fn remove(&mut self, view: Option<&str>, trigger: KeyTrigger, mods: Modifier) -> Result<()> {
        let before = self.bindings.len();
        self.bindings
            .retain(|b| !(b.view.as_deref() == view && b.trigger == trigger && b.mods == mods));
        if self.bindings.len() == before {
            Err(Error::UnknownKeybinding)
        } else {
            Ok(())
        }
    }

    /// Remove every binding scoped to `view`.
    pub fn remove_view(&mut self, view: &str) {
        self.bindings.retain(|b| b.view.as_deref() != Some(view));
    }

    /// # Errors
    ///
    /// [`Error::AlreadyBlacklisted`] when the trigger is already disabled.
    pub fn blacklist(&mut self, trigger: KeyTrigger) -> Result<()> {
        if self.blacklist.insert(trigger) {
            Ok(())
        } else {
            Err(Error::AlreadyBlacklisted(trigger.to_string()))
        }
    }

    /// # Errors
    ///
    /// [`Error::NotBlacklisted`] when the trigger was not disabled.
    pub fn whitelist(&mut self, trigger: KeyTrigger) -> Result<()> {
        if self.blacklist.remove(&trigger) {
            Ok(())
        } else {
            Err(Error::NotBlacklisted(trigger.to_string()))
        }
    }

    #[must_use]
    pub fn is_blacklisted(&self, trigger: KeyTrigger) -> bool {
        self.blacklist.contains(&trigger)
    }

    /// Handlers for `press`, in registration order. `focused` is the view in
    /// scope and whether it is editable.
    #[must_use]
    pub fn matching(&self, press: KeyPress, focused: Option<(&str, bool)>) -> Vec<Handler> {
        if self.is_blacklisted(press.trigger) {
            return Vec::new();
        }
        self.bindings
            .iter()
            .filter(|b| b.matches(press, focused))
            .map(|b| Rc::clone(&b.handler))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop() -> impl Fn(&mut Gui, Option<&str>) -> Result<()> {
        |_, _| Ok(())
    }

    // -- Parsing ------------------------------------------------------------

    #[test]
    fn parse_runes_keep_case() {
        assert_eq!(parse_binding("q").unwrap(), (KeyTrigger::Rune('q'), Modifier::empty()));
        assert_eq!(parse_binding("Q").unwrap(), (KeyTrigger::Rune('Q'), Modifier::empty()));
        assert_eq!(parse_binding("+").unwrap(), (KeyTrigger::Rune('+'), Modifier::empty()));
        assert_eq!(parse_binding("alt++").unwrap(), (KeyTrigger::Rune('+'), Modifier::ALT));
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(parse_binding("Enter").unwrap().0, KeyTrigger::Key(Key::Enter));
        assert_eq!(parse_binding("PgUp").unwrap().0, KeyTrigger::Key(Key::PageUp));
        assert_eq!(parse_binding("f12").unwrap().0, KeyTrigger::Key(Key::F(12)));
        assert_eq!(parse_binding("space").unwrap().0, KeyTrigger::Key(Key::Space));
        assert_eq!(
            parse_binding("shift+tab").unwrap(),
            (KeyTrigger::Key(Key::Tab), Modifier::SHIFT)
        );
    }

    #[test]
    fn parse_ctrl_chords() {
        assert_eq!(parse_binding("Ctrl+C").unwrap(), (KeyTrigger::Key(Key::Ctrl('c')), Modifier::empty()));
        assert_eq!(
            parse_binding("ctrl+alt+x").unwrap(),
            (KeyTrigger::Key(Key::Ctrl('x')), Modifier::ALT)
        );
        assert_eq!(parse_binding("ctrl+space").unwrap().0, KeyTrigger::Key(Key::Ctrl(' ')));
        assert_eq!(
            parse_binding("ctrl+up").unwrap(),
            (KeyTrigger::Key(Key::ArrowUp), Modifier::CTRL)
        );
    }

    #[test]
    fn parse_failures() {
        for bad in ["", "hyper+x", "f13", "f0", "nokey", "ctrl+"] {
            assert!(
                matches!(parse_binding(bad), Err(Error::UnknownKey(_))),
                "{bad:?} should fail"
            );
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(KeyTrigger::Key(Key::Ctrl('c')).to_string(), "ctrl+c");
        assert_eq!(KeyTrigger::Key(Key::PageDown).to_string(), "pgdn");
        assert_eq!(KeyTrigger::Key(Key::F(3)).to_string(), "f3");
        assert_eq!(KeyTrigger::Rune('x').to_string(), "x");
    }

    // -- Matching -----------------------------------------------------------

    #[test]
    fn global_bindings_match_any_focus() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(None, 'q'.into(), Modifier::empty(), noop()));
        assert_eq!(kb.matching(KeyPress::rune('q'), None).len(), 1);
        assert_eq!(kb.matching(KeyPress::rune('q'), Some(("list", false))).len(), 1);
        assert_eq!(kb.matching(KeyPress::rune('w'), None).len(), 0);
    }

    #[test]
    fn scoped_bindings_need_focus() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(Some("list"), Key::Enter.into(), Modifier::empty(), noop()));
        let enter = KeyPress::key(Key::Enter);
        assert!(kb.matching(enter, None).is_empty());
        assert!(kb.matching(enter, Some(("other", false))).is_empty());
        assert_eq!(kb.matching(enter, Some(("list", false))).len(), 1);
    }

    #[test]
    fn modifiers_must_match() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(None, 'x'.into(), Modifier::ALT, noop()));
        assert!(kb.matching(KeyPress::rune('x'), None).is_empty());
        let alt_x = KeyPress::new('x'.into(), Modifier::ALT);
        assert_eq!(kb.matching(alt_x, None).len(), 1);
    }

    #[test]
    fn editable_focus_suppresses_rune_bindings() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(None, 'q'.into(), Modifier::empty(), noop()));
        kb.add(Keybinding::new(None, 'e'.into(), Modifier::empty(), noop()).on_edit());
        kb.add(Keybinding::new(None, Key::Ctrl('c').into(), Modifier::empty(), noop()));
        let focus = Some(("input", true));
        assert!(kb.matching(KeyPress::rune('q'), focus).is_empty());
        assert_eq!(kb.matching(KeyPress::rune('e'), focus).len(), 1);
        assert_eq!(kb.matching(KeyPress::key(Key::Ctrl('c')), focus).len(), 1);
    }

    #[test]
    fn all_matches_are_returned() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(None, 'a'.into(), Modifier::empty(), noop()));
        kb.add(Keybinding::new(Some("v"), 'a'.into(), Modifier::empty(), noop()));
        assert_eq!(kb.matching(KeyPress::rune('a'), Some(("v", false))).len(), 2);
    }

    #[test]
    fn blacklist_and_whitelist() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(None, 'q'.into(), Modifier::empty(), noop()));
        kb.blacklist('q'.into()).unwrap();
        assert!(kb.matching(KeyPress::rune('q'), None).is_empty());
        assert!(matches!(kb.blacklist('q'.into()), Err(Error::AlreadyBlacklisted(_))));
        kb.whitelist('q'.into()).unwrap();
        assert_eq!(kb.matching(KeyPress::rune('q'), None).len(), 1);
        assert!(matches!(kb.whitelist('q'.into()), Err(Error::NotBlacklisted(_))));
    }

    #[test]
    fn remove_bindings() {
        let mut kb = Keybindings::new();
        kb.add(Keybinding::new(Some("v"), 'a'.into(), Modifier::empty(), noop()));
        kb.add(Keybinding::new(Some("v"), 'b'.into(), Modifier::empty(), noop()));
        kb.add(Keybinding::new(None, 'c'.into(), Modifier::empty(), noop()));
        kb.remove(Some("v"), 'a'.into(), Modifier::empty()).unwrap();
        assert!(matches!(
            kb.remove(Some("v"), 'a'.into(), Modifier::empty()),
            Err(Error::UnknownKeybinding)
        ));
        kb.remove_view("v");
        assert_eq!(kb.len(), 1);
    }
}
