//! Key-to-edit mapping for editable views.
//!
//! When a focused view is editable and no binding claimed a key, the view's
//! [`Editor`] gets it. Any `Fn(&mut View, KeyPress) -> bool` closure is an
//! editor; [`DefaultEditor`] provides the usual line-editing keys.

use crate::keybinding::{Key, KeyPress, KeyTrigger, Modifier};
use crate::view::View;

pub trait Editor {
    /// Apply `key` to `view`. Returns whether the key was handled.
    fn edit(&self, view: &mut View, key: KeyPress) -> bool;
}

impl<F> Editor for F
where
    F: Fn(&mut View, KeyPress) -> bool,
{
    fn edit(&self, view: &mut View, key: KeyPress) -> bool {
        self(view, key)
    }
}

/// Printable runes, Space, Backspace, Delete, Enter, arrows (Alt for words),
/// Home/End and Ctrl+A/E, Insert (overwrite), Ctrl+W, Alt+D, Ctrl+U/K, Ctrl+Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEditor;

impl Editor for DefaultEditor {
    fn edit(&self, view: &mut View, key: KeyPress) -> bool {
        default_edit(view, key)
    }
}

/// The [`DefaultEditor`] mapping as a function, for editors that extend it.
pub fn default_edit(view: &mut View, key: KeyPress) -> bool {
    let alt = key.mods.contains(Modifier::ALT);
    match key.trigger {
        KeyTrigger::Rune('d') if alt => view.delete_word_forward(),
        KeyTrigger::Rune('b') if alt => view.move_word_left(),
        KeyTrigger::Rune('f') if alt => view.move_word_right(),
        KeyTrigger::Rune(_) if alt => return false,
        KeyTrigger::Rune(ch) => view.edit_write(ch),
        KeyTrigger::Key(k) => match k {
            Key::Space => view.edit_write(' '),
            Key::Backspace if alt => view.backspace_word(),
            Key::Backspace => view.edit_delete_backward(),
            Key::Delete => view.edit_delete_forward(),
            Key::Enter => view.edit_break_line(),
            Key::ArrowLeft if alt => view.move_word_left(),
            Key::ArrowRight if alt => view.move_word_right(),
            Key::ArrowLeft => view.move_cursor(-1, 0),
            Key::ArrowRight => view.move_cursor(1, 0),
            Key::ArrowUp => view.move_cursor(0, -1),
            Key::ArrowDown => view.move_cursor(0, 1),
            Key::Home | Key::Ctrl('a') => view.move_to_line_start(),
            Key::End | Key::Ctrl('e') => view.move_to_line_end(),
            Key::Insert => view.set_overwrite(!view.overwrites()),
            Key::Ctrl('w') => view.backspace_word(),
            Key::Ctrl('u') => view.delete_to_line_start(),
            Key::Ctrl('k') => view.delete_to_line_end(),
            Key::Ctrl('y') => view.yank(),
            _ => return false,
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Rect};
    use pretty_assertions::assert_eq;

    fn editable() -> View {
        let mut v = View::new("in", Geometry::absolute(0, 0, 40, 3), Rect::new(0, 0, 40, 3));
        v.set_editable(true);
        v
    }

    fn type_keys(v: &mut View, keys: &[KeyPress]) {
        for &k in keys {
            DefaultEditor.edit(v, k);
        }
    }

    #[test]
    fn typing_and_line_breaks() {
        let mut v = editable();
        type_keys(
            &mut v,
            &[
                KeyPress::rune('h'),
                KeyPress::rune('i'),
                KeyPress::key(Key::Space),
                KeyPress::rune('x'),
                KeyPress::key(Key::Backspace),
                KeyPress::key(Key::Enter),
                KeyPress::rune('y'),
            ],
        );
        assert_eq!(v.buffer(), "hi \ny");
    }

    #[test]
    fn home_end_and_ctrl_equivalents() {
        let mut v = editable();
        v.set_content("abc");
        v.set_cursor(1, 0);
        DefaultEditor.edit(&mut v, KeyPress::key(Key::End));
        assert_eq!(v.cursor(), (3, 0));
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Ctrl('a')));
        assert_eq!(v.cursor(), (0, 0));
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Ctrl('e')));
        assert_eq!(v.cursor(), (3, 0));
    }

    #[test]
    fn alt_word_keys() {
        let mut v = editable();
        v.set_content("one two");
        v.set_cursor(7, 0);
        let alt = |k| KeyPress::new(KeyTrigger::Key(k), Modifier::ALT);
        DefaultEditor.edit(&mut v, alt(Key::ArrowLeft));
        assert_eq!(v.cursor(), (4, 0));
        DefaultEditor.edit(&mut v, KeyPress::new('d'.into(), Modifier::ALT));
        assert_eq!(v.buffer(), "one ");
    }

    #[test]
    fn kill_and_yank() {
        let mut v = editable();
        v.set_content("hello world");
        v.set_cursor(5, 0);
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Ctrl('k')));
        assert_eq!(v.buffer(), "hello");
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Ctrl('u')));
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Ctrl('y')));
        assert_eq!(v.buffer(), "hello");
    }

    #[test]
    fn insert_toggles_overwrite() {
        let mut v = editable();
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Insert));
        assert!(v.overwrites());
        DefaultEditor.edit(&mut v, KeyPress::key(Key::Insert));
        assert!(!v.overwrites());
    }

    #[test]
    fn unknown_keys_are_not_handled() {
        let mut v = editable();
        assert!(!DefaultEditor.edit(&mut v, KeyPress::key(Key::F(1))));
        assert!(!DefaultEditor.edit(&mut v, KeyPress::new('z'.into(), Modifier::ALT)));
    }

    #[test]
    fn closures_are_editors() {
        let upper = |v: &mut View, k: KeyPress| match k.trigger {
            KeyTrigger::Rune(c) => {
                v.edit_write(c.to_ascii_uppercase());
                true
            }
            _ => false,
        };
        let mut v = editable();
        v.set_editor(upper);
        let editor = std::rc::Rc::clone(&v.editor);
        editor.edit(&mut v, KeyPress::rune('q'));
        assert_eq!(v.buffer(), "Q");
    }
}
