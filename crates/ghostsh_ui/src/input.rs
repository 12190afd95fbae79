//! Key decoding
//!
//! Maps crossterm key events onto the small set of editor events the line
//! editor understands. Anything else is dropped here.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Editor-level input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Printable(char),
    Backspace,
    /// Delete the word before the cursor
    CtrlBackspace,
    Delete,
    Tab,
    Enter,
    ShiftEnter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    EndOfInput,
    /// Ctrl+L
    ClearScreen,
}

/// Decode one key event. Releases are ignored; auto-repeat counts as a press.
pub fn from_key_event(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let event = match key.code {
        KeyCode::Enter if shift => InputEvent::ShiftEnter,
        KeyCode::Enter => InputEvent::Enter,
        KeyCode::Tab => InputEvent::Tab,
        KeyCode::Backspace if ctrl || alt => InputEvent::CtrlBackspace,
        KeyCode::Backspace => InputEvent::Backspace,
        KeyCode::Delete => InputEvent::Delete,
        KeyCode::Up => InputEvent::ArrowUp,
        KeyCode::Down => InputEvent::ArrowDown,
        KeyCode::Left => InputEvent::ArrowLeft,
        KeyCode::Right => InputEvent::ArrowRight,
        KeyCode::Home => InputEvent::Home,
        KeyCode::End => InputEvent::End,
        KeyCode::Esc => InputEvent::Escape,
        // AltGr arrives as Ctrl+Alt on Windows
        KeyCode::Char(c) if ctrl && alt && !c.is_control() => InputEvent::Printable(c),
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => InputEvent::Interrupt,
            'd' => InputEvent::EndOfInput,
            'l' => InputEvent::ClearScreen,
            // Many terminals send Ctrl+Backspace as Ctrl+W or Ctrl+H
            'w' | 'h' => InputEvent::CtrlBackspace,
            'a' => InputEvent::Home,
            'e' => InputEvent::End,
            _ => return None,
        },
        KeyCode::Char(_) if alt => return None,
        KeyCode::Char(c) if !c.is_control() => InputEvent::Printable(c),
        _ => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn plain_keys() {
        assert_eq!(from_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)), Some(InputEvent::Printable('x')));
        assert_eq!(from_key_event(key(KeyCode::Char('X'), KeyModifiers::SHIFT)), Some(InputEvent::Printable('X')));
        assert_eq!(from_key_event(key(KeyCode::Tab, KeyModifiers::NONE)), Some(InputEvent::Tab));
        assert_eq!(from_key_event(key(KeyCode::F(1), KeyModifiers::NONE)), None);
    }

    #[test]
    fn modified_keys() {
        assert_eq!(from_key_event(key(KeyCode::Enter, KeyModifiers::SHIFT)), Some(InputEvent::ShiftEnter));
        assert_eq!(from_key_event(key(KeyCode::Backspace, KeyModifiers::CONTROL)), Some(InputEvent::CtrlBackspace));
        assert_eq!(from_key_event(key(KeyCode::Char('w'), KeyModifiers::CONTROL)), Some(InputEvent::CtrlBackspace));
        assert_eq!(from_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(InputEvent::Interrupt));
        assert_eq!(from_key_event(key(KeyCode::Char('d'), KeyModifiers::CONTROL)), Some(InputEvent::EndOfInput));
    }

    #[test]
    fn releases_are_ignored() {
        let mut k = key(KeyCode::Char('a'), KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        assert_eq!(from_key_event(k), None);
    }

    #[test]
    fn held_keys_repeat() {
        let mut k = key(KeyCode::Char('a'), KeyModifiers::NONE);
        k.kind = KeyEventKind::Repeat;
        assert_eq!(from_key_event(k), Some(InputEvent::Printable('a')));
        let mut k = key(KeyCode::Backspace, KeyModifiers::NONE);
        k.kind = KeyEventKind::Repeat;
        assert_eq!(from_key_event(k), Some(InputEvent::Backspace));
    }

    #[test]
    fn altgr_characters_are_typed() {
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        for c in ['|', '\\', '@', '{', '€'] {
            assert_eq!(from_key_event(key(KeyCode::Char(c), altgr)), Some(InputEvent::Printable(c)));
        }
        // Plain Alt chords are still ignored
        assert_eq!(from_key_event(key(KeyCode::Char('|'), KeyModifiers::ALT)), None);
    }
}
