//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Whether keystrokes navigate the list or edit the filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    CopySelected,
    DeleteSelected,
    StartFilter,
    FilterChar(char),
    FilterBackspace,
    ApplyFilter,
    ClearFilter,
    ToggleHelp,
    Quit,
}

/// Map a key press to an action. Releases and repeats of unbound keys map to
/// `None`.
pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
        return Some(KeyAction::Quit);
    }

    match mode {
        InputMode::Filter => match key.code {
            KeyCode::Esc => Some(KeyAction::ClearFilter),
            KeyCode::Enter => Some(KeyAction::ApplyFilter),
            KeyCode::Backspace => Some(KeyAction::FilterBackspace),
            KeyCode::Up => Some(KeyAction::Up),
            KeyCode::Down => Some(KeyAction::Down),
            KeyCode::Char(c) => Some(KeyAction::FilterChar(c)),
            _ => None,
        },
        InputMode::Browse => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::Down),
            KeyCode::PageUp => Some(KeyAction::PageUp),
            KeyCode::PageDown => Some(KeyAction::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(KeyAction::Top),
            KeyCode::End | KeyCode::Char('G') => Some(KeyAction::Bottom),
            KeyCode::Enter => Some(KeyAction::CopySelected),
            KeyCode::Char('x') | KeyCode::Backspace | KeyCode::Delete => Some(KeyAction::DeleteSelected),
            KeyCode::Char('/') => Some(KeyAction::StartFilter),
            KeyCode::Char('?') => Some(KeyAction::ToggleHelp),
            KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
            _ => None,
        },
    }
}
