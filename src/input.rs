//! Key bindings: arrows, vim-style hjkl and yubn diagonals.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Cursor step as (row delta, column delta).
pub type Step = (isize, isize);

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Step),
    Select,
    Hint,
    Restart,
    Quit,
    None,
}

/// Map key event to action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Move((-1, 0)),
        KeyCode::Down | KeyCode::Char('j') => Action::Move((1, 0)),
        KeyCode::Left | KeyCode::Char('h') => Action::Move((0, -1)),
        KeyCode::Right | KeyCode::Char('l') => Action::Move((0, 1)),
        KeyCode::Char('y') => Action::Move((-1, -1)),
        KeyCode::Char('u') => Action::Move((-1, 1)),
        KeyCode::Char('b') => Action::Move((1, -1)),
        KeyCode::Char('n') => Action::Move((1, 1)),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('?') => Action::Hint,
        KeyCode::Char('r' | 'R') => Action::Restart,
        _ => Action::None,
    }
}
