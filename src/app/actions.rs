use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SubmitPassphrase,
    Next,
    Previous,
    Select(usize),
    Open,
    Back,
    Replay,
    Skip,
    CycleTheme,
    CycleOccasion,
    ClearFilters,
    StartSearch,
    Lock,
}

fn plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

/// Maps a key press to an action for the given view. Text entry on the gate
/// and in the search prompt is handled before this is consulted.
pub fn action_for_key(view: View, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match view {
        View::Gate => match key.code {
            KeyCode::Enter => Some(Action::SubmitPassphrase),
            KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },
        View::Desk => match key.code {
            KeyCode::Char('q') if plain(&key) => Some(Action::Quit),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('j') | KeyCode::Down
                if plain(&key) =>
            {
                Some(Action::Next)
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('k') | KeyCode::Up
                if plain(&key) =>
            {
                Some(Action::Previous)
            }
            KeyCode::Char(digit @ '1'..='9') if plain(&key) => {
                digit.to_digit(10).map(|n| Action::Select(n as usize - 1))
            }
            KeyCode::Enter => Some(Action::Open),
            KeyCode::Char('t') if plain(&key) => Some(Action::CycleTheme),
            KeyCode::Char('o') if plain(&key) => Some(Action::CycleOccasion),
            KeyCode::Char('c') if plain(&key) => Some(Action::ClearFilters),
            KeyCode::Char('/') if plain(&key) => Some(Action::StartSearch),
            KeyCode::Char('L') => Some(Action::Lock),
            _ => None,
        },
        View::Letter => match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Char('q') if plain(&key) => Some(Action::Back),
            KeyCode::Char('r') if plain(&key) => Some(Action::Replay),
            KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Skip),
            KeyCode::Char('L') => Some(Action::Lock),
            _ => None,
        },
    }
}
