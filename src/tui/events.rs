use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    ClearSearch,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Submit,
    CopyToClipboard,
    ToggleSort,
    ToggleHistory,
    ToggleDetails,
    PrevPage,
    NextPage,
    DeleteEntry,
    ClearHistory,
    Refresh,
    UpdateSearch(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::ClearSearch,

        // Navigation (Vim/Emacs style)
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Left, _) => Action::PrevPage,
        (KeyCode::Right, _) => Action::NextPage,

        // Actions
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyToClipboard,
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::ToggleSort,
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => Action::ToggleDetails,
        (KeyCode::Tab, _) => Action::ToggleHistory,
        (KeyCode::Delete, _) => Action::DeleteEntry,
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => Action::ClearHistory,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Action::Refresh,

        // Search input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::UpdateSearch(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_quit_and_clear() {
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::ClearSearch);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(key_to_action(ctrl('p')), Action::MoveUp);
        assert_eq!(key_to_action(ctrl('n')), Action::MoveDown);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::MoveUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::MoveDown);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::PageDown);
    }

    #[test]
    fn test_history_paging_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::PrevPage);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::NextPage);
        assert_eq!(key_to_action(key(KeyCode::Delete)), Action::DeleteEntry);
        assert_eq!(key_to_action(ctrl('x')), Action::ClearHistory);
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(ctrl('y')), Action::CopyToClipboard);
        assert_eq!(key_to_action(ctrl('s')), Action::ToggleSort);
        assert_eq!(key_to_action(ctrl('o')), Action::ToggleDetails);
        assert_eq!(key_to_action(key(KeyCode::Tab)), Action::ToggleHistory);
        assert_eq!(key_to_action(ctrl('r')), Action::Refresh);
    }

    #[test]
    fn test_search_input() {
        assert_eq!(key_to_action(key(KeyCode::Char('m'))), Action::UpdateSearch('m'));
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT)),
            Action::UpdateSearch('M')
        );
        assert_eq!(key_to_action(key(KeyCode::Backspace)), Action::DeleteChar);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::None);
    }
}
