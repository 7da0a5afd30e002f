use blockmark_engine::document::BlockKind;
use blockmark_engine::{Key, KeyEvent, Modifiers};
use crossterm::event::{self, KeyCode, KeyModifiers};

/// What a terminal key press means to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Save,
    Export,
    ToggleBlock(BlockKind),
    /// Handed to the editor.
    Edit(KeyEvent),
    Ignore,
}

/// App bindings first, then anything the editor understands.
pub fn action_for(key: event::KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Char('q') if ctrl => return Action::Quit,
        KeyCode::Char('s') if ctrl => return Action::Save,
        KeyCode::Char('e') if ctrl => return Action::Export,
        KeyCode::Char(c) if alt => {
            if let Some(kind) = block_for(c) {
                return Action::ToggleBlock(kind);
            }
        }
        _ => {}
    }

    let Some(code) = editor_key(key.code) else {
        return Action::Ignore;
    };
    Action::Edit(KeyEvent {
        key: code,
        modifiers: Modifiers {
            shift: key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::BackTab,
            ctrl,
            alt,
        },
    })
}

fn block_for(c: char) -> Option<BlockKind> {
    Some(match c {
        '0' | 'p' => BlockKind::Paragraph,
        '1' => BlockKind::heading(1),
        '2' => BlockKind::heading(2),
        '3' => BlockKind::heading(3),
        'q' => BlockKind::Quote,
        'b' => BlockKind::BulletList,
        'n' => BlockKind::NumberedList,
        'c' => BlockKind::code_block(""),
        _ => return None,
    })
}

fn editor_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        action_for(event::KeyEvent::new(code, modifiers))
    }

    #[test]
    fn app_bindings_take_precedence() {
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), Action::Quit);
        assert_eq!(press(KeyCode::Char('s'), KeyModifiers::CONTROL), Action::Save);
        assert_eq!(press(KeyCode::Char('e'), KeyModifiers::CONTROL), Action::Export);
        assert_eq!(
            press(KeyCode::Char('2'), KeyModifiers::ALT),
            Action::ToggleBlock(BlockKind::heading(2))
        );
    }

    #[test]
    fn plain_characters_go_to_the_editor() {
        assert_eq!(
            press(KeyCode::Char('#'), KeyModifiers::SHIFT),
            Action::Edit(KeyEvent::new(Key::Char('#')).shift())
        );
    }

    #[test]
    fn back_tab_is_shift_tab() {
        assert_eq!(
            press(KeyCode::BackTab, KeyModifiers::NONE),
            Action::Edit(KeyEvent::new(Key::Tab).shift())
        );
    }

    #[test]
    fn ctrl_backspace_keeps_its_modifier() {
        assert_eq!(
            press(KeyCode::Backspace, KeyModifiers::CONTROL),
            Action::Edit(KeyEvent::new(Key::Backspace).ctrl())
        );
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(press(KeyCode::F(5), KeyModifiers::NONE), Action::Ignore);
    }
}
