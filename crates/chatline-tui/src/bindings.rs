//! Maps terminal events onto conversation actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::surface::ChatState;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Clear,
    Quit,
    ScrollUp(u16),
    ScrollDown(u16),
    Edit(Edit),
    Tick,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

pub fn action_for(event: &AppEvent, state: &ChatState) -> Action {
    match event {
        AppEvent::Key(key) => action_for_key(key, state),
        AppEvent::Mouse(mouse) => action_for_mouse(mouse, state),
        AppEvent::Tick => Action::Tick,
    }
}

fn action_for_key(key: &KeyEvent, state: &ChatState) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let page = state.chat_height.saturating_sub(1).max(1);

    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('l') if ctrl => Action::Clear,
        KeyCode::Esc => Action::Quit,

        // Shift+Enter would insert a newline; the input is a single line
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => Action::Nothing,
        KeyCode::Enter => Action::Submit,

        KeyCode::PageUp => Action::ScrollUp(page),
        KeyCode::PageDown => Action::ScrollDown(page),
        KeyCode::Up => Action::ScrollUp(1),
        KeyCode::Down => Action::ScrollDown(1),

        KeyCode::Backspace => Action::Edit(Edit::Backspace),
        KeyCode::Delete => Action::Edit(Edit::Delete),
        KeyCode::Left => Action::Edit(Edit::Left),
        KeyCode::Right => Action::Edit(Edit::Right),
        KeyCode::Home => Action::Edit(Edit::Home),
        KeyCode::End => Action::Edit(Edit::End),
        KeyCode::Char(c) if !ctrl => Action::Edit(Edit::Insert(c)),
        _ => Action::Nothing,
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Option<Rect>) -> bool {
    rect.is_some_and(|r| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height)
}

fn action_for_mouse(mouse: &MouseEvent, state: &ChatState) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if point_in_rect(mouse.column, mouse.row, state.send_area) {
                Action::Submit
            } else if point_in_rect(mouse.column, mouse.row, state.clear_area) {
                Action::Clear
            } else {
                Action::Nothing
            }
        }
        MouseEventKind::ScrollUp => Action::ScrollUp(WHEEL_LINES),
        MouseEventKind::ScrollDown => Action::ScrollDown(WHEEL_LINES),
        _ => Action::Nothing,
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Apply an editing key to the input line. Ignored while the input is disabled.
pub fn apply_edit(state: &mut ChatState, edit: Edit) {
    if !state.input_enabled {
        return;
    }

    let char_count = state.input.chars().count();
    match edit {
        Edit::Insert(c) => {
            let byte_pos = char_to_byte_index(&state.input, state.cursor);
            state.input.insert(byte_pos, c);
            state.cursor += 1;
        }
        Edit::Backspace => {
            if state.cursor > 0 {
                state.cursor -= 1;
                let byte_pos = char_to_byte_index(&state.input, state.cursor);
                state.input.remove(byte_pos);
            }
        }
        Edit::Delete => {
            if state.cursor < char_count {
                let byte_pos = char_to_byte_index(&state.input, state.cursor);
                state.input.remove(byte_pos);
            }
        }
        Edit::Left => state.cursor = state.cursor.saturating_sub(1),
        Edit::Right => state.cursor = (state.cursor + 1).min(char_count),
        Edit::Home => state.cursor = 0,
        Edit::End => state.cursor = char_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_enter_submits_but_shift_enter_does_not() {
        let state = ChatState::default();
        assert_eq!(action_for(&key(KeyCode::Enter, KeyModifiers::NONE), &state), Action::Submit);
        assert_eq!(action_for(&key(KeyCode::Enter, KeyModifiers::SHIFT), &state), Action::Nothing);
    }

    #[test]
    fn test_control_keys() {
        let state = ChatState::default();
        assert_eq!(action_for(&key(KeyCode::Char('l'), KeyModifiers::CONTROL), &state), Action::Clear);
        assert_eq!(action_for(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), &state), Action::Quit);
        assert_eq!(
            action_for(&key(KeyCode::Char('l'), KeyModifiers::NONE), &state),
            Action::Edit(Edit::Insert('l'))
        );
    }

    #[test]
    fn test_button_clicks() {
        let state = ChatState {
            send_area: Some(Rect::new(60, 20, 10, 3)),
            clear_area: Some(Rect::new(70, 20, 10, 3)),
            ..ChatState::default()
        };
        assert_eq!(action_for(&click(61, 21), &state), Action::Submit);
        assert_eq!(action_for(&click(79, 22), &state), Action::Clear);
        assert_eq!(action_for(&click(80, 22), &state), Action::Nothing);
        assert_eq!(action_for(&click(5, 5), &ChatState::default()), Action::Nothing);
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut state = ChatState::default();
        for c in "héllo".chars() {
            apply_edit(&mut state, Edit::Insert(c));
        }
        apply_edit(&mut state, Edit::Home);
        apply_edit(&mut state, Edit::Right);
        apply_edit(&mut state, Edit::Delete);
        assert_eq!(state.input, "hllo");
        apply_edit(&mut state, Edit::End);
        apply_edit(&mut state, Edit::Backspace);
        assert_eq!(state.input, "hll");
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn test_disabled_input_ignores_edits() {
        let mut state = ChatState {
            input_enabled: false,
            ..ChatState::default()
        };
        apply_edit(&mut state, Edit::Insert('x'));
        assert!(state.input.is_empty());
    }
}
