use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_calendar_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1),
        KeyCode::Up => app.move_cursor(-7),
        KeyCode::Down => app.move_cursor(7),
        KeyCode::Char('[') => app.shift_month(-1),
        KeyCode::Char(']') => app.shift_month(1),
        KeyCode::Char('t') | KeyCode::Char('T') => app.cursor_to_today(),
        KeyCode::Char('j') | KeyCode::Tab => app.select_next_revision(),
        KeyCode::Char('k') | KeyCode::BackTab => app.select_previous_revision(),
        KeyCode::Enter => app.request_completion(),
        KeyCode::Char('r') | KeyCode::Char('R') => {
            enqueue_action(action_tx, Action::LoadRevisions { fresh: true });
        }
        _ => {}
    }
}
