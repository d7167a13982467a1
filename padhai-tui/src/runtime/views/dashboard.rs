use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_dashboard_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => {
            enqueue_action(action_tx, Action::LoadRevisions { fresh: true });
        }
        KeyCode::Enter => {
            app.cursor_to_today();
            app.navigate_to(View::Calendar);
        }
        _ => {}
    }
}
