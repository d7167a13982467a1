use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_confirm_complete_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            // Close before queueing; a repeated key must not complete twice.
            if let Some(revision) = app.confirm.take() {
                app.navigate_to(View::Calendar);
                enqueue_action(
                    action_tx,
                    Action::CompleteRevision {
                        label: format!("{} · {}", revision.subject_name, revision.chapter_name),
                        id: revision.id,
                    },
                );
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_completion(),
        _ => {}
    }
}
