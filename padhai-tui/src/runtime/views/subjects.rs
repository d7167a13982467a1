use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_subjects_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if app.current_view == View::Chapters {
        handle_chapters_key(key, app, action_tx);
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next_subject(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_subject(),
        KeyCode::Enter => {
            if let Some(subject) = app.selected_subject().cloned() {
                app.open_chapter_panel(subject);
                enqueue_action(action_tx, Action::LoadChapters);
            }
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            enqueue_action(action_tx, Action::LoadSubjects { fresh: true });
        }
        _ => {}
    }
}

fn handle_chapters_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next_chapter(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_chapter(),
        KeyCode::Esc | KeyCode::Backspace => app.close_chapter_panel(),
        KeyCode::Char('r') | KeyCode::Char('R') => {
            enqueue_action(action_tx, Action::LoadChapters);
        }
        _ => {}
    }
}
