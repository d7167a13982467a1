use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action_queue::{Action, ActionTx};

mod calendar;
mod confirm_complete;
mod dashboard;
mod subjects;

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

/// Switch between the top-level screens. Returns true when the key was used.
fn handle_navigation_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('1') => {
            app.navigate_to(View::Dashboard);
            // The dashboard always shows a fresh revision list.
            enqueue_action(action_tx, Action::LoadRevisions { fresh: true });
        }
        KeyCode::Char('2') => {
            app.navigate_to(View::Calendar);
            enqueue_action(action_tx, Action::LoadRevisions { fresh: false });
        }
        KeyCode::Char('3') => {
            app.chapter_panel = None;
            app.navigate_to(View::Subjects);
            enqueue_action(action_tx, Action::LoadSubjects { fresh: false });
        }
        _ => return false,
    }
    app.clear_status();
    true
}

pub(super) fn handle_view_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if app.current_view == View::ConfirmComplete {
        confirm_complete::handle_confirm_complete_key(key, app, action_tx);
        return;
    }
    if handle_navigation_key(key, app, action_tx) {
        return;
    }
    match app.current_view {
        View::Dashboard => dashboard::handle_dashboard_key(key, app, action_tx),
        View::Calendar => calendar::handle_calendar_key(key, app, action_tx),
        View::Subjects | View::Chapters => subjects::handle_subjects_key(key, app, action_tx),
        View::ConfirmComplete => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padhai::calendar::ReferenceTime;
    use padhai::domain::{Revision, RevisionId, Timestamp};
    use time::macros::{date, offset};

    use super::super::action_queue::channel;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_today_revision() -> App {
        let mut app = App::new(ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC)));
        app.set_revisions(vec![Revision {
            id: RevisionId::new("r1"),
            revision_date: Timestamp::Day(date!(2026 - 10 - 17)),
            completed: false,
            chapter_name: "Optics".to_string(),
            subject_name: "Physics".to_string(),
        }]);
        app
    }

    #[test]
    fn dashboard_navigation_forces_a_refetch() {
        let mut app = app_with_today_revision();
        let (tx, mut rx) = channel();

        handle_view_key(press(KeyCode::Char('2')), &mut app, &tx);
        assert_eq!(app.current_view, View::Calendar);
        assert!(matches!(rx.try_recv(), Ok(Action::LoadRevisions { fresh: false })));

        handle_view_key(press(KeyCode::Char('1')), &mut app, &tx);
        assert_eq!(app.current_view, View::Dashboard);
        assert!(matches!(rx.try_recv(), Ok(Action::LoadRevisions { fresh: true })));
    }

    #[test]
    fn enter_then_confirm_enqueues_completion() {
        let mut app = app_with_today_revision();
        let (tx, mut rx) = channel();
        app.navigate_to(View::Calendar);

        handle_view_key(press(KeyCode::Enter), &mut app, &tx);
        assert_eq!(app.current_view, View::ConfirmComplete);

        // navigation keys are ignored while the dialog is open
        handle_view_key(press(KeyCode::Char('q')), &mut app, &tx);
        assert!(app.running);

        handle_view_key(press(KeyCode::Char('y')), &mut app, &tx);
        match rx.try_recv() {
            Ok(Action::CompleteRevision { id, label }) => {
                assert_eq!(id.as_str(), "r1");
                assert_eq!(label, "Physics · Optics");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.current_view, View::Calendar);
        assert!(app.confirm.is_none());
    }

    #[test]
    fn repeated_confirm_queues_one_completion() {
        let mut app = app_with_today_revision();
        let (tx, mut rx) = channel();
        app.navigate_to(View::Calendar);
        handle_view_key(press(KeyCode::Enter), &mut app, &tx);

        handle_view_key(press(KeyCode::Char('y')), &mut app, &tx);
        handle_view_key(press(KeyCode::Char('y')), &mut app, &tx);
        handle_view_key(press(KeyCode::Enter), &mut app, &tx);

        assert!(matches!(rx.try_recv(), Ok(Action::CompleteRevision { .. })));
        // the second 'y' lands on the calendar, Enter reopens the dialog
        assert!(rx.try_recv().is_err());
        assert_eq!(app.current_view, View::ConfirmComplete);
    }
}
