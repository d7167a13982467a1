use padhai::batch::{fetch_chapter_scores, fetch_subjects_with_summaries, QueryState};
use padhai::cache::{CachedStudyApi, QueryKey};
use padhai::domain::RevisionId;
use padhai::StudyApi;
use tracing::{debug, info};

use crate::app::App;

use super::action_queue::{Action, ActionTx};

pub(super) async fn run_action<A: StudyApi>(
    action: Action,
    app: &mut App,
    api: &CachedStudyApi<A>,
    action_tx: &ActionTx,
) {
    debug!(?action, "running action");
    match action {
        Action::LoadRevisions { fresh } => load_revisions(app, api, fresh).await,
        Action::CompleteRevision { id, label } => {
            complete_revision(app, api, id, &label, action_tx).await
        }
        Action::LoadSubjects { fresh } => load_subjects(app, api, fresh).await,
        Action::LoadChapters => load_chapters(app, api, action_tx).await,
        Action::LoadChapterScores => load_chapter_scores(app, api).await,
    }
}

async fn load_revisions<A: StudyApi>(app: &mut App, api: &CachedStudyApi<A>, fresh: bool) {
    if fresh {
        api.invalidate(&QueryKey::Revisions);
    }
    if app.revisions.is_error() {
        app.revisions = QueryState::Loading;
    }
    // the session may have crossed midnight since the last load
    app.refresh_reference();
    match api.revisions().await {
        Ok(revisions) => app.set_revisions(revisions),
        Err(e) => app.set_revisions_failed(&e),
    }
}

async fn complete_revision<A: StudyApi>(
    app: &mut App,
    api: &CachedStudyApi<A>,
    id: RevisionId,
    label: &str,
    action_tx: &ActionTx,
) {
    match api.complete_revision(&id).await {
        Ok(()) => {
            info!(revision = %id, "revision completed");
            app.set_status(format!("Marked {label} as completed"));
            let _ = action_tx.send(Action::LoadRevisions { fresh: false });
        }
        Err(e) => app.handle_api_error("Could not complete revision", &e),
    }
}

async fn load_subjects<A: StudyApi>(app: &mut App, api: &CachedStudyApi<A>, fresh: bool) {
    if fresh {
        api.invalidate(&QueryKey::Subjects);
        if let Some(subjects) = app.subjects.ready() {
            for subject in subjects {
                api.invalidate(&QueryKey::SubjectSummary(subject.id.clone()));
            }
        }
    }
    if app.subjects.is_error() {
        app.subjects = QueryState::Loading;
    }
    match fetch_subjects_with_summaries(api).await {
        Ok(subjects) => app.set_subjects(subjects),
        Err(e) => {
            if !e.is_unauthorized() {
                app.subjects = QueryState::Failed(e.to_string());
            }
            app.handle_api_error("Could not load subjects", &e);
        }
    }
}

async fn load_chapters<A: StudyApi>(
    app: &mut App,
    api: &CachedStudyApi<A>,
    action_tx: &ActionTx,
) {
    let Some(subject) = app.chapter_panel.as_ref().map(|p| p.subject.id.clone()) else {
        return;
    };
    match api.chapters(&subject).await {
        Ok(chapters) => {
            app.set_chapters(chapters);
            let _ = action_tx.send(Action::LoadChapterScores);
        }
        Err(e) => {
            if let Some(panel) = app.chapter_panel.as_mut() {
                panel.chapters = QueryState::Failed(e.to_string());
            }
            app.handle_api_error("Could not load chapters", &e);
        }
    }
}

async fn load_chapter_scores<A: StudyApi>(app: &mut App, api: &CachedStudyApi<A>) {
    let Some((subject, chapters)) = app.chapter_panel.as_ref().and_then(|panel| {
        panel
            .chapters
            .ready()
            .map(|chapters| (panel.subject.id.clone(), chapters.clone()))
    }) else {
        return;
    };

    let scores = fetch_chapter_scores(api, &subject, &chapters).await;
    if scores.is_error() {
        app.set_status("Some chapter scores could not be loaded");
    }
    app.set_chapter_scores(scores);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::View;
    use padhai::calendar::ReferenceTime;
    use padhai::MemoryStudyApi;
    use std::time::Duration;
    use time::macros::{date, offset};

    use super::super::action_queue::channel;

    fn setup() -> (MemoryStudyApi, CachedStudyApi<MemoryStudyApi>, App) {
        let backend = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let api = CachedStudyApi::new(backend.clone(), Duration::from_secs(300));
        let app = App::new(ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC)));
        (backend, api, app)
    }

    #[tokio::test]
    async fn completing_refetches_revisions() {
        let (backend, api, mut app) = setup();
        let (tx, mut rx) = channel();

        run_action(Action::LoadRevisions { fresh: true }, &mut app, &api, &tx).await;
        assert_eq!(app.dashboard.stats.due_today, 2);

        app.navigate_to(View::Calendar);
        app.request_completion();
        let revision = app.confirm.take().unwrap();
        let action = Action::CompleteRevision {
            id: revision.id,
            label: "Physics · Optics".to_string(),
        };
        run_action(action, &mut app, &api, &tx).await;
        assert_eq!(
            app.status_message.as_deref(),
            Some("Marked Physics · Optics as completed")
        );

        let follow_up = rx.try_recv().unwrap();
        assert!(matches!(follow_up, Action::LoadRevisions { fresh: false }));
        run_action(follow_up, &mut app, &api, &tx).await;

        assert_eq!(app.dashboard.stats.due_today, 1);
        assert_eq!(backend.calls("revisions"), 2);
    }

    #[tokio::test]
    async fn calendar_reuses_cached_revisions() {
        let (backend, api, mut app) = setup();
        let (tx, _rx) = channel();

        run_action(Action::LoadRevisions { fresh: true }, &mut app, &api, &tx).await;
        run_action(Action::LoadRevisions { fresh: false }, &mut app, &api, &tx).await;
        assert_eq!(backend.calls("revisions"), 1);

        run_action(Action::LoadRevisions { fresh: true }, &mut app, &api, &tx).await;
        assert_eq!(backend.calls("revisions"), 2);
    }

    #[tokio::test]
    async fn loading_revisions_follows_the_clock() {
        let (_backend, api, mut app) = setup();
        let (tx, _rx) = channel();
        fn tomorrow() -> ReferenceTime {
            ReferenceTime::on(date!(2026 - 10 - 18), offset!(UTC))
        }
        app.clock = Some(tomorrow);

        run_action(Action::LoadRevisions { fresh: false }, &mut app, &api, &tx).await;
        assert_eq!(app.reference.today().date(), date!(2026 - 10 - 18));
        assert_eq!(app.calendar.cursor.date(), date!(2026 - 10 - 18));
        // yesterday's two open revisions are now missed
        assert_eq!(app.dashboard.stats.due_today, 1);
        assert_eq!(app.dashboard.stats.missed, 3);
    }

    #[tokio::test]
    async fn chapter_panel_loads_in_two_steps() {
        let (_backend, api, mut app) = setup();
        let (tx, mut rx) = channel();

        run_action(Action::LoadSubjects { fresh: false }, &mut app, &api, &tx).await;
        let physics = app.selected_subject().cloned().unwrap();
        assert_eq!(physics.score_summary.scored_chapters(), 2);

        app.open_chapter_panel(physics);
        run_action(Action::LoadChapters, &mut app, &api, &tx).await;
        assert!(app.is_loading());

        let next = rx.try_recv().unwrap();
        run_action(next, &mut app, &api, &tx).await;
        assert!(!app.is_loading());
        let panel = app.chapter_panel.as_ref().unwrap();
        assert_eq!(panel.chapter_count(), 3);
        assert!(!panel.scores.is_error());
    }

    #[tokio::test]
    async fn expired_session_stops_the_app() {
        let (backend, api, mut app) = setup();
        let (tx, _rx) = channel();
        backend.expire_session();

        run_action(Action::LoadRevisions { fresh: true }, &mut app, &api, &tx).await;
        assert!(app.session_expired);
        assert!(!app.running);
    }
}
