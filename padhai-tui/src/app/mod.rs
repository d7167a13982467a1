mod state;

pub use state::*;

use padhai::analytics::Dashboard;
use padhai::batch::{Batch, QueryState};
use padhai::calendar::{DayMarkers, DayKey, ReferenceTime, RevisionIndex};
use padhai::domain::{Chapter, ChapterId, Revision, Score, Subject, User};
use padhai::ApiError;

pub struct App {
    pub running: bool,
    pub current_view: View,
    pub status_message: Option<String>,
    /// Set when the backend rejected the session; the host sends the user back
    /// to login.
    pub session_expired: bool,

    pub reference: ReferenceTime,
    /// Source of `reference` for a long-running session. Without one the
    /// reference stays fixed.
    pub clock: Option<fn() -> ReferenceTime>,
    pub user: Option<User>,

    // Revisions and everything derived from them
    pub revisions: QueryState<Vec<Revision>>,
    pub index: RevisionIndex,
    pub dashboard: Dashboard,
    pub calendar: CalendarState,
    pub confirm: Option<Revision>,

    // Subjects
    pub subjects: QueryState<Vec<Subject>>,
    pub selected_subject: usize,
    pub chapter_panel: Option<ChapterPanel>,

    pub throbber_state: throbber_widgets_tui::ThrobberState,
}

impl App {
    pub fn new(reference: ReferenceTime) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            status_message: None,
            session_expired: false,
            reference,
            clock: None,
            user: None,
            revisions: QueryState::Loading,
            index: RevisionIndex::default(),
            dashboard: Dashboard::default(),
            calendar: CalendarState::new(reference.today()),
            confirm: None,
            subjects: QueryState::Loading,
            selected_subject: 0,
            chapter_panel: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    /// An app whose reference day follows `clock`.
    pub fn with_clock(clock: fn() -> ReferenceTime) -> Self {
        let mut app = Self::new(clock());
        app.clock = Some(clock);
        app
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn navigate_to(&mut self, view: View) {
        self.current_view = view;
    }

    /// Required fetches for the current view that have not resolved yet.
    pub fn is_loading(&self) -> bool {
        match self.current_view {
            View::Dashboard | View::Calendar | View::ConfirmComplete => {
                self.revisions.is_loading()
            }
            View::Subjects => self.subjects.is_loading(),
            View::Chapters => self
                .chapter_panel
                .as_ref()
                .is_some_and(ChapterPanel::is_loading),
        }
    }

    /// Surface a failed request. A rejected session ends the UI; anything else
    /// goes to the status line.
    pub fn handle_api_error(&mut self, context: &str, error: &ApiError) {
        if error.is_unauthorized() {
            self.session_expired = true;
            self.quit();
        } else {
            self.set_status(format!("{context}: {error}"));
        }
    }

    // ========================================================================
    // Revisions
    // ========================================================================

    pub fn set_revisions(&mut self, revisions: Vec<Revision>) {
        self.revisions = QueryState::Ready(revisions);
        self.rebuild_revision_views();
    }

    /// Re-read the clock, if any. See [`App::set_reference`].
    pub fn refresh_reference(&mut self) {
        if let Some(clock) = self.clock {
            self.set_reference(clock());
        }
    }

    /// Move to a new reference day. Statuses, the dashboard and the calendar
    /// gate are recomputed; a cursor that sat on the old today follows it.
    pub fn set_reference(&mut self, reference: ReferenceTime) {
        if reference == self.reference {
            return;
        }
        if self.calendar.cursor == self.reference.today() {
            self.calendar.set_cursor(reference.today());
        }
        self.reference = reference;
        self.rebuild_revision_views();
    }

    fn rebuild_revision_views(&mut self) {
        let revisions = self.revisions.ready().map_or(&[][..], Vec::as_slice);
        self.index = RevisionIndex::build(revisions, self.reference.offset());
        self.dashboard = Dashboard::compute(revisions, &self.reference);

        let count = self.selected_day_revisions().len();
        if self.calendar.selected_revision >= count {
            self.calendar.selected_revision = count.saturating_sub(1);
        }
    }

    pub fn set_revisions_failed(&mut self, error: &ApiError) {
        if !error.is_unauthorized() {
            self.revisions = QueryState::Failed(error.to_string());
        }
        self.handle_api_error("Could not load revisions", error);
    }

    pub fn day_markers(&self, day: DayKey) -> DayMarkers {
        DayMarkers::for_day(day, &self.index, &self.reference)
    }

    pub fn selected_day_revisions(&self) -> &[Revision] {
        self.index.on(self.calendar.cursor)
    }

    pub fn selected_revision(&self) -> Option<&Revision> {
        self.selected_day_revisions()
            .get(self.calendar.selected_revision)
    }

    pub fn move_cursor(&mut self, days: i64) {
        let today = self.reference.today();
        if !self.calendar.move_by(days, &self.index, today) {
            self.set_status("No earlier day with revisions");
        }
    }

    pub fn shift_month(&mut self, months: i32) {
        let today = self.reference.today();
        if !self.calendar.shift_month(months, &self.index, today) {
            self.set_status("No selectable day in that month");
        }
    }

    pub fn cursor_to_today(&mut self) {
        self.calendar.set_cursor(self.reference.today());
    }

    pub fn select_next_revision(&mut self) {
        let count = self.selected_day_revisions().len();
        if count > 0 {
            self.calendar.selected_revision = (self.calendar.selected_revision + 1) % count;
        }
    }

    pub fn select_previous_revision(&mut self) {
        let count = self.selected_day_revisions().len();
        if count > 0 {
            self.calendar.selected_revision =
                (self.calendar.selected_revision + count - 1) % count;
        }
    }

    /// Open the confirmation for the highlighted revision. Completed revisions
    /// cannot be completed again.
    pub fn request_completion(&mut self) {
        match self.selected_revision().cloned() {
            None => self.set_status("No revision on this day"),
            Some(revision) if revision.completed => {
                self.set_status("Revision is already completed")
            }
            Some(revision) => {
                self.confirm = Some(revision);
                self.navigate_to(View::ConfirmComplete);
            }
        }
    }

    pub fn cancel_completion(&mut self) {
        self.confirm = None;
        self.navigate_to(View::Calendar);
    }

    // ========================================================================
    // Subjects and chapters
    // ========================================================================

    pub fn set_subjects(&mut self, subjects: Vec<Subject>) {
        if self.selected_subject >= subjects.len() {
            self.selected_subject = subjects.len().saturating_sub(1);
        }
        self.subjects = QueryState::Ready(subjects);
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.subjects
            .ready()
            .and_then(|subjects| subjects.get(self.selected_subject))
    }

    pub fn select_next_subject(&mut self) {
        let count = self.subjects.ready().map_or(0, Vec::len);
        if count > 0 {
            self.selected_subject = (self.selected_subject + 1) % count;
        }
    }

    pub fn select_previous_subject(&mut self) {
        let count = self.subjects.ready().map_or(0, Vec::len);
        if count > 0 {
            self.selected_subject = (self.selected_subject + count - 1) % count;
        }
    }

    pub fn open_chapter_panel(&mut self, subject: Subject) {
        self.chapter_panel = Some(ChapterPanel::new(subject));
        self.navigate_to(View::Chapters);
    }

    pub fn close_chapter_panel(&mut self) {
        self.chapter_panel = None;
        self.navigate_to(View::Subjects);
    }

    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        if let Some(panel) = self.chapter_panel.as_mut() {
            panel.scores = Batch::pending(chapters.iter().map(|c| c.id.clone()));
            if panel.selected >= chapters.len() {
                panel.selected = chapters.len().saturating_sub(1);
            }
            panel.chapters = QueryState::Ready(chapters);
        }
    }

    pub fn set_chapter_scores(&mut self, scores: Batch<ChapterId, Option<Score>>) {
        if let Some(panel) = self.chapter_panel.as_mut() {
            panel.scores = scores;
        }
    }

    pub fn select_next_chapter(&mut self) {
        if let Some(panel) = self.chapter_panel.as_mut() {
            let count = panel.chapter_count();
            if count > 0 {
                panel.selected = (panel.selected + 1) % count;
            }
        }
    }

    pub fn select_previous_chapter(&mut self) {
        if let Some(panel) = self.chapter_panel.as_mut() {
            let count = panel.chapter_count();
            if count > 0 {
                panel.selected = (panel.selected + count - 1) % count;
            }
        }
    }
}
