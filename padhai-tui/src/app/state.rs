use padhai::batch::{Batch, QueryState};
use padhai::calendar::{is_selectable, DayKey, RevisionIndex};
use padhai::domain::{Chapter, ChapterId, Score, Subject};
use time::{Date, Duration};

/// Days the cursor may skip over while looking for a selectable day.
const MAX_SKIP: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Dashboard,
    Calendar,
    ConfirmComplete,
    Subjects,
    Chapters,
}

/// Cursor over the month grid plus the highlighted revision of that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarState {
    pub cursor: DayKey,
    pub selected_revision: usize,
}

impl CalendarState {
    pub fn new(today: DayKey) -> Self {
        Self {
            cursor: today,
            selected_revision: 0,
        }
    }

    /// Step the cursor by `days` until it lands on a selectable day. Returns
    /// false and leaves the cursor alone when there is none in that direction.
    pub fn move_by(&mut self, days: i64, index: &RevisionIndex, today: DayKey) -> bool {
        let mut candidate = self.cursor;
        for _ in 0..MAX_SKIP {
            candidate = candidate.add_days(days);
            if is_selectable(candidate, index, today) {
                self.set_cursor(candidate);
                return true;
            }
        }
        false
    }

    /// Jump to the same day of another month, or the nearest selectable day
    /// within that month.
    pub fn shift_month(&mut self, months: i32, index: &RevisionIndex, today: DayKey) -> bool {
        let mut first = first_of_month(self.cursor.date());
        for _ in 0..months.unsigned_abs() {
            first = if months > 0 {
                next_month(first)
            } else {
                first_of_month(first - Duration::days(1))
            };
        }

        let len = (next_month(first) - first).whole_days();
        let wanted = i64::from(self.cursor.date().day()).min(len) - 1;
        let forward = (wanted..len).chain((0..wanted).rev());
        for offset in forward {
            let day = DayKey::new(first + Duration::days(offset));
            if is_selectable(day, index, today) {
                self.set_cursor(day);
                return true;
            }
        }
        false
    }

    pub fn set_cursor(&mut self, day: DayKey) {
        if day != self.cursor {
            self.cursor = day;
            self.selected_revision = 0;
        }
    }

    pub fn month_start(&self) -> Date {
        first_of_month(self.cursor.date())
    }
}

pub fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

pub fn next_month(date: Date) -> Date {
    first_of_month(first_of_month(date) + Duration::days(31))
}

/// Chapter list of one subject with the latest score of each chapter.
#[derive(Debug, Clone)]
pub struct ChapterPanel {
    pub subject: Subject,
    pub chapters: QueryState<Vec<Chapter>>,
    pub scores: Batch<ChapterId, Option<Score>>,
    pub selected: usize,
}

impl ChapterPanel {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            chapters: QueryState::Loading,
            scores: Batch::pending(Vec::new()),
            selected: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.chapters.is_loading() || self.scores.is_loading()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.ready().map_or(0, Vec::len)
    }
}
