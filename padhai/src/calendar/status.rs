use std::fmt;

use super::ReferenceTime;
use crate::domain::Revision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionStatus {
    Completed,
    Missed,
    Pending,
}

impl RevisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionStatus::Completed => "completed",
            RevisionStatus::Missed => "missed",
            RevisionStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a revision's status.
///
/// Completion wins over the date, so a completed revision dated in the future
/// is still `Completed`. An open revision dated today is `Pending`; only days
/// strictly before today count as missed.
pub fn classify(revision: &Revision, reference: &ReferenceTime) -> RevisionStatus {
    if revision.completed {
        RevisionStatus::Completed
    } else if reference.day_of(&revision.revision_date) < reference.today() {
        RevisionStatus::Missed
    } else {
        RevisionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RevisionId, Timestamp};
    use time::macros::{date, datetime, offset};
    use time::Duration;

    fn reference() -> ReferenceTime {
        ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC))
    }

    fn revision(days_from_today: i64, completed: bool) -> Revision {
        Revision {
            id: RevisionId::new(format!("r{days_from_today}")),
            revision_date: Timestamp::Day(date!(2026 - 10 - 17) + Duration::days(days_from_today)),
            completed,
            chapter_name: "Waves".to_string(),
            subject_name: "Physics".to_string(),
        }
    }

    #[test]
    fn completed_wins_regardless_of_date() {
        for days in [-30, -1, 0, 1, 30] {
            assert_eq!(
                classify(&revision(days, true), &reference()),
                RevisionStatus::Completed
            );
        }
    }

    #[test]
    fn open_past_revisions_are_missed() {
        for days in [-365, -2, -1] {
            assert_eq!(
                classify(&revision(days, false), &reference()),
                RevisionStatus::Missed
            );
        }
    }

    #[test]
    fn open_revisions_from_today_on_are_pending() {
        for days in [0, 1, 90] {
            assert_eq!(
                classify(&revision(days, false), &reference()),
                RevisionStatus::Pending
            );
        }
    }

    #[test]
    fn late_evening_today_is_not_missed() {
        let r = Revision {
            revision_date: Timestamp::At(datetime!(2026-10-17 23:59 UTC)),
            ..revision(0, false)
        };
        assert_eq!(classify(&r, &reference()), RevisionStatus::Pending);
    }
}
