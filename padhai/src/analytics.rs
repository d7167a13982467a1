//! Folding the revision list into dashboard and profile figures.

use crate::calendar::{classify, ReferenceTime, RevisionStatus};
use crate::domain::Revision;

/// Today's focus shows at most this many revisions.
pub const TODAYS_FOCUS_LIMIT: usize = 3;

/// Revision counts by bucket.
///
/// Open revisions dated today form their own `due_today` bucket; `upcoming`
/// only holds open revisions dated strictly after today. The four buckets add
/// up to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionStats {
    pub completed: usize,
    pub missed: usize,
    pub due_today: usize,
    pub upcoming: usize,
    pub total: usize,
    pub completion_rate: u8,
}

impl RevisionStats {
    pub fn compute(revisions: &[Revision], reference: &ReferenceTime) -> Self {
        let today = reference.today();
        let mut stats = Self::default();

        for revision in revisions {
            match classify(revision, reference) {
                RevisionStatus::Completed => stats.completed += 1,
                RevisionStatus::Missed => stats.missed += 1,
                RevisionStatus::Pending if reference.day_of(&revision.revision_date) == today => {
                    stats.due_today += 1
                }
                RevisionStatus::Pending => stats.upcoming += 1,
            }
        }

        stats.total = stats.completed + stats.missed + stats.due_today + stats.upcoming;
        stats.completion_rate = completion_rate(stats.completed, stats.total);
        stats
    }

    pub fn insight(&self) -> ConsistencyInsight {
        ConsistencyInsight::from_rate(self.completion_rate)
    }
}

/// `round(100 * completed / total)`, or 0 for an empty list. Halves round up.
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rate = (200 * completed + total) / (2 * total);
    rate.min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyInsight {
    Excellent,
    GoodProgress,
    NeedsConsistency,
    StartSmall,
}

impl ConsistencyInsight {
    pub fn from_rate(rate: u8) -> Self {
        match rate {
            80..=u8::MAX => ConsistencyInsight::Excellent,
            60..=79 => ConsistencyInsight::GoodProgress,
            40..=59 => ConsistencyInsight::NeedsConsistency,
            _ => ConsistencyInsight::StartSmall,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConsistencyInsight::Excellent => "Excellent consistency",
            ConsistencyInsight::GoodProgress => "Good progress",
            ConsistencyInsight::NeedsConsistency => "Needs consistency",
            ConsistencyInsight::StartSmall => "Let's start small today",
        }
    }
}

/// Everything the dashboard renders from the revision list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub stats: RevisionStats,
    /// Open revisions dated exactly today, input order.
    pub todays_revisions: Vec<Revision>,
    /// Open revisions dated strictly after today, input order.
    pub upcoming_revisions: Vec<Revision>,
}

impl Dashboard {
    pub fn compute(revisions: &[Revision], reference: &ReferenceTime) -> Self {
        let today = reference.today();
        let mut todays_revisions = Vec::new();
        let mut upcoming_revisions = Vec::new();

        for revision in revisions {
            if classify(revision, reference) != RevisionStatus::Pending {
                continue;
            }
            if reference.day_of(&revision.revision_date) == today {
                todays_revisions.push(revision.clone());
            } else {
                upcoming_revisions.push(revision.clone());
            }
        }

        Self {
            stats: RevisionStats::compute(revisions, reference),
            todays_revisions,
            upcoming_revisions,
        }
    }

    pub fn todays_focus(&self) -> &[Revision] {
        let n = self.todays_revisions.len().min(TODAYS_FOCUS_LIMIT);
        &self.todays_revisions[..n]
    }

    pub fn next_upcoming(&self) -> Option<&Revision> {
        self.upcoming_revisions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RevisionId, Timestamp};
    use time::macros::{date, offset};
    use time::Duration;

    fn reference() -> ReferenceTime {
        ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC))
    }

    fn revision(id: &str, days_from_today: i64, completed: bool) -> Revision {
        Revision {
            id: RevisionId::new(id),
            revision_date: Timestamp::Day(date!(2026 - 10 - 17) + Duration::days(days_from_today)),
            completed,
            chapter_name: format!("chapter {id}"),
            subject_name: "Biology".to_string(),
        }
    }

    #[test]
    fn empty_list_has_zero_rate() {
        let stats = RevisionStats::compute(&[], &reference());
        assert_eq!(stats, RevisionStats::default());
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn yesterday_today_tomorrow_scenario() {
        let revisions = vec![
            revision("y", -1, false),
            revision("t", 0, false),
            revision("m", 1, true),
        ];
        let stats = RevisionStats::compute(&revisions, &reference());
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.missed, 1);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.upcoming, 0);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn completion_rate_rounds_half_up() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13); // 12.5
        assert_eq!(completion_rate(5, 5), 100);
        for total in 1..50usize {
            for completed in 0..=total {
                let expected = (100.0 * completed as f64 / total as f64).round() as u8;
                assert_eq!(completion_rate(completed, total), expected);
            }
        }
    }

    #[test]
    fn buckets_add_up_to_total() {
        let revisions: Vec<_> = (-6..6)
            .map(|d| revision(&format!("r{d}"), d, d % 3 == 0))
            .collect();
        let stats = RevisionStats::compute(&revisions, &reference());
        assert_eq!(
            stats.completed + stats.missed + stats.due_today + stats.upcoming,
            revisions.len()
        );
        assert_eq!(stats.total, revisions.len());
    }

    #[test]
    fn dashboard_separates_today_from_upcoming() {
        let revisions = vec![
            revision("t1", 0, false),
            revision("u1", 2, false),
            revision("t2", 0, false),
            revision("done", 0, true),
            revision("t3", 0, false),
            revision("t4", 0, false),
            revision("u2", 5, false),
            revision("old", -2, false),
        ];
        let dashboard = Dashboard::compute(&revisions, &reference());

        let today: Vec<_> = dashboard.todays_revisions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(today, vec!["t1", "t2", "t3", "t4"]);
        assert_eq!(dashboard.todays_focus().len(), TODAYS_FOCUS_LIMIT);
        assert_eq!(
            dashboard.next_upcoming().map(|r| r.id.as_str()),
            Some("u1")
        );
        assert_eq!(dashboard.upcoming_revisions.len(), dashboard.stats.upcoming);
        assert_eq!(dashboard.todays_revisions.len(), dashboard.stats.due_today);
    }

    #[test]
    fn insight_thresholds() {
        assert_eq!(ConsistencyInsight::from_rate(100), ConsistencyInsight::Excellent);
        assert_eq!(ConsistencyInsight::from_rate(80), ConsistencyInsight::Excellent);
        assert_eq!(ConsistencyInsight::from_rate(79), ConsistencyInsight::GoodProgress);
        assert_eq!(ConsistencyInsight::from_rate(40), ConsistencyInsight::NeedsConsistency);
        assert_eq!(ConsistencyInsight::from_rate(39), ConsistencyInsight::StartSmall);
    }
}
