use std::collections::BTreeMap;
use time::UtcOffset;

use super::DayKey;
use crate::domain::Revision;

/// Revisions grouped by the local calendar day they are scheduled on.
///
/// Days without revisions have no entry at all; [`RevisionIndex::on`] returns
/// an empty slice for them so callers never need to tell the two apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionIndex {
    by_day: BTreeMap<DayKey, Vec<Revision>>,
}

impl RevisionIndex {
    /// Group `revisions` by day. Same-day revisions keep their input order.
    pub fn build(revisions: &[Revision], offset: UtcOffset) -> Self {
        let mut by_day: BTreeMap<DayKey, Vec<Revision>> = BTreeMap::new();
        for revision in revisions {
            by_day
                .entry(DayKey::of(&revision.revision_date, offset))
                .or_default()
                .push(revision.clone());
        }
        Self { by_day }
    }

    pub fn on(&self, day: DayKey) -> &[Revision] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.by_day.contains_key(&day)
    }

    /// Days with at least one revision, in chronological order.
    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.by_day.keys().copied()
    }

    pub fn day_count(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RevisionId, Timestamp};
    use time::macros::{date, datetime, offset};

    fn revision(id: &str, date: Timestamp) -> Revision {
        Revision {
            id: RevisionId::new(id),
            revision_date: date,
            completed: false,
            chapter_name: format!("chapter {id}"),
            subject_name: "Physics".to_string(),
        }
    }

    #[test]
    fn groups_same_day_revisions_in_input_order() {
        let revisions = vec![
            revision("b", Timestamp::At(datetime!(2026-10-17 18:00 UTC))),
            revision("x", Timestamp::Day(date!(2026 - 10 - 18))),
            revision("a", Timestamp::At(datetime!(2026-10-17 6:00 UTC))),
        ];
        let index = RevisionIndex::build(&revisions, offset!(UTC));

        let ids: Vec<_> = index
            .on(DayKey::new(date!(2026 - 10 - 17)))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(index.day_count(), 2);
    }

    #[test]
    fn missing_days_have_no_entry() {
        let index = RevisionIndex::build(
            &[revision("a", Timestamp::Day(date!(2026 - 10 - 17)))],
            offset!(UTC),
        );
        let empty_day = DayKey::new(date!(2026 - 10 - 19));
        assert!(!index.contains(empty_day));
        assert!(index.on(empty_day).is_empty());
        assert!(RevisionIndex::default().is_empty());
    }

    #[test]
    fn every_revision_is_found_exactly_once_under_its_day() {
        let revisions: Vec<_> = (0..20)
            .map(|i| {
                let at = datetime!(2026-10-01 0:00 UTC) + time::Duration::hours(i * 7);
                revision(&format!("r{i}"), Timestamp::At(at))
            })
            .collect();
        let offset = offset!(-3);
        let index = RevisionIndex::build(&revisions, offset);

        for revision in &revisions {
            let day = DayKey::of(&revision.revision_date, offset);
            let hits = index.on(day).iter().filter(|r| r.id == revision.id).count();
            assert_eq!(hits, 1, "revision {} under {}", revision.id, day);
        }
        let total: usize = index.days().map(|d| index.on(d).len()).sum();
        assert_eq!(total, revisions.len());
    }

    #[test]
    fn days_are_chronological() {
        let revisions = vec![
            revision("late", Timestamp::Day(date!(2026 - 12 - 1))),
            revision("early", Timestamp::Day(date!(2026 - 1 - 1))),
        ];
        let index = RevisionIndex::build(&revisions, offset!(UTC));
        let days: Vec<_> = index.days().collect();
        assert_eq!(
            days,
            vec![
                DayKey::new(date!(2026 - 1 - 1)),
                DayKey::new(date!(2026 - 12 - 1))
            ]
        );
    }
}
