use super::{classify, DayKey, ReferenceTime, RevisionIndex, RevisionStatus};

/// Whether a calendar date can be picked.
///
/// Only past days without any revision are disabled. Today, future days and
/// past days that hold revisions (for review) stay selectable.
pub fn is_selectable(day: DayKey, index: &RevisionIndex, today: DayKey) -> bool {
    !(day < today && !index.contains(day))
}

/// Visual markers for one calendar cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayMarkers {
    pub selectable: bool,
    pub has_revision: bool,
    pub has_missed: bool,
}

impl DayMarkers {
    pub fn for_day(day: DayKey, index: &RevisionIndex, reference: &ReferenceTime) -> Self {
        let revisions = index.on(day);
        Self {
            selectable: is_selectable(day, index, reference.today()),
            has_revision: !revisions.is_empty(),
            has_missed: revisions
                .iter()
                .any(|r| classify(r, reference) == RevisionStatus::Missed),
        }
    }
}
