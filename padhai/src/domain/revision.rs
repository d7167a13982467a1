use serde::{Deserialize, Serialize};

use super::{RevisionId, Timestamp};

/// One scheduled spaced-repetition review of a chapter.
///
/// The status (completed, missed, pending) is never stored; it is derived from
/// `completed`, `revision_date` and the current day, see
/// [`crate::calendar::classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub revision_date: Timestamp,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub chapter_name: String,
    #[serde(default)]
    pub subject_name: String,
}
