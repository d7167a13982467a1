use serde::{Deserialize, Serialize};

use super::{lenient, ChapterId, SubjectId};

/// Per-subject score distribution, computed server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    #[serde(default, deserialize_with = "lenient::count")]
    pub weak: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub average: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub strong: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub average_percentage: f64,
}

impl ScoreSummary {
    pub fn scored_chapters(&self) -> u32 {
        self.weak + self.average + self.strong
    }
}

/// A named group of chapters.
///
/// `chapter_count` and `pending_revisions` come with the subject list;
/// `score_summary` is fetched per subject and merged in by
/// [`crate::batch::fetch_subjects_with_summaries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub chapter_count: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub pending_revisions: u32,
    #[serde(default)]
    pub score_summary: ScoreSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub name: String,
}
