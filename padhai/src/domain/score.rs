use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Date, UtcOffset};

use super::{ChapterId, ScoreId, Timestamp};

/// Backend-assigned classification of a chapter score. The thresholds live on
/// the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Weak,
    Average,
    Strong,
}

impl PerformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Weak => "weak",
            PerformanceLevel::Average => "average",
            PerformanceLevel::Strong => "strong",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One performance measurement of a chapter together with its target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: ScoreId,
    pub score_percentage: u8,
    pub performance_level: PerformanceLevel,
    pub deadline: Timestamp,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub chapter_id: Option<ChapterId>,
    #[serde(default)]
    pub chapter_name: Option<String>,
}

impl Score {
    /// Whole days until the deadline, never negative.
    pub fn days_left(&self, today: Date, offset: UtcOffset) -> i64 {
        days_left(self.deadline.date_at(offset), today)
    }
}

/// Score lists are ordered newest first; the head is the chapter's current
/// score and the rest is history.
pub fn latest_score(scores: &[Score]) -> Option<&Score> {
    scores.first()
}

pub fn days_left(deadline: Date, today: Date) -> i64 {
    (deadline - today).whole_days().max(0)
}

/// Adding and updating a score are separate operations; which one applies
/// depends only on whether the chapter already has a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAction {
    Add,
    Update,
}

impl ScoreAction {
    pub fn for_latest(latest: Option<&Score>) -> Self {
        match latest {
            None => ScoreAction::Add,
            Some(_) => ScoreAction::Update,
        }
    }
}

/// Study advice derived from the current score of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterInsight {
    NotEvaluated,
    HighPriority,
    NeedsPractice,
    OnTrack,
}

impl ChapterInsight {
    pub fn from_score(score: Option<u8>) -> Self {
        match score {
            None => ChapterInsight::NotEvaluated,
            Some(s) if s < 40 => ChapterInsight::HighPriority,
            Some(s) if s < 70 => ChapterInsight::NeedsPractice,
            Some(_) => ChapterInsight::OnTrack,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ChapterInsight::NotEvaluated => "Add score to unlock insights",
            ChapterInsight::HighPriority => "High priority chapter",
            ChapterInsight::NeedsPractice => "Needs focused practice",
            ChapterInsight::OnTrack => "On track",
        }
    }
}
