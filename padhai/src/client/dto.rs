use serde::{Deserialize, Serialize};

use crate::domain::{
    Chapter, Revision, Score, ScoreDraft, ScoreSummary, Subject, Timestamp, User,
};

#[derive(Deserialize)]
pub(super) struct MeResponse {
    pub user: User,
}

#[derive(Deserialize)]
pub(super) struct RevisionsResponse {
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Deserialize)]
pub(super) struct SubjectsResponse {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[derive(Deserialize)]
pub(super) struct SummaryResponse {
    #[serde(default)]
    pub summary: ScoreSummary,
}

#[derive(Deserialize)]
pub(super) struct ChaptersResponse {
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Deserialize)]
pub(super) struct ScoresResponse {
    #[serde(default)]
    pub scores: Vec<Score>,
}

/// Error bodies may carry a human readable `message`; anything else is ignored.
#[derive(Deserialize)]
pub(super) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Serialize)]
pub(super) struct NameRequest<'a> {
    pub name: &'a str,
}

#[derive(Serialize)]
pub(super) struct ScoreRequest {
    pub score_percentage: u8,
    pub deadline: Timestamp,
}

impl From<&ScoreDraft> for ScoreRequest {
    fn from(draft: &ScoreDraft) -> Self {
        Self {
            score_percentage: draft.score_percentage,
            deadline: draft.deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn score_request_body() {
        let draft = ScoreDraft::new(64, date!(2026 - 11 - 20)).unwrap();
        let body = serde_json::to_value(ScoreRequest::from(&draft)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "score_percentage": 64,
                "deadline": "2026-11-20T00:00:00Z"
            })
        );
    }

    #[test]
    fn envelopes_tolerate_missing_lists() {
        let r: RevisionsResponse = serde_json::from_str(r#"{ "message": "ok" }"#).unwrap();
        assert!(r.revisions.is_empty());
        let s: SummaryResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(s.summary, ScoreSummary::default());
    }
}
