//! Fan-out of same-shaped queries with per-item state.

use futures::future::join_all;
use tracing::warn;

use crate::client::{ApiError, StudyApi};
use crate::domain::{latest_score, Chapter, ChapterId, Score, ScoreSummary, Subject, SubjectId};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T, ApiError>> for QueryState<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => QueryState::Ready(value),
            Err(e) => QueryState::Failed(e.to_string()),
        }
    }
}

/// Per-key query states, kept in the order the keys were given.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<K, T> {
    entries: Vec<(K, QueryState<T>)>,
}

impl<K: PartialEq, T> Batch<K, T> {
    /// Every key in the loading state.
    pub fn pending(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            entries: keys.into_iter().map(|k| (k, QueryState::Loading)).collect(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.entries.iter().any(|(_, state)| state.is_loading())
    }

    pub fn is_error(&self) -> bool {
        self.entries.iter().any(|(_, state)| state.is_error())
    }

    pub fn get(&self, key: &K) -> Option<&QueryState<T>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, state)| state)
    }

    /// Replace the state of `key`. Unknown keys are ignored.
    pub fn set(&mut self, key: &K, state: QueryState<T>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = state;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &QueryState<T>)> {
        self.entries.iter().map(|(k, state)| (k, state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, T> FromIterator<(K, QueryState<T>)> for Batch<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, QueryState<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Latest score of every chapter, fetched concurrently. A chapter without any
/// score is `Ready(None)`.
pub async fn fetch_chapter_scores<A>(
    api: &A,
    subject: &SubjectId,
    chapters: &[Chapter],
) -> Batch<ChapterId, Option<Score>>
where
    A: StudyApi + ?Sized,
{
    let results = join_all(chapters.iter().map(|chapter| async move {
        let scores = api.chapter_scores(subject, &chapter.id).await;
        (chapter.id.clone(), scores)
    }))
    .await;

    results
        .into_iter()
        .map(|(id, scores)| {
            let state = QueryState::from(scores.map(|scores| latest_score(&scores).cloned()));
            (id, state)
        })
        .collect()
}

/// Subject list with each subject's score summary merged in. Summaries are
/// fetched concurrently; a failed one leaves that subject with an all-zero
/// summary.
pub async fn fetch_subjects_with_summaries<A>(api: &A) -> Result<Vec<Subject>, ApiError>
where
    A: StudyApi + ?Sized,
{
    let mut subjects = api.subjects().await?;
    let summaries = join_all(subjects.iter().map(|s| api.subject_summary(&s.id))).await;

    for (subject, summary) in subjects.iter_mut().zip(summaries) {
        subject.score_summary = summary.unwrap_or_else(|e| {
            warn!(subject = %subject.id, error = %e, "score summary unavailable");
            ScoreSummary::default()
        });
    }
    Ok(subjects)
}
