//! Read-through query cache keyed by the read operations of [`StudyApi`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::client::{ApiError, StudyApi};
use crate::domain::{
    Chapter, ChapterDraft, ChapterId, Credentials, Registration, Revision, RevisionId, Score,
    ScoreDraft, ScoreId, ScoreSummary, Subject, SubjectDraft, SubjectId, User,
};

/// Identity of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Me,
    Revisions,
    Subjects,
    SubjectSummary(SubjectId),
    Chapters(SubjectId),
    ChapterScores(SubjectId, ChapterId),
}

impl QueryKey {
    /// The subject a key is scoped to, if any.
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            QueryKey::SubjectSummary(id)
            | QueryKey::Chapters(id)
            | QueryKey::ChapterScores(id, _) => Some(id),
            QueryKey::Me | QueryKey::Revisions | QueryKey::Subjects => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    User(User),
    Revisions(Vec<Revision>),
    Subjects(Vec<Subject>),
    Summary(ScoreSummary),
    Chapters(Vec<Chapter>),
    Scores(Vec<Score>),
}

/// Values that can be stored in a [`QueryCache`].
pub trait Cacheable: Clone + Sized {
    fn into_cached(self) -> CachedValue;
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_cached(self) -> CachedValue {
                CachedValue::$variant(self)
            }

            fn from_cached(value: &CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(User, User);
cacheable!(Vec<Revision>, Revisions);
cacheable!(Vec<Subject>, Subjects);
cacheable!(ScoreSummary, Summary);
cacheable!(Vec<Chapter>, Chapters);
cacheable!(Vec<Score>, Scores);

/// Handed out by [`QueryCache::begin`]; only the newest ticket for a key may
/// write its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug)]
struct Entry {
    value: CachedValue,
    fetched_at: Instant,
}

/// Entries older than the staleness window are treated as absent.
///
/// Concurrent fetches of the same key are ordered by when they began: a result
/// is stored only if no newer fetch began and the key was not invalidated in
/// the meantime.
#[derive(Debug)]
pub struct QueryCache {
    stale_after: Duration,
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, u64>,
    next_generation: u64,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// A fresh value for `key`, if any.
    pub fn get(&self, key: &QueryKey, now: Instant) -> Option<&CachedValue> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.stale_after)
            .map(|entry| &entry.value)
    }

    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        self.next_generation += 1;
        self.in_flight.insert(key.clone(), self.next_generation);
        FetchTicket {
            key,
            generation: self.next_generation,
        }
    }

    /// Store the result of a fetch. Returns `false` when the result was
    /// superseded and dropped.
    pub fn complete(&mut self, ticket: FetchTicket, value: CachedValue, now: Instant) -> bool {
        if self.in_flight.get(&ticket.key) != Some(&ticket.generation) {
            debug!(key = ?ticket.key, "dropping superseded fetch result");
            return false;
        }
        self.entries.insert(
            ticket.key,
            Entry {
                value,
                fetched_at: now,
            },
        );
        true
    }

    pub fn invalidate(&mut self, key: &QueryKey) {
        self.entries.remove(key);
        self.in_flight.remove(key);
    }

    /// Drop every key scoped to `subject`.
    pub fn invalidate_subject(&mut self, subject: &SubjectId) {
        self.entries.retain(|key, _| key.subject() != Some(subject));
        self.in_flight.retain(|key, _| key.subject() != Some(subject));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// [`StudyApi`] decorator that serves reads from a [`QueryCache`] and
/// invalidates the dependent reads after each successful mutation.
pub struct CachedStudyApi<A> {
    inner: A,
    cache: Mutex<QueryCache>,
}

impl<A: StudyApi> CachedStudyApi<A> {
    pub fn new(inner: A, stale_after: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(QueryCache::new(stale_after)),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn invalidate(&self, key: &QueryKey) {
        debug!(?key, "invalidating");
        self.cache().invalidate(key);
    }

    pub fn clear(&self) {
        self.cache().clear();
    }

    /// Whether a fresh value for `key` is cached right now.
    pub fn is_cached(&self, key: &QueryKey) -> bool {
        self.cache().get(key, Instant::now()).is_some()
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn read<T, F>(&self, key: QueryKey, fetch: F) -> Result<T, ApiError>
    where
        T: Cacheable + Send,
        F: Future<Output = Result<T, ApiError>> + Send,
    {
        let ticket = {
            let mut cache = self.cache();
            if let Some(hit) = cache.get(&key, Instant::now()).and_then(T::from_cached) {
                debug!(?key, "cache hit");
                return Ok(hit);
            }
            cache.begin(key)
        };

        let value = fetch.await?;
        self.cache()
            .complete(ticket, value.clone().into_cached(), Instant::now());
        Ok(value)
    }
}

#[async_trait]
impl<A: StudyApi> StudyApi for CachedStudyApi<A> {
    async fn me(&self) -> Result<User, ApiError> {
        self.read(QueryKey::Me, self.inner.me()).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.inner.login(credentials).await?;
        self.clear();
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.inner.register(registration).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.inner.logout().await;
        self.clear();
        result
    }

    async fn revisions(&self) -> Result<Vec<Revision>, ApiError> {
        self.read(QueryKey::Revisions, self.inner.revisions()).await
    }

    async fn complete_revision(&self, id: &RevisionId) -> Result<(), ApiError> {
        self.inner.complete_revision(id).await?;
        self.invalidate(&QueryKey::Revisions);
        Ok(())
    }

    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.read(QueryKey::Subjects, self.inner.subjects()).await
    }

    async fn create_subject(&self, draft: &SubjectDraft) -> Result<(), ApiError> {
        self.inner.create_subject(draft).await?;
        self.invalidate(&QueryKey::Subjects);
        Ok(())
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<(), ApiError> {
        self.inner.delete_subject(id).await?;
        let mut cache = self.cache();
        cache.invalidate(&QueryKey::Subjects);
        // the backend drops the subject's revisions with it
        cache.invalidate(&QueryKey::Revisions);
        cache.invalidate_subject(id);
        Ok(())
    }

    async fn subject_summary(&self, id: &SubjectId) -> Result<ScoreSummary, ApiError> {
        self.read(
            QueryKey::SubjectSummary(id.clone()),
            self.inner.subject_summary(id),
        )
        .await
    }

    async fn chapters(&self, subject: &SubjectId) -> Result<Vec<Chapter>, ApiError> {
        self.read(QueryKey::Chapters(subject.clone()), self.inner.chapters(subject))
            .await
    }

    async fn create_chapter(
        &self,
        subject: &SubjectId,
        draft: &ChapterDraft,
    ) -> Result<(), ApiError> {
        self.inner.create_chapter(subject, draft).await?;
        self.invalidate(&QueryKey::Chapters(subject.clone()));
        Ok(())
    }

    async fn chapter_scores(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
    ) -> Result<Vec<Score>, ApiError> {
        self.read(
            QueryKey::ChapterScores(subject.clone(), chapter.clone()),
            self.inner.chapter_scores(subject, chapter),
        )
        .await
    }

    async fn add_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        self.inner.add_score(subject, chapter, draft).await?;
        self.invalidate_scores(subject, chapter);
        Ok(())
    }

    async fn update_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        score: &ScoreId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        self.inner.update_score(subject, chapter, score, draft).await?;
        self.invalidate_scores(subject, chapter);
        Ok(())
    }
}

impl<A: StudyApi> CachedStudyApi<A> {
    fn invalidate_scores(&self, subject: &SubjectId, chapter: &ChapterId) {
        let mut cache = self.cache();
        cache.invalidate(&QueryKey::ChapterScores(subject.clone(), chapter.clone()));
        cache.invalidate(&QueryKey::SubjectSummary(subject.clone()));
    }
}
