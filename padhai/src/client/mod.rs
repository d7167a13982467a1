//! The remote data gateway: one trait describing every backend call, with an
//! HTTP implementation and an in-memory one for development and tests.

mod dto;
mod error;
mod http;
mod memory;

use async_trait::async_trait;

use crate::domain::{
    Chapter, ChapterDraft, ChapterId, Credentials, Registration, Revision, RevisionId, Score,
    ScoreDraft, ScoreId, ScoreSummary, Subject, SubjectDraft, SubjectId, User,
};

pub use error::ApiError;
pub use http::{HttpStudyApi, SESSION_COOKIE};
pub use memory::MemoryStudyApi;

/// Backend operations used by the client. Each call is a single
/// request/response; a mutation succeeds only on a 2xx response.
#[async_trait]
pub trait StudyApi: Send + Sync {
    async fn me(&self) -> Result<User, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    // ========================================================================
    // Revisions
    // ========================================================================

    async fn revisions(&self) -> Result<Vec<Revision>, ApiError>;

    /// Flip a revision to completed. There is no way back.
    async fn complete_revision(&self, id: &RevisionId) -> Result<(), ApiError>;

    // ========================================================================
    // Subjects and chapters
    // ========================================================================

    /// Subjects as listed by the backend, without score summaries.
    async fn subjects(&self) -> Result<Vec<Subject>, ApiError>;

    async fn create_subject(&self, draft: &SubjectDraft) -> Result<(), ApiError>;

    async fn delete_subject(&self, id: &SubjectId) -> Result<(), ApiError>;

    async fn subject_summary(&self, id: &SubjectId) -> Result<ScoreSummary, ApiError>;

    async fn chapters(&self, subject: &SubjectId) -> Result<Vec<Chapter>, ApiError>;

    async fn create_chapter(
        &self,
        subject: &SubjectId,
        draft: &ChapterDraft,
    ) -> Result<(), ApiError>;

    // ========================================================================
    // Scores
    // ========================================================================

    /// Score history of a chapter, newest first.
    async fn chapter_scores(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
    ) -> Result<Vec<Score>, ApiError>;

    async fn add_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError>;

    async fn update_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        score: &ScoreId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError>;
}
