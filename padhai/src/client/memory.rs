use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::{Date, Duration, OffsetDateTime};

use super::{ApiError, StudyApi};
use crate::domain::{
    Chapter, ChapterDraft, ChapterId, Credentials, PerformanceLevel, Registration, Revision,
    RevisionId, Score, ScoreDraft, ScoreId, ScoreSummary, Subject, SubjectDraft, SubjectId,
    Timestamp, User,
};

/// In-process stand-in for the backend, used by `padhai-tui dev` and in tests.
///
/// Clones share the same store. Every call is counted by name (`"revisions"`,
/// `"chapter_scores"`, ...) and a failure can be injected per call name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStudyApi {
    store: Arc<Mutex<Store>>,
}

#[derive(Debug, Default)]
struct Store {
    accounts: Vec<Account>,
    signed_in: Option<usize>,
    revisions: Vec<Revision>,
    subjects: Vec<SubjectRecord>,
    next_id: u64,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, u16>,
}

#[derive(Debug, Clone)]
struct Account {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug)]
struct SubjectRecord {
    id: SubjectId,
    name: String,
    chapters: Vec<ChapterRecord>,
}

#[derive(Debug)]
struct ChapterRecord {
    chapter: Chapter,
    /// Newest first.
    scores: Vec<Score>,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn subject(&self, id: &SubjectId) -> Result<&SubjectRecord, ApiError> {
        self.subjects
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| not_found("Subject"))
    }

    fn subject_mut(&mut self, id: &SubjectId) -> Result<&mut SubjectRecord, ApiError> {
        self.subjects
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| not_found("Subject"))
    }

    fn chapter_mut(
        &mut self,
        subject: &SubjectId,
        chapter: &ChapterId,
    ) -> Result<&mut ChapterRecord, ApiError> {
        self.subject_mut(subject)?
            .chapters
            .iter_mut()
            .find(|c| &c.chapter.id == chapter)
            .ok_or_else(|| not_found("Chapter"))
    }

    fn pending_revisions(&self, subject_name: &str) -> u32 {
        self.revisions
            .iter()
            .filter(|r| !r.completed && r.subject_name == subject_name)
            .count() as u32
    }

    fn build_score(
        &mut self,
        chapter: &Chapter,
        draft: &ScoreDraft,
        id: Option<ScoreId>,
    ) -> Score {
        let id = id.unwrap_or_else(|| ScoreId::new(self.next_id("score")));
        Score {
            id,
            score_percentage: draft.score_percentage,
            performance_level: performance_level(draft.score_percentage),
            deadline: draft.deadline,
            created_at: Some(Timestamp::At(OffsetDateTime::now_utc())),
            chapter_id: Some(chapter.id.clone()),
            chapter_name: Some(chapter.name.clone()),
        }
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::status(404, Some(format!("{what} not found")))
}

fn performance_level(score: u8) -> PerformanceLevel {
    match score {
        s if s < 40 => PerformanceLevel::Weak,
        s if s < 70 => PerformanceLevel::Average,
        _ => PerformanceLevel::Strong,
    }
}

fn summarize(chapters: &[ChapterRecord]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    let mut sum = 0u32;

    for latest in chapters.iter().filter_map(|c| c.scores.first()) {
        match latest.performance_level {
            PerformanceLevel::Weak => summary.weak += 1,
            PerformanceLevel::Average => summary.average += 1,
            PerformanceLevel::Strong => summary.strong += 1,
        }
        sum += u32::from(latest.score_percentage);
    }

    let scored = summary.scored_chapters();
    if scored > 0 {
        summary.average_percentage = f64::from(sum) / f64::from(scored);
    }
    summary
}

impl MemoryStudyApi {
    /// Empty backend with no accounts and no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A signed-in demo student with subjects, scores and revisions spread
    /// around `today`.
    pub fn seeded(today: Date) -> Self {
        let api = Self::new();
        {
            let mut store = api.lock();
            store.accounts.push(Account {
                name: "Asha Verma".to_string(),
                email: "asha@example.com".to_string(),
                password: "padhai123".to_string(),
            });
            store.signed_in = Some(0);
            seed(&mut store, today);
        }
        api
    }

    /// Number of times `call` has been invoked.
    pub fn calls(&self, call: &str) -> usize {
        self.lock().calls.get(call).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every subsequent `call` fail with `status`. 401 maps to
    /// [`ApiError::Unauthorized`].
    pub fn fail(&self, call: &'static str, status: u16) {
        self.lock().failures.insert(call, status);
    }

    pub fn recover(&self, call: &str) {
        self.lock().failures.remove(call);
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().signed_in.is_some()
    }

    /// Drop the session as if the server-side token expired.
    pub fn expire_session(&self) {
        self.lock().signed_in = None;
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(
        &self,
        call: &'static str,
        session_required: bool,
    ) -> Result<MutexGuard<'_, Store>, ApiError> {
        let mut store = self.lock();
        *store.calls.entry(call).or_insert(0) += 1;

        if let Some(status) = store.failures.get(call).copied() {
            return Err(match status {
                401 => ApiError::Unauthorized,
                status => ApiError::status(status, Some(format!("{call} failed"))),
            });
        }
        if session_required && store.signed_in.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(store)
    }
}

fn seed(store: &mut Store, today: Date) {
    let day = |offset: i64| Timestamp::Day(today + Duration::days(offset));
    let deadline = |offset: i64| {
        Timestamp::At((today + Duration::days(offset)).midnight().assume_utc())
    };

    let plan: [(&str, &[(&str, Option<u8>, i64)]); 3] = [
        (
            "Physics",
            &[
                ("Kinematics", Some(82), 20),
                ("Optics", Some(35), 6),
                ("Thermodynamics", None, 0),
            ],
        ),
        (
            "Chemistry",
            &[("Atomic Structure", Some(64), 10), ("Chemical Bonding", Some(48), 4)],
        ),
        ("Biology", &[("Cell Biology", None, 0)]),
    ];

    for (subject_name, chapters) in plan {
        let subject_id = SubjectId::new(store.next_id("subject"));
        let mut records = Vec::new();
        for (chapter_name, score, days_out) in chapters {
            let chapter = Chapter {
                id: ChapterId::new(store.next_id("chapter")),
                name: chapter_name.to_string(),
            };
            let scores = match score {
                Some(pct) => {
                    let draft = ScoreDraft {
                        score_percentage: *pct,
                        deadline: deadline(*days_out),
                    };
                    vec![store.build_score(&chapter, &draft, None)]
                }
                None => Vec::new(),
            };
            records.push(ChapterRecord { chapter, scores });
        }
        store.subjects.push(SubjectRecord {
            id: subject_id,
            name: subject_name.to_string(),
            chapters: records,
        });
    }

    let revisions: [(&str, &str, i64, bool); 8] = [
        ("Physics", "Kinematics", -3, true),
        ("Chemistry", "Atomic Structure", -2, false),
        ("Physics", "Optics", -1, true),
        ("Physics", "Optics", 0, false),
        ("Chemistry", "Chemical Bonding", 0, false),
        ("Chemistry", "Atomic Structure", 1, false),
        ("Physics", "Kinematics", 3, false),
        ("Chemistry", "Chemical Bonding", 7, false),
    ];
    for (subject_name, chapter_name, offset, completed) in revisions {
        let id = RevisionId::new(store.next_id("revision"));
        store.revisions.push(Revision {
            id,
            revision_date: day(offset),
            completed,
            chapter_name: chapter_name.to_string(),
            subject_name: subject_name.to_string(),
        });
    }
}

#[async_trait]
impl StudyApi for MemoryStudyApi {
    async fn me(&self) -> Result<User, ApiError> {
        let store = self.enter("me", true)?;
        let account = store
            .signed_in
            .and_then(|idx| store.accounts.get(idx))
            .ok_or(ApiError::Unauthorized)?;
        Ok(User {
            name: account.name.clone(),
            email: account.email.clone(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let mut store = self.enter("login", false)?;
        let idx = store
            .accounts
            .iter()
            .position(|a| a.email == credentials.email && a.password == credentials.password)
            .ok_or_else(|| ApiError::status(401, Some("Invalid credentials".to_string())))?;
        store.signed_in = Some(idx);
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let mut store = self.enter("register", false)?;
        if store.accounts.iter().any(|a| a.email == registration.email) {
            return Err(ApiError::status(
                409,
                Some("User already exists".to_string()),
            ));
        }
        store.accounts.push(Account {
            name: registration.name.clone(),
            email: registration.email.clone(),
            password: registration.password.clone(),
        });
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let mut store = self.enter("logout", false)?;
        store.signed_in = None;
        Ok(())
    }

    async fn revisions(&self) -> Result<Vec<Revision>, ApiError> {
        let store = self.enter("revisions", true)?;
        Ok(store.revisions.clone())
    }

    async fn complete_revision(&self, id: &RevisionId) -> Result<(), ApiError> {
        let mut store = self.enter("complete_revision", true)?;
        let revision = store
            .revisions
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| not_found("Revision"))?;
        revision.completed = true;
        Ok(())
    }

    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        let store = self.enter("subjects", true)?;
        Ok(store
            .subjects
            .iter()
            .map(|s| Subject {
                id: s.id.clone(),
                name: s.name.clone(),
                chapter_count: s.chapters.len() as u32,
                pending_revisions: store.pending_revisions(&s.name),
                score_summary: ScoreSummary::default(),
            })
            .collect())
    }

    async fn create_subject(&self, draft: &SubjectDraft) -> Result<(), ApiError> {
        let mut store = self.enter("create_subject", true)?;
        if store.subjects.iter().any(|s| s.name == draft.name) {
            return Err(ApiError::status(
                409,
                Some("Subject already exists".to_string()),
            ));
        }
        let id = SubjectId::new(store.next_id("subject"));
        store.subjects.push(SubjectRecord {
            id,
            name: draft.name.clone(),
            chapters: Vec::new(),
        });
        Ok(())
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<(), ApiError> {
        let mut store = self.enter("delete_subject", true)?;
        let name = store.subject(id)?.name.clone();
        store.subjects.retain(|s| &s.id != id);
        store.revisions.retain(|r| r.subject_name != name);
        Ok(())
    }

    async fn subject_summary(&self, id: &SubjectId) -> Result<ScoreSummary, ApiError> {
        let store = self.enter("subject_summary", true)?;
        Ok(summarize(&store.subject(id)?.chapters))
    }

    async fn chapters(&self, subject: &SubjectId) -> Result<Vec<Chapter>, ApiError> {
        let store = self.enter("chapters", true)?;
        Ok(store
            .subject(subject)?
            .chapters
            .iter()
            .map(|c| c.chapter.clone())
            .collect())
    }

    async fn create_chapter(
        &self,
        subject: &SubjectId,
        draft: &ChapterDraft,
    ) -> Result<(), ApiError> {
        let mut store = self.enter("create_chapter", true)?;
        let id = ChapterId::new(store.next_id("chapter"));
        store.subject_mut(subject)?.chapters.push(ChapterRecord {
            chapter: Chapter {
                id,
                name: draft.name.clone(),
            },
            scores: Vec::new(),
        });
        Ok(())
    }

    async fn chapter_scores(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
    ) -> Result<Vec<Score>, ApiError> {
        let mut store = self.enter("chapter_scores", true)?;
        Ok(store.chapter_mut(subject, chapter)?.scores.clone())
    }

    async fn add_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        let mut store = self.enter("add_score", true)?;
        let target = store.chapter_mut(subject, chapter)?.chapter.clone();
        let score = store.build_score(&target, draft, None);
        store.chapter_mut(subject, chapter)?.scores.insert(0, score);
        Ok(())
    }

    async fn update_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        score: &ScoreId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        let mut store = self.enter("update_score", true)?;
        let target = store.chapter_mut(subject, chapter)?.chapter.clone();
        let updated = store.build_score(&target, draft, Some(score.clone()));
        let existing = store
            .chapter_mut(subject, chapter)?
            .scores
            .iter_mut()
            .find(|s| &s.id == score)
            .ok_or_else(|| not_found("Score"))?;
        *existing = updated;
        Ok(())
    }
}
