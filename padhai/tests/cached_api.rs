use std::time::Duration;

use padhai::analytics::Dashboard;
use padhai::batch::{fetch_chapter_scores, fetch_subjects_with_summaries};
use padhai::cache::{CachedStudyApi, QueryKey};
use padhai::calendar::ReferenceTime;
use padhai::domain::{ChapterDraft, Credentials, ScoreAction, ScoreDraft, ScoreEdit, SubjectDraft};
use padhai::{MemoryStudyApi, StudyApi};
use time::macros::{date, offset};

const WINDOW: Duration = Duration::from_secs(300);

fn setup() -> (MemoryStudyApi, CachedStudyApi<MemoryStudyApi>) {
    let backend = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
    let api = CachedStudyApi::new(backend.clone(), WINDOW);
    (backend, api)
}

#[tokio::test]
async fn repeated_reads_within_window_hit_the_cache() {
    let (backend, api) = setup();

    api.revisions().await.unwrap();
    api.revisions().await.unwrap();
    api.subjects().await.unwrap();
    api.subjects().await.unwrap();

    assert_eq!(backend.calls("revisions"), 1);
    assert_eq!(backend.calls("subjects"), 1);
    assert!(api.is_cached(&QueryKey::Revisions));
}

#[tokio::test]
async fn zero_window_always_refetches() {
    let backend = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
    let api = CachedStudyApi::new(backend.clone(), Duration::ZERO);

    api.revisions().await.unwrap();
    api.revisions().await.unwrap();
    assert_eq!(backend.calls("revisions"), 2);
}

#[tokio::test]
async fn completing_a_revision_refreshes_the_dashboard() {
    let (backend, api) = setup();
    let reference = ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC));

    let before = Dashboard::compute(&api.revisions().await.unwrap(), &reference);
    assert_eq!(before.stats.due_today, 2);

    let target = before.todays_revisions[0].id.clone();
    api.subjects().await.unwrap();
    api.complete_revision(&target).await.unwrap();

    assert!(!api.is_cached(&QueryKey::Revisions));
    assert!(api.is_cached(&QueryKey::Subjects));

    let after = Dashboard::compute(&api.revisions().await.unwrap(), &reference);
    assert_eq!(backend.calls("revisions"), 2);
    assert_eq!(after.stats.due_today, 1);
    assert_eq!(after.stats.completed, before.stats.completed + 1);
}

#[tokio::test]
async fn failed_mutations_keep_the_cache() {
    let (backend, api) = setup();
    api.revisions().await.unwrap();

    backend.fail("complete_revision", 500);
    let revisions = api.revisions().await.unwrap();
    assert!(api.complete_revision(&revisions[1].id).await.is_err());

    assert!(api.is_cached(&QueryKey::Revisions));
    assert_eq!(backend.calls("revisions"), 1);
}

#[tokio::test]
async fn subject_mutations_invalidate_only_their_reads() {
    let (backend, api) = setup();
    let subjects = api.subjects().await.unwrap();
    let physics = subjects[0].id.clone();
    let chemistry = subjects[1].id.clone();

    api.chapters(&physics).await.unwrap();
    api.chapters(&chemistry).await.unwrap();

    api.create_chapter(&physics, &ChapterDraft::new("Waves").unwrap())
        .await
        .unwrap();
    assert!(!api.is_cached(&QueryKey::Chapters(physics.clone())));
    assert!(api.is_cached(&QueryKey::Chapters(chemistry.clone())));
    assert!(api.is_cached(&QueryKey::Subjects));

    let chapters = api.chapters(&physics).await.unwrap();
    assert!(chapters.iter().any(|c| c.name == "Waves"));

    api.create_subject(&SubjectDraft::new("Mathematics").unwrap())
        .await
        .unwrap();
    assert!(!api.is_cached(&QueryKey::Subjects));
    assert_eq!(api.subjects().await.unwrap().len(), 4);

    let physics_name = subjects[0].name.clone();
    let revisions = api.revisions().await.unwrap();
    assert!(revisions.iter().any(|r| r.subject_name == physics_name));

    api.delete_subject(&physics).await.unwrap();
    assert!(!api.is_cached(&QueryKey::Chapters(physics.clone())));
    assert!(!api.is_cached(&QueryKey::Revisions));
    assert!(api.is_cached(&QueryKey::Chapters(chemistry)));
    assert_eq!(api.subjects().await.unwrap().len(), 3);
    assert_eq!(backend.calls("subjects"), 3);

    let revisions = api.revisions().await.unwrap();
    assert!(revisions.iter().all(|r| r.subject_name != physics_name));
    assert_eq!(backend.calls("revisions"), 2);
}

#[tokio::test]
async fn score_changes_refresh_scores_and_summary() {
    let (backend, api) = setup();
    let chemistry = api.subjects().await.unwrap().remove(1);
    let chapters = api.chapters(&chemistry.id).await.unwrap();

    let batch = fetch_chapter_scores(&api, &chemistry.id, &chapters).await;
    assert!(!batch.is_loading() && !batch.is_error());
    let summary = api.subject_summary(&chemistry.id).await.unwrap();
    assert_eq!((summary.weak, summary.average, summary.strong), (0, 2, 0));

    // Chemical Bonding is at 48 with a deadline four days out
    let bonding = &chapters[1];
    let latest = batch
        .get(&bonding.id)
        .and_then(|state| state.ready())
        .cloned()
        .flatten()
        .unwrap();
    assert_eq!(ScoreAction::for_latest(Some(&latest)), ScoreAction::Update);

    let draft = ScoreEdit::parse("91", "").unwrap().merge(&latest).unwrap();
    api.update_score(&chemistry.id, &bonding.id, &latest.id, &draft)
        .await
        .unwrap();

    let summary = api.subject_summary(&chemistry.id).await.unwrap();
    assert_eq!((summary.weak, summary.average, summary.strong), (0, 1, 1));

    let refreshed = fetch_chapter_scores(&api, &chemistry.id, &chapters).await;
    let current = refreshed
        .get(&bonding.id)
        .and_then(|state| state.ready())
        .cloned()
        .flatten()
        .unwrap();
    assert_eq!(current.score_percentage, 91);
    assert_eq!(current.deadline, latest.deadline);

    // Atomic Structure was untouched and still served from the cache
    assert_eq!(backend.calls("chapter_scores"), 3);

    let new = ScoreDraft::new(30, date!(2026 - 12 - 1)).unwrap();
    api.add_score(&chemistry.id, &chapters[0].id, &new).await.unwrap();
    let history = api.chapter_scores(&chemistry.id, &chapters[0].id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].score_percentage, 30);
}

#[tokio::test]
async fn summaries_fan_out_through_the_cache() {
    let (backend, api) = setup();

    let first = fetch_subjects_with_summaries(&api).await.unwrap();
    let second = fetch_subjects_with_summaries(&api).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.calls("subject_summary"), 3);
}

#[tokio::test]
async fn session_changes_clear_everything() {
    let (backend, api) = setup();
    api.me().await.unwrap();
    api.revisions().await.unwrap();

    api.logout().await.unwrap();
    assert!(!api.is_cached(&QueryKey::Me));
    assert!(!api.is_cached(&QueryKey::Revisions));
    assert!(api.me().await.unwrap_err().is_unauthorized());

    let credentials = Credentials::new("asha@example.com", "padhai123").unwrap();
    api.login(&credentials).await.unwrap();
    assert_eq!(api.me().await.unwrap().first_name(), "Asha");
    assert_eq!(backend.calls("me"), 3);
}
