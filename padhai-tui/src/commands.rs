//! One-shot subcommands. Each one performs a single gateway operation (or a
//! read followed by one mutation) and prints plain text.

use anyhow::{bail, Context, Result};
use padhai::analytics::Dashboard;
use padhai::batch::{fetch_chapter_scores, fetch_subjects_with_summaries, QueryState};
use padhai::calendar::{classify, DayKey, ReferenceTime, RevisionIndex};
use padhai::domain::{
    latest_score, parse_day, Chapter, ChapterDraft, ChapterId, ChapterInsight, Revision,
    RevisionId, Score, ScoreAction, ScoreEdit, Subject, SubjectDraft, SubjectId,
};
use padhai::StudyApi;
use std::io::Write;

pub fn revision_line(revision: &Revision, reference: &ReferenceTime) -> String {
    format!(
        "{}  {:<9}  {} · {}  ({})",
        reference.day_of(&revision.revision_date),
        classify(revision, reference).as_str(),
        revision.subject_name,
        revision.chapter_name,
        revision.id
    )
}

pub fn subject_line(subject: &Subject) -> String {
    let summary = &subject.score_summary;
    format!(
        "{}  ({})  chapters: {}  pending: {}  weak/average/strong: {}/{}/{}  avg: {:.1}%",
        subject.name,
        subject.id,
        subject.chapter_count,
        subject.pending_revisions,
        summary.weak,
        summary.average,
        summary.strong,
        summary.average_percentage
    )
}

pub fn score_line(score: &Score, reference: &ReferenceTime) -> String {
    let deadline = score.deadline.date_at(reference.offset());
    format!(
        "{:>3}%  {:<7}  deadline {}  ({} days left)",
        score.score_percentage,
        score.performance_level.as_str(),
        DayKey::from(deadline),
        score.days_left(reference.today().date(), reference.offset())
    )
}

pub fn chapter_line(
    chapter: &Chapter,
    state: Option<&QueryState<Option<Score>>>,
    reference: &ReferenceTime,
) -> String {
    let detail = match state {
        None | Some(QueryState::Loading) => "loading".to_string(),
        Some(QueryState::Failed(e)) => format!("error: {e}"),
        Some(QueryState::Ready(latest)) => {
            let insight = ChapterInsight::from_score(latest.as_ref().map(|s| s.score_percentage));
            match latest {
                Some(score) => format!("{}  {}", score_line(score, reference), insight.message()),
                None => insight.message().to_string(),
            }
        }
    };
    format!("{}  ({})  {}", chapter.name, chapter.id, detail)
}

pub async fn list_revisions<A: StudyApi + ?Sized>(
    api: &A,
    reference: &ReferenceTime,
    date: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let revisions = api.revisions().await?;
    let index = RevisionIndex::build(&revisions, reference.offset());

    let days: Vec<DayKey> = match date {
        Some(raw) => {
            let day = parse_day(raw).with_context(|| format!("Invalid date {raw:?}"))?;
            vec![DayKey::from(day)]
        }
        None => index.days().collect(),
    };

    let mut printed = 0;
    for day in days {
        for revision in index.on(day) {
            writeln!(out, "{}", revision_line(revision, reference))?;
            printed += 1;
        }
    }
    if printed == 0 {
        writeln!(out, "No revisions.")?;
    }
    Ok(())
}

pub async fn complete_revision<A: StudyApi + ?Sized>(
    api: &A,
    id: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let id = RevisionId::new(id);
    let revisions = api.revisions().await?;
    let Some(revision) = revisions.iter().find(|r| r.id == id) else {
        bail!("No revision with id {id}");
    };
    if revision.completed {
        writeln!(out, "Revision {id} is already completed.")?;
        return Ok(());
    }
    api.complete_revision(&id).await?;
    writeln!(
        out,
        "Marked {} · {} as completed.",
        revision.subject_name, revision.chapter_name
    )?;
    Ok(())
}

pub async fn list_subjects<A: StudyApi + ?Sized>(api: &A, out: &mut dyn Write) -> Result<()> {
    let subjects = fetch_subjects_with_summaries(api).await?;
    if subjects.is_empty() {
        writeln!(out, "No subjects yet.")?;
    }
    for subject in &subjects {
        writeln!(out, "{}", subject_line(subject))?;
    }
    Ok(())
}

pub async fn add_subject<A: StudyApi + ?Sized>(
    api: &A,
    name: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let draft = SubjectDraft::new(name)?;
    api.create_subject(&draft).await?;
    writeln!(out, "Subject {} created.", draft.name)?;
    Ok(())
}

pub async fn delete_subject<A: StudyApi + ?Sized>(
    api: &A,
    id: &str,
    out: &mut dyn Write,
) -> Result<()> {
    api.delete_subject(&SubjectId::new(id)).await?;
    writeln!(out, "Subject {id} deleted.")?;
    Ok(())
}

pub async fn list_chapters<A: StudyApi + ?Sized>(
    api: &A,
    reference: &ReferenceTime,
    subject: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let subject = SubjectId::new(subject);
    let chapters = api.chapters(&subject).await?;
    if chapters.is_empty() {
        writeln!(out, "No chapters yet.")?;
        return Ok(());
    }

    let scores = fetch_chapter_scores(api, &subject, &chapters).await;
    for chapter in &chapters {
        writeln!(
            out,
            "{}",
            chapter_line(chapter, scores.get(&chapter.id), reference)
        )?;
    }
    Ok(())
}

pub async fn add_chapter<A: StudyApi + ?Sized>(
    api: &A,
    subject: &str,
    name: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let draft = ChapterDraft::new(name)?;
    api.create_chapter(&SubjectId::new(subject), &draft).await?;
    writeln!(out, "Chapter {} created.", draft.name)?;
    Ok(())
}

pub async fn list_scores<A: StudyApi + ?Sized>(
    api: &A,
    reference: &ReferenceTime,
    subject: &str,
    chapter: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let scores = api
        .chapter_scores(&SubjectId::new(subject), &ChapterId::new(chapter))
        .await?;
    if scores.is_empty() {
        writeln!(out, "No score yet. {}", ChapterInsight::NotEvaluated.message())?;
        return Ok(());
    }
    for (i, score) in scores.iter().enumerate() {
        let marker = if i == 0 { "latest " } else { "       " };
        writeln!(out, "{marker}{}", score_line(score, reference))?;
    }
    Ok(())
}

/// Add the first score of a chapter, or update its latest score with the
/// fields that changed.
pub async fn set_score<A: StudyApi + ?Sized>(
    api: &A,
    subject: &str,
    chapter: &str,
    score: &str,
    deadline: &str,
    out: &mut dyn Write,
) -> Result<ScoreAction> {
    let subject = SubjectId::new(subject);
    let chapter = ChapterId::new(chapter);
    let edit = ScoreEdit::parse(score, deadline)?;

    let scores = api.chapter_scores(&subject, &chapter).await?;
    let latest = latest_score(&scores);
    let action = ScoreAction::for_latest(latest);

    match latest {
        None => {
            let draft = edit.into_new()?;
            api.add_score(&subject, &chapter, &draft).await?;
            writeln!(out, "Score added.")?;
        }
        Some(latest) => {
            let draft = edit.merge(latest)?;
            api.update_score(&subject, &chapter, &latest.id, &draft)
                .await?;
            writeln!(out, "Score updated.")?;
        }
    }
    Ok(action)
}

pub async fn profile<A: StudyApi + ?Sized>(
    api: &A,
    reference: &ReferenceTime,
    out: &mut dyn Write,
) -> Result<()> {
    let user = api.me().await?;
    let revisions = api.revisions().await?;
    let dashboard = Dashboard::compute(&revisions, reference);
    let stats = &dashboard.stats;

    writeln!(out, "[{}] {} <{}>", user.initials(), user.name, user.email)?;
    writeln!(
        out,
        "Completion rate: {}%  ({})",
        stats.completion_rate,
        stats.insight().message()
    )?;
    writeln!(
        out,
        "Completed: {}  Missed: {}  Due today: {}  Upcoming: {}  Total: {}",
        stats.completed, stats.missed, stats.due_today, stats.upcoming, stats.total
    )?;
    for revision in dashboard.todays_focus() {
        writeln!(out, "Today: {} · {}", revision.subject_name, revision.chapter_name)?;
    }
    if let Some(next) = dashboard.next_upcoming() {
        writeln!(
            out,
            "Next up: {} · {} on {}",
            next.subject_name,
            next.chapter_name,
            reference.day_of(&next.revision_date)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use padhai::domain::ValidationError;
    use padhai::MemoryStudyApi;
    use time::macros::{date, offset};

    fn reference() -> ReferenceTime {
        ReferenceTime::on(date!(2026 - 10 - 17), offset!(UTC))
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    async fn first_subject(api: &MemoryStudyApi, name: &str) -> Subject {
        api.subjects()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn revisions_for_one_day() {
        let api = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let mut buf = Vec::new();
        list_revisions(&api, &reference(), Some("2026-10-15"), &mut buf)
            .await
            .unwrap();
        let text = output(buf);
        assert!(text.starts_with("2026-10-15  missed"));
        assert_eq!(text.lines().count(), 1);

        let mut buf = Vec::new();
        list_revisions(&api, &reference(), Some("2026-09-01"), &mut buf)
            .await
            .unwrap();
        assert_eq!(output(buf).trim(), "No revisions.");
    }

    #[tokio::test]
    async fn completing_twice_is_reported() {
        let api = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let open = api
            .revisions()
            .await
            .unwrap()
            .into_iter()
            .find(|r| !r.completed)
            .unwrap();

        let mut buf = Vec::new();
        complete_revision(&api, open.id.as_str(), &mut buf).await.unwrap();
        complete_revision(&api, open.id.as_str(), &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.contains("as completed"));
        assert!(text.contains("already completed"));
        assert_eq!(api.calls("complete_revision"), 1);

        assert!(complete_revision(&api, "nope", &mut Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn set_score_adds_then_updates() {
        let api = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let biology = first_subject(&api, "Biology").await;
        let cell = api.chapters(&biology.id).await.unwrap().remove(0);
        let (s, c) = (biology.id.as_str(), cell.id.as_str());

        let err = set_score(&api, s, c, "80", "", &mut Vec::new()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Required("deadline"))
        );
        assert_eq!(api.calls("add_score"), 0);

        let action = set_score(&api, s, c, "80", "2026-11-20", &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(action, ScoreAction::Add);

        let action = set_score(&api, s, c, "", "2026-12-01", &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(action, ScoreAction::Update);

        let err = set_score(&api, s, c, "80", "", &mut Vec::new()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NoChanges)
        );

        let scores = api.chapter_scores(&biology.id, &cell.id).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score_percentage, 80);
        assert_eq!(
            scores[0].deadline.date_at(offset!(UTC)),
            date!(2026 - 12 - 01)
        );
    }

    #[tokio::test]
    async fn chapters_show_latest_score_and_insight() {
        let api = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let physics = first_subject(&api, "Physics").await;
        let mut buf = Vec::new();
        list_chapters(&api, &reference(), physics.id.as_str(), &mut buf)
            .await
            .unwrap();
        let text = output(buf);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(" 82%  strong"));
        assert!(lines[0].contains("On track"));
        assert!(lines[1].contains("(6 days left)"));
        assert!(lines[1].contains("High priority chapter"));
        assert!(lines[2].contains("Add score to unlock insights"));
    }

    #[tokio::test]
    async fn profile_summarizes_revisions() {
        let api = MemoryStudyApi::seeded(date!(2026 - 10 - 17));
        let mut buf = Vec::new();
        profile(&api, &reference(), &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.starts_with("[AV] Asha Verma"));
        // 2 of 8 completed
        assert!(text.contains("Completion rate: 25%"));
        assert!(text.contains("Completed: 2  Missed: 1  Due today: 2  Upcoming: 3  Total: 8"));
        assert!(text.contains("Next up: Chemistry · Atomic Structure on 2026-10-18"));
    }
}
