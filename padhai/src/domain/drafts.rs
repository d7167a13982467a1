//! User input for mutations, checked before any request is issued.

use serde::Serialize;
use thiserror::Error;
use time::{Date, UtcOffset};

use super::{parse_day, Score, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(i64),
    #[error("not a whole number: {0:?}")]
    InvalidNumber(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("passwords don't match")]
    PasswordMismatch,
    #[error("nothing changed since the latest score")]
    NoChanges,
    #[error("invalid id {0:?}")]
    InvalidId(String),
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectDraft {
    pub name: String,
}

impl SubjectDraft {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required(name, "subject name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterDraft {
    pub name: String,
}

impl ChapterDraft {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required(name, "chapter name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(Self {
            email: required(email, "email")?,
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, ValidationError> {
        let name = required(name, "name")?;
        let email = required(email, "email")?;
        if password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Self {
            name,
            email,
            password: password.to_string(),
        })
    }
}

/// A complete score + deadline pair, ready to be added or written over the
/// latest score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDraft {
    pub score_percentage: u8,
    pub deadline: Timestamp,
}

impl ScoreDraft {
    pub fn new(score: i64, deadline: Date) -> Result<Self, ValidationError> {
        Ok(Self {
            score_percentage: percentage(score)?,
            deadline: deadline_instant(deadline),
        })
    }
}

/// Partial input for a score form. Blank fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreEdit {
    pub score: Option<u8>,
    pub deadline: Option<Date>,
}

impl ScoreEdit {
    pub fn parse(score: &str, deadline: &str) -> Result<Self, ValidationError> {
        let score = match score.trim() {
            "" => None,
            raw => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| ValidationError::InvalidNumber(raw.to_string()))?;
                Some(percentage(n)?)
            }
        };
        let deadline = match deadline.trim() {
            "" => None,
            raw => Some(parse_day(raw).map_err(|_| ValidationError::InvalidDate(raw.to_string()))?),
        };
        Ok(Self { score, deadline })
    }

    /// Input for a chapter without any score: both fields are mandatory.
    pub fn into_new(self) -> Result<ScoreDraft, ValidationError> {
        let score = self.score.ok_or(ValidationError::Required("score"))?;
        let deadline = self.deadline.ok_or(ValidationError::Required("deadline"))?;
        Ok(ScoreDraft {
            score_percentage: score,
            deadline: deadline_instant(deadline),
        })
    }

    /// Merge the input over the latest score. Only fields that differ from the
    /// latest score are taken from the input; at least one must differ.
    pub fn merge(self, latest: &Score) -> Result<ScoreDraft, ValidationError> {
        let score_changed = self
            .score
            .filter(|s| *s != latest.score_percentage);
        let deadline_changed = self
            .deadline
            .filter(|d| *d != latest.deadline.date_at(UtcOffset::UTC));

        if score_changed.is_none() && deadline_changed.is_none() {
            return Err(ValidationError::NoChanges);
        }

        Ok(ScoreDraft {
            score_percentage: score_changed.unwrap_or(latest.score_percentage),
            deadline: deadline_changed
                .map(deadline_instant)
                .unwrap_or(latest.deadline),
        })
    }
}

fn percentage(score: i64) -> Result<u8, ValidationError> {
    u8::try_from(score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or(ValidationError::ScoreOutOfRange(score))
}

/// Deadlines picked as a calendar date are stored as UTC midnight of that date.
fn deadline_instant(date: Date) -> Timestamp {
    Timestamp::At(date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PerformanceLevel, ScoreId};
    use time::macros::{date, datetime};

    fn latest() -> Score {
        Score {
            id: ScoreId::new("sc-1"),
            score_percentage: 55,
            performance_level: PerformanceLevel::Average,
            deadline: Timestamp::At(datetime!(2026-11-1 0:00 UTC)),
            created_at: None,
            chapter_id: None,
            chapter_name: None,
        }
    }

    #[test]
    fn names_are_required_and_trimmed() {
        assert_eq!(
            SubjectDraft::new("   ").unwrap_err(),
            ValidationError::Required("subject name")
        );
        assert_eq!(ChapterDraft::new(" Optics ").unwrap().name, "Optics");
    }

    #[test]
    fn registration_requires_matching_passwords() {
        assert_eq!(
            Registration::new("Asha", "a@b.c", "hunter2", "hunter3").unwrap_err(),
            ValidationError::PasswordMismatch
        );
        assert!(Registration::new("Asha", "a@b.c", "hunter2", "hunter2").is_ok());
        assert_eq!(
            Credentials::new("a@b.c", "").unwrap_err(),
            ValidationError::Required("password")
        );
    }

    #[test]
    fn score_must_be_a_percentage() {
        assert_eq!(
            ScoreDraft::new(101, date!(2026 - 11 - 1)).unwrap_err(),
            ValidationError::ScoreOutOfRange(101)
        );
        assert_eq!(
            ScoreDraft::new(-1, date!(2026 - 11 - 1)).unwrap_err(),
            ValidationError::ScoreOutOfRange(-1)
        );
        assert_eq!(
            ScoreEdit::parse("6x", "").unwrap_err(),
            ValidationError::InvalidNumber("6x".to_string())
        );
    }

    #[test]
    fn new_scores_need_both_fields() {
        let edit = ScoreEdit::parse("80", "").unwrap();
        assert_eq!(edit.into_new().unwrap_err(), ValidationError::Required("deadline"));

        let draft = ScoreEdit::parse("80", "2026-11-20").unwrap().into_new().unwrap();
        assert_eq!(draft.score_percentage, 80);
        assert_eq!(draft.deadline, Timestamp::At(datetime!(2026-11-20 0:00 UTC)));
    }

    #[test]
    fn merge_keeps_unchanged_fields_from_latest() {
        let draft = ScoreEdit::parse("72", "").unwrap().merge(&latest()).unwrap();
        assert_eq!(draft.score_percentage, 72);
        assert_eq!(draft.deadline, latest().deadline);

        let draft = ScoreEdit::parse("55", "2026-12-01").unwrap().merge(&latest()).unwrap();
        assert_eq!(draft.score_percentage, 55);
        assert_eq!(draft.deadline, Timestamp::At(datetime!(2026-12-1 0:00 UTC)));
    }

    #[test]
    fn merge_without_changes_is_rejected() {
        let edit = ScoreEdit::parse("55", "2026-11-01").unwrap();
        assert_eq!(edit.merge(&latest()).unwrap_err(), ValidationError::NoChanges);
        assert_eq!(
            ScoreEdit::default().merge(&latest()).unwrap_err(),
            ValidationError::NoChanges
        );
    }
}
