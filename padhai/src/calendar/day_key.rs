use std::fmt;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::domain::Timestamp;

/// A local calendar day. Two instants on the same local day map to equal keys
/// regardless of time-of-day; keys order chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(Date);

impl DayKey {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// Normalize `timestamp` to the calendar day seen at `offset`.
    ///
    /// The conversion goes through the offset-adjusted date, never through a
    /// UTC date string, so instants near midnight stay on their local day.
    pub fn of(timestamp: &Timestamp, offset: UtcOffset) -> Self {
        Self(timestamp.date_at(offset))
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(Duration::days(1)))
    }

    pub fn previous(&self) -> Self {
        Self(self.0.saturating_sub(Duration::days(1)))
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0.saturating_add(Duration::days(days)))
    }
}

impl From<Date> for DayKey {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month() as u8,
            self.0.day()
        )
    }
}

/// The single notion of "now" threaded through classification and analytics:
/// the current local day plus the offset used to normalize every timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    today: DayKey,
    offset: UtcOffset,
}

impl ReferenceTime {
    pub fn new(now: OffsetDateTime, offset: UtcOffset) -> Self {
        Self {
            today: DayKey(now.to_offset(offset).date()),
            offset,
        }
    }

    pub fn on(today: Date, offset: UtcOffset) -> Self {
        Self {
            today: DayKey(today),
            offset,
        }
    }

    /// Wall clock in the local offset. Falls back to UTC when the local offset
    /// cannot be determined.
    pub fn local_now() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self::new(OffsetDateTime::now_utc(), offset)
    }

    pub fn today(&self) -> DayKey {
        self.today
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn day_of(&self, timestamp: &Timestamp) -> DayKey {
        DayKey::of(timestamp, self.offset)
    }
}
