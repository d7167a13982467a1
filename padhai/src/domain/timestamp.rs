use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date};
use time::{OffsetDateTime, UtcOffset};

/// A point in time as sent by the backend.
///
/// Most fields are full RFC 3339 instants, but date-only fields (`"2026-03-14"`)
/// also occur. A date-only value already names a calendar day and must never be
/// shifted by an offset, so both forms are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    At(OffsetDateTime),
    Day(Date),
}

impl Timestamp {
    /// The calendar day this timestamp falls on for an observer at `offset`.
    pub fn date_at(&self, offset: UtcOffset) -> Date {
        match self {
            Timestamp::At(instant) => instant.to_offset(offset).date(),
            Timestamp::Day(date) => *date,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, time::error::Parse> {
        let raw = raw.trim();
        match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(instant) => Ok(Timestamp::At(instant)),
            Err(_) => Date::parse(raw, format_description!("[year]-[month]-[day]"))
                .map(Timestamp::Day),
        }
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(instant: OffsetDateTime) -> Self {
        Timestamp::At(instant)
    }
}

impl From<Date> for Timestamp {
    fn from(date: Date) -> Self {
        Timestamp::Day(date)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::At(instant) => match instant.format(&Rfc3339) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
            Timestamp::Day(date) => write!(
                f,
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month() as u8,
                date.day()
            ),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

/// Parse a `YYYY-MM-DD` date as typed by the user.
pub fn parse_day(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    #[test]
    fn parses_javascript_iso_strings() {
        let ts = Timestamp::parse("2026-10-16T23:30:00.000Z").unwrap();
        assert_eq!(ts, Timestamp::At(datetime!(2026-10-16 23:30 UTC)));
    }

    #[test]
    fn parses_bare_dates() {
        assert_eq!(
            Timestamp::parse("2026-10-17").unwrap(),
            Timestamp::Day(date!(2026 - 10 - 17))
        );
    }

    #[test]
    fn instants_follow_the_observer_offset() {
        let ts = Timestamp::parse("2026-10-16T23:30:00Z").unwrap();
        assert_eq!(ts.date_at(offset!(UTC)), date!(2026 - 10 - 16));
        assert_eq!(ts.date_at(offset!(+5:30)), date!(2026 - 10 - 17));
    }

    #[test]
    fn bare_dates_never_shift() {
        let ts = Timestamp::Day(date!(2026 - 10 - 17));
        assert_eq!(ts.date_at(offset!(-8)), date!(2026 - 10 - 17));
        assert_eq!(ts.date_at(offset!(+14)), date!(2026 - 10 - 17));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Timestamp>("\"next tuesday\"").is_err());
    }
}
