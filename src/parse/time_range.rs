use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Separator between start and end in a listing's time cell (en dash).
pub const RANGE_SEPARATOR: char = '–';

/// 12-hour clock with a lowercase suffix, e.g. `2:00pm`.
pub const CLOCK_FORMAT: &str = "%I:%M%P";

/// Start and end of a performance, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum TimeRangeError {
    #[error("no `–` separated start and end in {0:?}")]
    MissingSeparator(String),
    #[error("invalid clock time {0:?}")]
    InvalidClock(String),
    #[error("{0} does not exist in {1}")]
    NonexistentLocalTime(NaiveDateTime, Tz),
}

/// Binds bare clock times to a calendar date in a named zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventClock {
    pub date: NaiveDate,
    pub zone: Tz,
}

impl EventClock {
    pub fn new(date: NaiveDate, zone: Tz) -> Self {
        Self { date, zone }
    }

    /// Clock bound to the current date as seen in `zone`.
    pub fn today(zone: Tz) -> Self {
        let date = Utc::now().with_timezone(&zone).date_naive();
        Self { date, zone }
    }

    /// Parse a `"2:00pm–4:30pm"` cell.
    pub fn parse_range(&self, text: &str) -> Result<TimeRange, TimeRangeError> {
        let parts: Vec<&str> = text.split(RANGE_SEPARATOR).collect();
        let [start, end] = parts.as_slice() else {
            return Err(TimeRangeError::MissingSeparator(text.to_string()));
        };
        self.parse_pair(start, end)
    }

    /// Parse start and end clock times that were already split apart.
    pub fn parse_pair(&self, start: &str, end: &str) -> Result<TimeRange, TimeRangeError> {
        Ok(TimeRange {
            start: self.timestamp(start)?,
            end: self.timestamp(end)?,
        })
    }

    fn timestamp(&self, clock: &str) -> Result<i64, TimeRangeError> {
        let clock = clock.trim();
        let time = NaiveTime::parse_from_str(clock, CLOCK_FORMAT)
            .map_err(|_| TimeRangeError::InvalidClock(clock.to_string()))?;
        let local = self.date.and_time(time);

        // Ambiguous fall-back hours resolve to the first occurrence.
        self.zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .ok_or(TimeRangeError::NonexistentLocalTime(local, self.zone))
    }
}
