//! Week and deadline arithmetic.
//!
//! Weeks are identified by their Monday. Preferences for a week close at a
//! fixed local time a configurable number of days before that Monday.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Parses a strict `YYYY-MM-DD` date that must fall on a Monday.
pub fn parse_week_start(raw: &str) -> Result<NaiveDate, ValidationError> {
    if raw.len() != 10 {
        return Err(ValidationError::InvalidDate(raw.to_string()));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
    ensure_monday(date)
}

pub fn ensure_monday(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if date.weekday() == Weekday::Mon {
        Ok(date)
    } else {
        Err(ValidationError::NotMonday(date))
    }
}

/// Monday of the week `weeks` weeks before `week`.
pub fn weeks_before(week: NaiveDate, weeks: u32) -> NaiveDate {
    week.checked_sub_days(Days::new(u64::from(weeks) * 7))
        .unwrap_or(NaiveDate::MIN)
}

/// When preference submission for a week closes.
///
/// The default (5 days before, 17:00) lands on the Wednesday of the
/// previous week.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeadlinePolicy {
    pub days_before: u32,
    #[serde(with = "types::hhmm")]
    pub cutoff: NaiveTime,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            days_before: 5,
            cutoff: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl DeadlinePolicy {
    pub fn deadline_for(&self, week_start: NaiveDate) -> NaiveDateTime {
        week_start
            .checked_sub_days(Days::new(u64::from(self.days_before)))
            .unwrap_or(NaiveDate::MIN)
            .and_time(self.cutoff)
    }

    /// Submissions are accepted strictly before the deadline.
    pub fn is_open(&self, week_start: NaiveDate, now: NaiveDateTime) -> bool {
        now < self.deadline_for(week_start)
    }
}
