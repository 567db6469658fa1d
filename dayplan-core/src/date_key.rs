//! Canonical `YYYY-MM-DD` keys addressing one day in a user's calendar.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Years a [`DateKey`] can hold. Outside this range the key would not be
/// exactly four year digits.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Format a date as `YYYY-MM-DD` using its own calendar fields.
///
/// Year is padded to 4 digits, month (1-based) and day to 2. Only dates
/// between [`MIN_YEAR`] and [`MAX_YEAR`] come out in that shape; use
/// [`DateKey`] to get the check.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// A calendar day, displayed and stored as its `YYYY-MM-DD` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Fails for years outside `MIN_YEAR..=MAX_YEAR`.
    pub fn new(date: NaiveDate) -> PlannerResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(PlannerError::InvalidDate(date.to_string()));
        }
        Ok(DateKey(date))
    }

    /// Today in the machine's local timezone.
    pub fn today() -> PlannerResult<Self> {
        Self::from_local(&Local::now())
    }

    /// Key for the calendar day `datetime` falls on in its own timezone.
    /// No conversion to UTC happens here.
    pub fn from_local<Tz: TimeZone>(datetime: &DateTime<Tz>) -> PlannerResult<Self> {
        Self::new(datetime.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format_date(self.0))
    }
}

impl FromStr for DateKey {
    type Err = PlannerError;

    /// Only the canonical zero-padded form is accepted, so `2024-3-5` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| PlannerError::InvalidDate(s.to_string()))?;

        if format_date(date) != s {
            return Err(PlannerError::InvalidDate(s.to_string()));
        }

        Self::new(date)
    }
}

impl TryFrom<String> for DateKey {
    type Error = PlannerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<NaiveDate> for DateKey {
    type Error = PlannerError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date)
    }
}
