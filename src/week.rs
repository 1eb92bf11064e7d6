use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO-8601 calendar week, printed as `YYYY-Www`.
///
/// All per-week state in the store is namespaced by this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    /// Builds a key, rejecting week numbers the ISO year does not have.
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon)?;
        Some(WeekKey { year, week })
    }

    /// The ISO week containing `date`. The week-based year can differ from
    /// the calendar year around New Year (2024-12-30 is `2025-W01`).
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        WeekKey { year: iso.year(), week: iso.week() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid week key {0:?}, expected YYYY-Www")]
pub struct ParseWeekKeyError(String);

impl FromStr for WeekKey {
    type Err = ParseWeekKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseWeekKeyError(s.to_string());
        let (year, week) = s.split_once("-W").ok_or_else(err)?;
        if week.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let week: u32 = week.parse().map_err(|_| err())?;
        WeekKey::new(year, week).ok_or_else(err)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = ParseWeekKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}

/// Week key for the calendar day `now` falls on in its own time zone.
///
/// Only the date part is used, so every instant of one local day maps to the
/// same key regardless of the hour.
pub fn current_week_key<Tz: TimeZone>(now: &DateTime<Tz>) -> WeekKey {
    WeekKey::from_date(now.date_naive())
}

/// Next Monday at `hour:minute` local time that is strictly after `now`.
///
/// When `now` is a Monday at or past that time the following Monday is
/// returned. `None` for an invalid hour/minute, or when the wall-clock time
/// does not exist on that Monday (DST gap).
pub fn next_monday_at<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let today = now.date_naive();
    let days_ahead = (7 - today.weekday().num_days_from_monday()) % 7;

    let at = |date: NaiveDate| now.timezone().from_local_datetime(&date.and_time(time)).earliest();

    let date = today + Duration::days(i64::from(days_ahead));
    let candidate = at(date)?;
    if candidate <= *now {
        return at(date + Duration::days(7));
    }
    Some(candidate)
}
