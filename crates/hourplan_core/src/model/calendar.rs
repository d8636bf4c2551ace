//! Calendar date keys and month navigation.
//!
//! # Responsibility
//! - Form `YYYY-MM-DD` allocation keys from local calendar fields.
//! - Provide the visible-month cursor used by the calendar grid.
//!
//! # Invariants
//! - A `DayKey` is always built from year/month/day fields, never from a
//!   UTC timestamp, so one grid cell maps to one key at any time of day.
//! - `MonthCursor::month` is always within `1..=12`.

use chrono::{Datelike, Local, NaiveDate};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Column headers for the Sunday-first calendar grid.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar day used as the unique allocation key.
///
/// Serialized as an ISO `YYYY-MM-DD` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a key from local calendar fields; `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's key in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(value.trim(), DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DayKeyParseError(value.to_string()))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Input was not a `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayKeyParseError(pub String);

impl Display for DayKeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid calendar date `{}`; expected YYYY-MM-DD", self.0)
    }
}

impl Error for DayKeyParseError {}

/// Visible-month navigation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn containing(day: DayKey) -> Self {
        Self {
            year: day.0.year(),
            month: day.0.month(),
        }
    }

    /// Month containing today's local date.
    pub fn current() -> Self {
        Self::containing(DayKey::today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Moves by whole months; negative values move backwards.
    pub fn shift(&self, months: i32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(months);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        Self {
            year: year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            month,
        }
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Day `n` of this month, or `None` past the month end.
    pub fn day(&self, day: u32) -> Option<DayKey> {
        DayKey::from_ymd(self.year, self.month, day)
    }

    /// Every day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        (1..=self.days_in_month()).filter_map(move |day| self.day(day))
    }

    pub fn contains(&self, day: DayKey) -> bool {
        Self::containing(day) == *self
    }

    /// Number of empty grid cells before day 1 in a Sunday-first week.
    pub fn leading_blanks(&self) -> u32 {
        self.day(1)
            .map_or(0, |first| first.0.weekday().num_days_from_sunday())
    }

    /// Display title such as `March 2024`.
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl Display for MonthCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::{DayKey, MonthCursor};

    #[test]
    fn day_key_round_trips_iso_text() {
        let key: DayKey = "2024-03-01".parse().unwrap();
        assert_eq!(key, DayKey::from_ymd(2024, 3, 1).unwrap());
        assert_eq!(key.to_string(), "2024-03-01");
        assert_eq!(serde_json::to_value(key).unwrap(), "2024-03-01");
    }

    #[test]
    fn day_key_rejects_impossible_dates() {
        assert!("2023-02-29".parse::<DayKey>().is_err());
        assert!("not-a-date".parse::<DayKey>().is_err());
        assert!(DayKey::from_ymd(2024, 13, 1).is_none());
        assert!(serde_json::from_str::<DayKey>("\"2024-00-10\"").is_err());
    }

    #[test]
    fn month_cursor_wraps_year_boundaries() {
        let january = MonthCursor::new(2024, 1).unwrap();
        assert_eq!(january.previous(), MonthCursor::new(2023, 12).unwrap());
        assert_eq!(january.previous().next(), january);
        assert_eq!(january.shift(25), MonthCursor::new(2026, 2).unwrap());
        assert_eq!(january.shift(-13), MonthCursor::new(2022, 12).unwrap());
        assert!(MonthCursor::new(2024, 0).is_none());
    }

    #[test]
    fn month_cursor_reports_grid_shape() {
        // 2024-03-01 is a Friday.
        let march = MonthCursor::new(2024, 3).unwrap();
        assert_eq!(march.days_in_month(), 31);
        assert_eq!(march.leading_blanks(), 5);
        assert_eq!(march.label(), "March 2024");
        assert_eq!(march.days().count(), 31);

        assert_eq!(MonthCursor::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthCursor::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(2000, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn contains_matches_only_same_month() {
        let march = MonthCursor::new(2024, 3).unwrap();
        assert!(march.contains(DayKey::from_ymd(2024, 3, 31).unwrap()));
        assert!(!march.contains(DayKey::from_ymd(2024, 4, 1).unwrap()));
        assert!(march.day(32).is_none());
    }
}
