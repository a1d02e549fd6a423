// SPDX-License-Identifier: MIT

//!
//! The epiglobe calendar date type
//!

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// The textual format used for dates everywhere (datasets, date inputs, logs)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can arise in relation to a [`CalendarDate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The text is not a `YYYY-MM-DD` date
    #[error("`{0}` is not a valid YYYY-MM-DD date")]
    Unparseable(String),

    /// The year/month/day combination does not exist
    #[error("{0}-{1}-{2} is not a valid calendar date")]
    InvalidYmd(i32, u32, u32),
}

/// A day in the proleptic Gregorian calendar.
///
/// Displays (and serialises) as `YYYY-MM-DD`, which is also the format of the
/// browser's date input and of the dataset.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display)]
#[display("{}", _0.format(DATE_FORMAT))]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Create a date from its year, month (1-12) and day (1-31)
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::InvalidYmd(year, month, day))
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(text: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateError::Unparseable(text.to_string()))
    }

    /// Number of days from `earlier` to `self` (negative if `self` is earlier)
    pub fn days_since(&self, earlier: CalendarDate) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    /// The date `days` days later (or earlier, if negative), if representable
    pub fn add_days(&self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(TimeDelta::try_days(days)?).map(Self)
    }

    /// The following day, if representable
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The underlying `chrono` date
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        CalendarDate::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse() {
        // Should be ok
        let date = CalendarDate::parse("2020-03-07").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2020, 3, 7));
        assert_eq!(CalendarDate::parse(" 2020-03-07 ").unwrap(), date);

        // Should return error
        assert!(CalendarDate::parse("2020-02-30").is_err());
        assert!(CalendarDate::parse("07/03/2020").is_err());
        assert!(CalendarDate::parse("").is_err());
        assert!(CalendarDate::from_ymd(2021, 2, 29).is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        let date = CalendarDate::from_ymd(2020, 1, 5).unwrap();
        assert_eq!(date.to_string(), "2020-01-05");
    }

    #[test]
    fn day_arithmetic_crosses_months_and_leap_days() {
        let feb_28 = CalendarDate::from_ymd(2020, 2, 28).unwrap();
        let mar_1 = CalendarDate::from_ymd(2020, 3, 1).unwrap();
        assert_eq!(mar_1.days_since(feb_28), 2);
        assert_eq!(feb_28.days_since(mar_1), -2);
        assert_eq!(feb_28.add_days(2), Some(mar_1));
        assert_eq!(feb_28.succ().unwrap().to_string(), "2020-02-29");
    }

    #[test]
    fn serde_uses_iso_strings() {
        let date: CalendarDate = serde_json::from_str(r#""2020-12-31""#).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), r#""2020-12-31""#);
        assert!(serde_json::from_str::<CalendarDate>(r#""2020-13-01""#).is_err());
    }
}
