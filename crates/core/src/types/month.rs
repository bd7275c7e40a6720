//! Calendar month used to label sales reports.

use core::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`YearMonth`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum YearMonthError {
    /// Input is not of the form `YYYY-MM`.
    #[error("'{0}' is not a month in YYYY-MM form")]
    Format(String),
    /// Month component is outside 1-12.
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
}

/// A year and month such as `2024-06`.
///
/// Orders chronologically, which is also the order of its `YYYY-MM` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build from components.
    ///
    /// # Errors
    ///
    /// Returns [`YearMonthError::MonthOutOfRange`] if `month` is not 1-12.
    pub const fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if month == 0 || month > 12 {
            return Err(YearMonthError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Parse `YYYY-MM`.
    ///
    /// # Errors
    ///
    /// Returns a [`YearMonthError`] if the input is malformed.
    pub fn parse(input: &str) -> Result<Self, YearMonthError> {
        let input = input.trim();
        let format_err = || YearMonthError::Format(input.to_owned());

        let (year, month) = input.split_once('-').ok_or_else(format_err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format_err());
        }
        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: u32 = month.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = YearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let month = YearMonth::parse("2024-06").unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 6);
        assert_eq!(month.to_string(), "2024-06");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(YearMonth::parse("2024/06"), Err(YearMonthError::Format(_))));
        assert!(matches!(YearMonth::parse("24-06"), Err(YearMonthError::Format(_))));
        assert!(matches!(YearMonth::parse("2024-6"), Err(YearMonthError::Format(_))));
        assert_eq!(
            YearMonth::parse("2024-13"),
            Err(YearMonthError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_ordering_is_chronological() {
        let april = YearMonth::parse("2024-04").unwrap();
        let june = YearMonth::parse("2024-06").unwrap();
        let last_dec = YearMonth::parse("2023-12").unwrap();
        assert!(last_dec < april);
        assert!(april < june);
    }

    #[test]
    fn test_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(YearMonth::of(date).to_string(), "2024-07");
        assert_eq!(YearMonth::of(date).first_day(), Some(date));
    }
}
