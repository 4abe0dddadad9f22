//! Month-day value type for business year starts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::AppError;

/// A day of the year without a year, marking where a (business) year begins.
///
/// The textual form is `--MM-DD`, as used by the `yearBegin` XML attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// January the 1st, the default year start.
    pub const FIRST_OF_JANUARY: MonthDay = MonthDay { month: 1, day: 1 };

    /// Create a month-day, validated against a leap year calendar so that
    /// February 29 is representable.
    pub fn new(month: u32, day: u32) -> crate::error::Result<Self> {
        match NaiveDate::from_ymd_opt(2000, month, day) {
            Some(_) => Ok(MonthDay { month, day }),
            None => Err(AppError::validation(format!(
                "invalid month-day --{month:02}-{day:02}"
            ))),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Anchor this month-day in a calendar year. February 29 falls back to
    /// February 28 in non-leap years.
    pub fn at_year(&self, year: i32) -> NaiveDate {
        let mut day = self.day;
        loop {
            if let Some(date) = NaiveDate::from_ymd_opt(year, self.month, day) {
                return date;
            }
            // day 1 of any month is always valid, so this terminates
            day -= 1;
        }
    }
}

impl Default for MonthDay {
    fn default() -> Self {
        Self::FIRST_OF_JANUARY
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("--").unwrap_or(s);
        let invalid = || AppError::validation(format!("invalid month-day '{s}'"));
        let (month, day) = trimmed.split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        MonthDay::new(month, day)
    }
}
