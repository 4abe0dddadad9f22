//! IndividualIssue: one distinguishable physically appeared issue.
//!
//! In opposition, [`Issue`](super::Issue) represents the *type* of issue.
//! Individual issues are materialized transiently during enumeration and
//! never stored; identity is the (block, issue, date) triple within the
//! owning course.

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{Datelike, NaiveDate};

use super::{Granularity, MonthDay};

/// A stamping of an issue on one date.
#[derive(Debug, Clone)]
pub struct IndividualIssue {
    /// Position of the block in the owning course
    block: usize,

    /// Position of the issue within that block
    issue: usize,

    /// Date of appearance
    date: NaiveDate,

    /// Heading of the issue, denormalized for display and export
    heading: String,

    /// Variant of the block, denormalized for display and export
    variant: Option<String>,

    /// Ordinal when several issues share the date
    sorting_number: Option<u32>,
}

impl IndividualIssue {
    pub(crate) fn new(
        block: usize,
        issue: usize,
        date: NaiveDate,
        heading: String,
        variant: Option<String>,
        sorting_number: Option<u32>,
    ) -> Self {
        IndividualIssue {
            block,
            issue,
            date,
            heading,
            variant,
            sorting_number,
        }
    }

    /// Position of the block in the owning course.
    pub fn block_index(&self) -> usize {
        self.block
    }

    /// Position of the issue within its block.
    pub fn issue_index(&self) -> usize {
        self.issue
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn sorting_number(&self) -> Option<u32> {
        self.sorting_number
    }

    pub(crate) fn set_sorting_number(&mut self, sorting_number: u32) {
        self.sorting_number = Some(sorting_number);
    }

    /// An integer that, for a given granularity, is equal for two
    /// neighboring individual issues iff they belong to the same process.
    ///
    /// `year_start` is the first day of the business year: dates before it
    /// count toward the previous year for the week, month, quarter and year
    /// marks.
    pub fn break_mark(&self, granularity: Granularity, year_start: MonthDay) -> i64 {
        const PRIME: i64 = 31;
        match granularity {
            Granularity::Issues => {
                let mut hasher = DefaultHasher::new();
                self.hash(&mut hasher);
                hasher.finish() as i64
            }
            Granularity::Days => i64::from(self.date.num_days_from_ce()),
            Granularity::Weeks => {
                PRIME * self.first_year(year_start) + i64::from(self.date.iso_week().week())
            }
            Granularity::Months => {
                PRIME * self.first_year(year_start) + i64::from(self.date.month())
            }
            Granularity::Quarters => {
                PRIME * self.first_year(year_start) + i64::from((self.date.month() - 1) / 3)
            }
            Granularity::Years => self.first_year(year_start),
        }
    }

    /// The first calendar year of the business year this issue falls in.
    fn first_year(&self, year_start: MonthDay) -> i64 {
        let year = self.date.year();
        if self.date < year_start.at_year(year) {
            i64::from(year) - 1
        } else {
            i64::from(year)
        }
    }

    /// Substitution tokens for templated process title generation.
    ///
    /// Date tokens: `#DAY`, `#MONTH` (two digits), `#YEAR` (four digits),
    /// `#YR` (two-digit year of century), plus `#Issue` for the full
    /// heading and abbreviated heading prefixes of one to four characters
    /// in upper case (`#I` `#IS` `#ISS` `#ISSU`) and lower case
    /// (`#i` `#is` `#iss` `#issu`).
    pub fn generic_fields(&self) -> HashMap<String, String> {
        fn prefix(text: &str, length: usize) -> String {
            text.chars().take(length).collect()
        }

        let upper = self.heading.to_uppercase();
        let lower = self.heading.to_lowercase();
        let mut fields = HashMap::with_capacity(13);
        fields.insert("#DAY".to_string(), format!("{:02}", self.date.day()));
        fields.insert("#I".to_string(), prefix(&upper, 1));
        fields.insert("#i".to_string(), prefix(&lower, 1));
        fields.insert("#IS".to_string(), prefix(&upper, 2));
        fields.insert("#is".to_string(), prefix(&lower, 2));
        fields.insert("#ISS".to_string(), prefix(&upper, 3));
        fields.insert("#iss".to_string(), prefix(&lower, 3));
        fields.insert("#ISSU".to_string(), prefix(&upper, 4));
        fields.insert("#issu".to_string(), prefix(&lower, 4));
        fields.insert("#Issue".to_string(), self.heading.clone());
        fields.insert("#MONTH".to_string(), format!("{:02}", self.date.month()));
        fields.insert("#YEAR".to_string(), format!("{:04}", self.date.year()));
        fields.insert("#YR".to_string(), format!("{:02}", self.date.year().rem_euclid(100)));
        fields
    }
}

// Identity is the (block, issue, date) triple; the denormalized fields and
// the sorting number do not take part.
impl PartialEq for IndividualIssue {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.issue == other.issue && self.date == other.date
    }
}

impl Eq for IndividualIssue {}

impl Hash for IndividualIssue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.block.hash(state);
        self.issue.hash(state);
        self.date.hash(state);
    }
}

impl fmt::Display for IndividualIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.heading.is_empty() {
            write!(f, "{}", self.date)
        } else {
            write!(f, "{}, {}", self.date, self.heading)
        }
    }
}
