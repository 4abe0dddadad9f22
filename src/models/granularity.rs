//! Process split granularity.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Policy controlling how consecutive individual issues are grouped into
/// digitization processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One process per individual issue
    Issues,
    /// One process per day of appearance
    Days,
    /// One process per week
    Weeks,
    /// One process per month
    Months,
    /// One process per quarter
    Quarters,
    /// One process per (business) year
    Years,
}

impl Granularity {
    /// All granularities, coarsest last.
    pub const ALL: [Granularity; 6] = [
        Granularity::Issues,
        Granularity::Days,
        Granularity::Weeks,
        Granularity::Months,
        Granularity::Quarters,
        Granularity::Years,
    ];

    /// Lowercase name, as used in XML attributes and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Issues => "issues",
            Granularity::Days => "days",
            Granularity::Weeks => "weeks",
            Granularity::Months => "months",
            Granularity::Quarters => "quarters",
            Granularity::Years => "years",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issues" => Ok(Granularity::Issues),
            "days" => Ok(Granularity::Days),
            "weeks" => Ok(Granularity::Weeks),
            "months" => Ok(Granularity::Months),
            "quarters" => Ok(Granularity::Quarters),
            "years" => Ok(Granularity::Years),
            other => Err(AppError::validation(format!(
                "unknown granularity '{other}'"
            ))),
        }
    }
}
