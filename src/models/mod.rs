//! Data model of a newspaper's course of appearance.

mod block;
mod cache;
mod config;
mod course;
mod granularity;
mod individual;
mod issue;
mod month_day;

pub use block::Block;
pub use config::{Config, SplitConfig, TitleConfig};
pub use course::Course;
pub use granularity::Granularity;
pub use individual::IndividualIssue;
pub use issue::Issue;
pub use month_day::MonthDay;

pub(crate) use cache::{CheckedCache, ProcessCache};

use chrono::NaiveDate;

/// Iterate every calendar day from `first` to `last`, both inclusive.
pub(crate) fn each_day(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(first), |day| day.succ_opt()).take_while(move |day| *day <= last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_day_is_inclusive() {
        let first = NaiveDate::from_ymd_opt(2020, 2, 27).unwrap();
        let last = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let days: Vec<_> = each_day(first, last).collect();
        assert_eq!(days.len(), 4); // leap year: Feb 27, 28, 29, Mar 1
        assert_eq!(days.first(), Some(&first));
        assert_eq!(days.last(), Some(&last));
    }

    #[test]
    fn test_each_day_single_day() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(each_day(day, day).count(), 1);
    }
}
