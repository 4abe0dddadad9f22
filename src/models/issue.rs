//! Issue: the regular appearance pattern of one newspaper edition.
//!
//! Newspapers, especially bigger ones, can have several issues that differ in
//! time of publication (morning issue, evening issue), geographic
//! distribution, or days of appearance (weekday issue Mon-Fri, weekend issue
//! Sat). An issue is described by the days of week it regularly appeared on,
//! plus date-level exceptions in both directions: additions (appeared despite
//! not being a regular day) and exclusions (a regular day it didn't appear,
//! i.e. holidays).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

use super::cache::ProcessCache;
use super::each_day;

/// ISO weekday number of Monday.
pub(crate) const MONDAY: u8 = 1;
/// ISO weekday number of Sunday.
pub(crate) const SUNDAY: u8 = 7;

/// Convert an ISO weekday number (1 = Monday .. 7 = Sunday) to a [`Weekday`].
pub(crate) fn weekday_from_iso(number: u8) -> Weekday {
    match number {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// The recurring appearance pattern of one issue type.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Handle to the owning course's process cache, signalled on mutation
    cache: ProcessCache,

    /// Issue name, i.e. "Evening issue"
    heading: String,

    /// Days of week of regular appearance, ISO numbered 1 = Monday .. 7 = Sunday
    days_of_week: BTreeSet<u8>,

    /// Dates with issue on days of week without regular appearance
    additions: BTreeSet<NaiveDate>,

    /// Dates without issue on days of regular appearance
    exclusions: BTreeSet<NaiveDate>,
}

impl Issue {
    /// Create an empty issue without a heading.
    pub fn new() -> Self {
        Self::with_heading("")
    }

    /// Create an empty issue with the given heading.
    pub fn with_heading(heading: impl Into<String>) -> Self {
        Issue {
            cache: ProcessCache::new(),
            heading: heading.into(),
            days_of_week: BTreeSet::new(),
            additions: BTreeSet::new(),
            exclusions: BTreeSet::new(),
        }
    }

    /// Re-home this issue onto the owning course's process cache.
    pub(crate) fn attach(&mut self, cache: ProcessCache) {
        self.cache = cache;
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn set_heading(&mut self, heading: impl Into<String>) {
        let heading = heading.into();
        if self.heading != heading {
            self.cache.clear();
        }
        self.heading = heading;
    }

    /// Days of week of regular appearance, Monday first.
    pub fn days_of_week(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.days_of_week.iter().map(|&n| weekday_from_iso(n))
    }

    /// Whether the issue regularly appears on the given day of week.
    pub fn is_day_of_week(&self, day: Weekday) -> bool {
        self.days_of_week
            .contains(&(day.number_from_monday() as u8))
    }

    /// Add a day of week to the regular appearance pattern.
    pub fn add_day_of_week(&mut self, day: Weekday) -> bool {
        let modified = self.days_of_week.insert(day.number_from_monday() as u8);
        if modified {
            self.cache.clear();
        }
        modified
    }

    /// Remove a day of week from the regular appearance pattern.
    pub fn remove_day_of_week(&mut self, day: Weekday) -> bool {
        let modified = self.days_of_week.remove(&(day.number_from_monday() as u8));
        if modified {
            self.cache.clear();
        }
        modified
    }

    pub fn additions(&self) -> &BTreeSet<NaiveDate> {
        &self.additions
    }

    pub fn exclusions(&self) -> &BTreeSet<NaiveDate> {
        &self.exclusions
    }

    /// Add a date to the set of additions.
    pub fn add_addition(&mut self, addition: NaiveDate) -> bool {
        self.cache.clear();
        self.additions.insert(addition)
    }

    /// Remove a date from the set of additions.
    pub fn remove_addition(&mut self, addition: NaiveDate) -> bool {
        self.cache.clear();
        self.additions.remove(&addition)
    }

    /// Add a date to the set of exclusions.
    pub fn add_exclusion(&mut self, exclusion: NaiveDate) -> bool {
        self.cache.clear();
        self.exclusions.insert(exclusion)
    }

    /// Remove a date from the set of exclusions.
    pub fn remove_exclusion(&mut self, exclusion: NaiveDate) -> bool {
        self.cache.clear();
        self.exclusions.remove(&exclusion)
    }

    /// Whether the issue appeared on the given date, taking into account the
    /// days of regular appearance, the exclusions and the additions.
    pub fn is_match(&self, date: NaiveDate) -> bool {
        self.days_of_week
            .contains(&(date.weekday().number_from_monday() as u8))
            && !self.exclusions.contains(&date)
            || self.additions.contains(&date)
    }

    /// How many stampings of this issue physically appeared in the inclusive
    /// date range, without materializing them.
    pub fn count_individual_issues(
        &self,
        first_appearance: NaiveDate,
        last_appearance: NaiveDate,
    ) -> u64 {
        each_day(first_appearance, last_appearance)
            .filter(|&day| self.is_match(day))
            .count() as u64
    }

    /// Re-derive the days of regular appearance within the given interval.
    ///
    /// For each day of week, the matched dates are weighed against the
    /// unmatched ones. Strictly more matches makes the weekday regular and
    /// turns its unmatched dates into exclusions; otherwise the weekday is
    /// dropped and its matched dates become additions. Ties count as not
    /// regular. This detects the underlying regularity after lots of known
    /// appearances have been recorded one by one as additions.
    pub fn recalculate_regularity(
        &mut self,
        first_appearance: NaiveDate,
        last_appearance: NaiveDate,
    ) {
        let mut appeared: [Vec<NaiveDate>; 7] = Default::default();
        let mut not_appeared: [Vec<NaiveDate>; 7] = Default::default();

        for day in each_day(first_appearance, last_appearance) {
            let slot = (day.weekday().number_from_monday() - 1) as usize;
            if self.is_match(day) {
                appeared[slot].push(day);
            } else {
                not_appeared[slot].push(day);
            }
        }

        let mut remaining_additions = BTreeSet::new();
        let mut remaining_exclusions = BTreeSet::new();
        for day_of_week in MONDAY..=SUNDAY {
            let slot = (day_of_week - 1) as usize;
            if appeared[slot].len() > not_appeared[slot].len() {
                self.days_of_week.insert(day_of_week);
                remaining_exclusions.extend(not_appeared[slot].iter().copied());
            } else {
                self.days_of_week.remove(&day_of_week);
                remaining_additions.extend(appeared[slot].iter().copied());
            }
        }

        self.additions = remaining_additions;
        self.exclusions = remaining_exclusions;
        self.cache.clear();
    }
}

impl Default for Issue {
    fn default() -> Self {
        Self::new()
    }
}

// Equality is content based; the cache handle does not take part.
impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.heading == other.heading
            && self.days_of_week == other.days_of_week
            && self.additions == other.additions
            && self.exclusions == other.exclusions
    }
}

impl Eq for Issue {}

impl fmt::Display for Issue {
    /// Compact pattern form, e.g. `Evening issue (M--T---) +2 -0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.heading)?;
        for (number, letter) in (MONDAY..=SUNDAY).zip("MTWTFSS".chars()) {
            if self.days_of_week.contains(&number) {
                write!(f, "{letter}")?;
            } else {
                write!(f, "-")?;
            }
        }
        write!(f, ") +{} -{}", self.additions.len(), self.exclusions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn monday_issue() -> Issue {
        let mut issue = Issue::with_heading("Morning edition");
        issue.add_day_of_week(Weekday::Mon);
        issue
    }

    #[test]
    fn test_is_match_formula() {
        let mut issue = monday_issue();
        issue.add_addition(date(2020, 1, 5)); // a Sunday
        issue.add_exclusion(date(2020, 1, 13)); // a Monday

        for day in each_day(date(2020, 1, 1), date(2020, 1, 31)) {
            let expected = day == date(2020, 1, 5)
                || (day.weekday() == Weekday::Mon && day != date(2020, 1, 13));
            assert_eq!(issue.is_match(day), expected, "mismatch on {day}");
        }
    }

    #[test]
    fn test_addition_wins_over_exclusion() {
        let mut issue = monday_issue();
        issue.add_exclusion(date(2020, 1, 6));
        issue.add_addition(date(2020, 1, 6));
        assert!(issue.is_match(date(2020, 1, 6)));
    }

    #[test]
    fn test_count_january_2020_example() {
        // Monday issue with one Sunday addition; the expected count is
        // derived from the real calendar, not assumed.
        let mut issue = monday_issue();
        issue.add_addition(date(2020, 1, 5));

        let expected = each_day(date(2020, 1, 1), date(2020, 1, 31))
            .filter(|d| d.weekday() == Weekday::Mon || *d == date(2020, 1, 5))
            .count() as u64;
        assert_eq!(expected, 5); // Mondays Jan 6, 13, 20, 27 plus the addition
        assert_eq!(
            issue.count_individual_issues(date(2020, 1, 1), date(2020, 1, 31)),
            expected
        );
    }

    #[test]
    fn test_recalculate_regularity_majority_vote() {
        // Appearances recorded as raw additions: every Monday in January
        // 2020 except the 13th, and a single Wednesday.
        let mut issue = Issue::with_heading("");
        for day in [6, 20, 27] {
            issue.add_addition(date(2020, 1, day));
        }
        issue.add_addition(date(2020, 1, 8));

        issue.recalculate_regularity(date(2020, 1, 1), date(2020, 1, 31));

        // 3 of 4 Mondays appeared: regular, with the 13th excluded.
        assert!(issue.is_day_of_week(Weekday::Mon));
        assert_eq!(
            issue.exclusions().iter().copied().collect::<Vec<_>>(),
            vec![date(2020, 1, 13)]
        );
        // 1 of 5 Wednesdays appeared: not regular, kept as addition.
        assert!(!issue.is_day_of_week(Weekday::Wed));
        assert_eq!(
            issue.additions().iter().copied().collect::<Vec<_>>(),
            vec![date(2020, 1, 8)]
        );
    }

    #[test]
    fn test_recalculate_regularity_tie_is_not_regular() {
        // Range 2020-01-06 to 2020-01-19 holds exactly two Mondays; one
        // appearance makes a 1:1 tie, which must not become regular.
        let mut issue = Issue::new();
        issue.add_addition(date(2020, 1, 6));
        issue.recalculate_regularity(date(2020, 1, 6), date(2020, 1, 19));
        assert!(!issue.is_day_of_week(Weekday::Mon));
        assert!(issue.additions().contains(&date(2020, 1, 6)));
    }

    #[test]
    fn test_recalculate_regularity_is_idempotent() {
        let mut issue = monday_issue();
        issue.add_addition(date(2020, 1, 5));
        issue.add_exclusion(date(2020, 1, 13));

        let first = date(2020, 1, 1);
        let last = date(2020, 3, 31);
        issue.recalculate_regularity(first, last);
        let once = issue.clone();
        issue.recalculate_regularity(first, last);
        assert_eq!(issue, once);
    }

    #[test]
    fn test_display() {
        let mut issue = monday_issue();
        issue.add_day_of_week(Weekday::Thu);
        assert_eq!(issue.to_string(), "Morning edition (M--T---) +0 -0");
    }
}
