//! Block: an interval of time within which a newspaper wasn't suspended.
//!
//! A block carries the inclusive dates of first and last appearance and the
//! issues that appeared during that period. Interruptions in the course of
//! appearance are modeled as boundaries between subsequent blocks; the
//! owning [`Course`](super::Course) keeps blocks date-disjoint.

use std::fmt;

use chrono::NaiveDate;

use super::cache::ProcessCache;
use super::each_day;
use super::{IndividualIssue, Issue};

/// An uninterrupted publication regime holding one or more issues.
#[derive(Debug, Clone)]
pub struct Block {
    /// Handle to the owning course's process cache
    cache: ProcessCache,

    /// Optional identifier to distinguish blocks while a course is built up
    /// from individual appearances. Given a newspaper that changed from
    /// three to six appearances a week without changing its heading, two
    /// variants keep the regimes in separate blocks instead of one combined
    /// block with a multitude of exceptions.
    variant: Option<String>,

    /// First day of the period, inclusive
    first_appearance: Option<NaiveDate>,

    /// Last day of the period, inclusive
    last_appearance: Option<NaiveDate>,

    /// Issues that appeared during this period
    issues: Vec<Issue>,
}

impl Block {
    /// Create an empty block without a variant identifier.
    pub fn new() -> Self {
        Block {
            cache: ProcessCache::new(),
            variant: None,
            first_appearance: None,
            last_appearance: None,
            issues: Vec::new(),
        }
    }

    /// Create an empty block with a variant identifier.
    pub fn with_variant(variant: impl Into<String>) -> Self {
        let mut block = Block::new();
        block.variant = Some(variant.into());
        block
    }

    pub(crate) fn with_variant_opt(variant: Option<String>) -> Self {
        let mut block = Block::new();
        block.variant = variant;
        block
    }

    /// Re-home this block and its issues onto the owning course's cache.
    pub(crate) fn attach(&mut self, cache: ProcessCache) {
        for issue in &mut self.issues {
            issue.attach(cache.clone());
        }
        self.cache = cache;
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Null-safe comparison of the given variant against the assigned one.
    pub fn is_identified_by(&self, variant: Option<&str>) -> bool {
        self.variant.as_deref() == variant
    }

    pub fn first_appearance(&self) -> Option<NaiveDate> {
        self.first_appearance
    }

    pub fn last_appearance(&self) -> Option<NaiveDate> {
        self.last_appearance
    }

    /// Set the day of first appearance. When the last appearance is still
    /// unset it is initialized to the same day, so bounds are always
    /// both-or-neither set.
    ///
    /// Overlap against sibling blocks is checked by the course-level
    /// setters; use those for blocks that live in a course.
    pub fn set_first_appearance(&mut self, first_appearance: NaiveDate) {
        if self.first_appearance != Some(first_appearance) {
            self.cache.clear();
        }
        self.first_appearance = Some(first_appearance);
        if self.last_appearance.is_none() {
            self.last_appearance = Some(first_appearance);
        }
    }

    /// Set the day of last appearance, initializing the first appearance to
    /// the same day when unset.
    pub fn set_last_appearance(&mut self, last_appearance: NaiveDate) {
        if self.last_appearance != Some(last_appearance) {
            self.cache.clear();
        }
        self.last_appearance = Some(last_appearance);
        if self.first_appearance.is_none() {
            self.first_appearance = Some(last_appearance);
        }
    }

    /// Set both bounds at once.
    pub fn set_publication_period(&mut self, first_appearance: NaiveDate, last_appearance: NaiveDate) {
        if self.first_appearance != Some(first_appearance)
            || self.last_appearance != Some(last_appearance)
        {
            self.cache.clear();
        }
        self.first_appearance = Some(first_appearance);
        self.last_appearance = Some(last_appearance);
    }

    /// Whether this block's range conflicts with the candidate range
    /// `[from, until]`. The boundary semantics are deliberate: two blocks
    /// may share an inclusive edge day in the degenerate equal-single-day
    /// case, and adjacent ranges never conflict.
    pub(crate) fn conflicts(&self, from: NaiveDate, until: NaiveDate) -> bool {
        let (Some(first), Some(last)) = (self.first_appearance, self.last_appearance) else {
            return false;
        };
        first < until && last >= from || last > from && first <= until
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Append an issue to this block, wiring it to the owning cache.
    pub fn add_issue(&mut self, issue: Issue) -> &mut Issue {
        self.clear_processes_if_necessary(&issue);
        let index = self.issues.len();
        self.issues.push(issue);
        self.issues[index].attach(self.cache.clone());
        &mut self.issues[index]
    }

    /// Remove the issue at the given position.
    pub fn remove_issue(&mut self, index: usize) -> Option<Issue> {
        if index >= self.issues.len() {
            return None;
        }
        let issue = self.issues.remove(index);
        self.clear_processes_if_necessary(&issue);
        Some(issue)
    }

    /// A course loaded from a file or already split carries derived process
    /// lists; those are stale once an issue producing appearances in the
    /// current range is added or removed. When the range cannot be
    /// evaluated, the safe way is to drop them too.
    fn clear_processes_if_necessary(&self, issue: &Issue) {
        match (self.first_appearance, self.last_appearance) {
            (Some(first), Some(last)) => {
                if issue.count_individual_issues(first, last) > 0 {
                    self.cache.clear();
                }
            }
            _ => self.cache.clear(),
        }
    }

    pub(crate) fn issue_mut(&mut self, index: usize) -> Option<&mut Issue> {
        self.issues.get_mut(index)
    }

    /// Find an issue by its heading.
    pub fn issue(&self, heading: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.heading() == heading)
    }

    /// Position of the issue with the given heading.
    pub fn issue_index(&self, heading: &str) -> Option<usize> {
        self.issues.iter().position(|issue| issue.heading() == heading)
    }

    /// The first heading that occurs more than once, if any.
    pub fn duplicate_heading(&self) -> Option<&str> {
        for (index, issue) in self.issues.iter().enumerate() {
            if self.issues[..index]
                .iter()
                .any(|other| other.heading() == issue.heading())
            {
                return Some(issue.heading());
            }
        }
        None
    }

    /// Whether the block carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.first_appearance.is_none() && self.last_appearance.is_none() && self.issues.is_empty()
    }

    /// Whether a date comes within the limits of this block. False while
    /// the bounds are unset.
    pub fn is_match(&self, date: NaiveDate) -> bool {
        match (self.first_appearance, self.last_appearance) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }

    /// How many stampings of issues physically appeared, without
    /// materializing them.
    pub fn count_individual_issues(&self) -> u64 {
        let (Some(first), Some(last)) = (self.first_appearance, self.last_appearance) else {
            return 0;
        };
        each_day(first, last)
            .map(|day| self.issues.iter().filter(|issue| issue.is_match(day)).count() as u64)
            .sum()
    }

    /// Materialize the individual issues of one day. `block_index` is this
    /// block's position in the owning course, which becomes part of the
    /// individual issues' identity. When more than one issue matches, the
    /// stampings are numbered 1.. in issue order.
    pub fn individual_issues(&self, block_index: usize, date: NaiveDate) -> Vec<IndividualIssue> {
        if !self.is_match(date) {
            return Vec::new();
        }
        let matching: Vec<usize> = (0..self.issues.len())
            .filter(|&index| self.issues[index].is_match(date))
            .collect();
        let numbered = matching.len() > 1;
        matching
            .into_iter()
            .enumerate()
            .map(|(position, issue_index)| {
                IndividualIssue::new(
                    block_index,
                    issue_index,
                    date,
                    self.issues[issue_index].heading().to_string(),
                    self.variant.clone(),
                    numbered.then(|| position as u32 + 1),
                )
            })
            .collect()
    }

    /// Re-derive the regular days of week of every issue within this
    /// block's interval of time.
    pub fn recalculate_regularity_of_issues(&mut self) {
        let (Some(first), Some(last)) = (self.first_appearance, self.last_appearance) else {
            return;
        };
        for issue in &mut self.issues {
            issue.recalculate_regularity(first, last);
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

// Equality is content based; the cache handle does not take part.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && self.first_appearance == other.first_appearance
            && self.last_appearance == other.last_appearance
            && self.issues == other.issues
    }
}

impl Eq for Block {}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.first_appearance {
            write!(f, "{first}")?;
        }
        write!(f, " - ")?;
        if let Some(last) = self.last_appearance {
            write!(f, "{last}")?;
        }
        write!(f, " [")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{issue}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn january_block() -> Block {
        let mut block = Block::new();
        block.set_publication_period(date(2020, 1, 1), date(2020, 1, 31));
        let mut issue = Issue::with_heading("Morning edition");
        issue.add_day_of_week(Weekday::Mon);
        issue.add_addition(date(2020, 1, 5));
        block.add_issue(issue);
        block
    }

    #[test]
    fn test_bounds_are_both_or_neither() {
        let mut block = Block::new();
        block.set_first_appearance(date(2020, 1, 1));
        assert_eq!(block.last_appearance(), Some(date(2020, 1, 1)));

        let mut block = Block::new();
        block.set_last_appearance(date(2020, 1, 31));
        assert_eq!(block.first_appearance(), Some(date(2020, 1, 31)));
    }

    #[test]
    fn test_conflicts_boundary_semantics() {
        let mut block = Block::new();
        block.set_publication_period(date(2020, 1, 1), date(2020, 1, 5));

        // sharing an inner day conflicts
        assert!(block.conflicts(date(2020, 1, 5), date(2020, 1, 9)));
        // adjacent ranges do not
        assert!(!block.conflicts(date(2020, 1, 6), date(2020, 1, 9)));
        // neither do earlier adjacent ranges
        assert!(!block.conflicts(date(2019, 12, 1), date(2019, 12, 31)));
        // the degenerate equal-single-day case is allowed
        let mut single = Block::new();
        single.set_publication_period(date(2020, 1, 5), date(2020, 1, 5));
        assert!(!single.conflicts(date(2020, 1, 5), date(2020, 1, 5)));
        // an unbounded block never conflicts
        assert!(!Block::new().conflicts(date(2020, 1, 1), date(2020, 12, 31)));
    }

    #[test]
    fn test_count_individual_issues_january_2020() {
        let block = january_block();
        // Mondays Jan 6, 13, 20, 27 plus the Sunday addition on Jan 5
        assert_eq!(block.count_individual_issues(), 5);
    }

    #[test]
    fn test_individual_issues_outside_range_is_empty() {
        let block = january_block();
        assert!(block.individual_issues(0, date(2020, 2, 3)).is_empty());
    }

    #[test]
    fn test_individual_issues_sorting_numbers() {
        let mut block = january_block();
        let mut evening = Issue::with_heading("Evening edition");
        evening.add_day_of_week(Weekday::Mon);
        block.add_issue(evening);

        // two issues match a Monday and are numbered
        let monday = block.individual_issues(0, date(2020, 1, 6));
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].sorting_number(), Some(1));
        assert_eq!(monday[1].sorting_number(), Some(2));

        // the Sunday addition matches only one issue; no numbering
        let sunday = block.individual_issues(0, date(2020, 1, 5));
        assert_eq!(sunday.len(), 1);
        assert_eq!(sunday[0].sorting_number(), None);
    }

    #[test]
    fn test_duplicate_heading() {
        let mut block = Block::new();
        block.add_issue(Issue::with_heading("A"));
        block.add_issue(Issue::with_heading("B"));
        assert_eq!(block.duplicate_heading(), None);
        block.add_issue(Issue::with_heading("A"));
        assert_eq!(block.duplicate_heading(), Some("A"));
    }

    #[test]
    fn test_issue_lookup() {
        let block = january_block();
        assert!(block.issue("Morning edition").is_some());
        assert_eq!(block.issue_index("Morning edition"), Some(0));
        assert!(block.issue("Evening edition").is_none());
    }
}
