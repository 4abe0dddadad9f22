//! Course: the full course of appearance of a newspaper.
//!
//! A course of appearance consists of one or more blocks of time;
//! interruptions are modeled by subsequent blocks. The course is the root
//! aggregate: it owns its blocks by value and all block bound mutation goes
//! through course-level setters, which enforce that blocks stay
//! date-disjoint before any field is updated.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{AppError, Result};

use super::cache::{CheckedCache, ProcessCache};
use super::each_day;
use super::{Block, Granularity, IndividualIssue, Issue, MonthDay};

/// Pages assumed per issue on a weekday, for the page count guess.
const WEEKDAY_PAGES: u64 = 40;
/// Pages assumed per Sunday issue. Most people buy the Sunday issue most
/// often, so advertisers buy the most space on that day.
const SUNDAY_PAGES: u64 = 240;

/// The course of appearance of a newspaper.
#[derive(Debug)]
pub struct Course {
    /// Blocks in insertion order, pairwise date-disjoint
    blocks: Vec<Block>,

    /// Derived process list, shared with blocks and issues for invalidation
    cache: ProcessCache,

    /// Variant to block position lookup, validated on every read
    variant_cache: CheckedCache<Option<String>, usize>,

    /// Name of the year, such as "business year" or "season"
    year_name: String,

    /// First day of the year; typically January 1, but business years,
    /// seasons or school years may start elsewhere
    year_start: MonthDay,
}

impl Course {
    /// Create an empty course.
    pub fn new() -> Self {
        Course {
            blocks: Vec::new(),
            cache: ProcessCache::new(),
            variant_cache: CheckedCache::new(),
            year_name: String::new(),
            year_start: MonthDay::FIRST_OF_JANUARY,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn year_name(&self) -> &str {
        &self.year_name
    }

    pub fn set_year_name(&mut self, year_name: impl Into<String>) {
        self.year_name = year_name.into();
    }

    pub fn year_start(&self) -> MonthDay {
        self.year_start
    }

    pub fn set_year_start(&mut self, year_start: MonthDay) {
        self.year_start = year_start;
    }

    /// Append a block to the end of this course. Fails when the block's
    /// date range overlaps an existing block; the course is unchanged then.
    pub fn append(&mut self, mut block: Block) -> Result<usize> {
        if let (Some(first), Some(last)) = (block.first_appearance(), block.last_appearance()) {
            self.prohibit_overlaps(None, first, last)?;
        }
        block.attach(self.cache.clone());
        if block.count_individual_issues() > 0 {
            self.cache.clear();
        }
        self.blocks.push(block);
        Ok(self.blocks.len() - 1)
    }

    /// Remove the block at the given position, dropping its variant cache
    /// entries and any processes it contributed to.
    pub fn remove(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        let block = self.blocks.remove(index);
        self.variant_cache.remove_index(index);
        if block.count_individual_issues() > 0 {
            self.cache.clear();
        }
        Some(block)
    }

    /// Set the day of first appearance of the block at `index`. The overlap
    /// check runs before anything is updated, so a failure leaves the
    /// course untouched.
    pub fn set_first_appearance(&mut self, index: usize, date: NaiveDate) -> Result<()> {
        let block = self.checked_block(index)?;
        let until = block.last_appearance().unwrap_or(date);
        self.prohibit_overlaps(Some(index), date, until)?;
        self.blocks[index].set_first_appearance(date);
        Ok(())
    }

    /// Set the day of last appearance of the block at `index`.
    pub fn set_last_appearance(&mut self, index: usize, date: NaiveDate) -> Result<()> {
        let block = self.checked_block(index)?;
        let from = block.first_appearance().unwrap_or(date);
        self.prohibit_overlaps(Some(index), from, date)?;
        self.blocks[index].set_last_appearance(date);
        Ok(())
    }

    /// Set both bounds of the block at `index` at once.
    pub fn set_publication_period(
        &mut self,
        index: usize,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<()> {
        self.checked_block(index)?;
        self.prohibit_overlaps(Some(index), first, last)?;
        self.blocks[index].set_publication_period(first, last);
        Ok(())
    }

    /// Add an issue with the given heading to the block at `index`.
    pub fn add_issue(&mut self, index: usize, heading: impl Into<String>) -> Result<&mut Issue> {
        self.checked_block(index)?;
        Ok(self.blocks[index].add_issue(Issue::with_heading(heading)))
    }

    /// Remove an issue from a block.
    pub fn remove_issue(&mut self, block: usize, issue: usize) -> Option<Issue> {
        self.blocks.get_mut(block)?.remove_issue(issue)
    }

    /// Mutable access to an issue. Issue mutators signal the process cache
    /// themselves, so handing out the reference is safe.
    pub fn issue_mut(&mut self, block: usize, issue: usize) -> Option<&mut Issue> {
        self.blocks.get_mut(block)?.issue_mut(issue)
    }

    fn checked_block(&self, index: usize) -> Result<&Block> {
        self.blocks
            .get(index)
            .ok_or_else(|| AppError::validation(format!("no block at index {index}")))
    }

    /// Raise an overlap error if `[from, until]` intersects any block other
    /// than the one at `skip`.
    fn prohibit_overlaps(
        &self,
        skip: Option<usize>,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<()> {
        for (index, other) in self.blocks.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            if other.conflicts(from, until) {
                let (Some(first), Some(last)) = (other.first_appearance(), other.last_appearance())
                else {
                    continue;
                };
                return Err(AppError::overlap(other.variant(), first, last));
            }
        }
        Ok(())
    }

    /// The date the course of appearance starts with, across all blocks.
    pub fn first_appearance(&self) -> Option<NaiveDate> {
        self.blocks.iter().filter_map(Block::first_appearance).min()
    }

    /// The date the course of appearance ends with, across all blocks.
    pub fn last_appearance(&self) -> Option<NaiveDate> {
        self.blocks.iter().filter_map(Block::last_appearance).max()
    }

    /// The first block matching a date. Blocks are disjoint, so there is at
    /// most one.
    pub fn matching_block(&self, date: NaiveDate) -> Option<&Block> {
        self.blocks.iter().find(|block| block.is_match(date))
    }

    /// How many stampings of issues physically appeared, without
    /// materializing them.
    pub fn count_individual_issues(&self) -> u64 {
        self.blocks.iter().map(Block::count_individual_issues).sum()
    }

    /// Materialize every physically appeared issue, walking each calendar
    /// day of the course's full range in order. Duplicates by identity
    /// (block, issue, date) are suppressed while the first-seen order is
    /// preserved.
    pub fn individual_issues(&self) -> Vec<IndividualIssue> {
        let (Some(first), Some(last)) = (self.first_appearance(), self.last_appearance()) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for day in each_day(first, last) {
            for (index, block) in self.blocks.iter().enumerate() {
                for individual in block.individual_issues(index, day) {
                    if seen.insert((
                        individual.block_index(),
                        individual.issue_index(),
                        individual.date(),
                    )) {
                        result.push(individual);
                    }
                }
            }
        }
        result
    }

    /// Headings of the issues ordered before the given individual issue
    /// within its block.
    pub fn issues_before(&self, individual: &IndividualIssue) -> Vec<String> {
        let Some(block) = self.blocks.get(individual.block_index()) else {
            return Vec::new();
        };
        block
            .issues()
            .iter()
            .take(individual.issue_index())
            .map(|issue| issue.heading().to_string())
            .collect()
    }

    /// Split the course into processes at the given granularity: the sorted
    /// sequence of individual issues is walked, and a change of break mark
    /// starts a new process.
    pub fn split_into(&mut self, granularity: Granularity) {
        let mut processes = Vec::new();
        let mut process: Vec<IndividualIssue> = Vec::new();
        let mut last_mark: Option<i64> = None;

        for individual in self.individual_issues() {
            let mark = individual.break_mark(granularity, self.year_start);
            if last_mark.is_some_and(|last| last != mark) && !process.is_empty() {
                processes.push(std::mem::take(&mut process));
            }
            process.push(individual);
            last_mark = Some(mark);
        }
        if !process.is_empty() {
            processes.push(process);
        }
        self.cache.replace(processes);
    }

    /// The processes the course has been split into. Empty when stale or
    /// not yet computed.
    pub fn processes(&self) -> Vec<Vec<IndividualIssue>> {
        self.cache.snapshot()
    }

    pub fn number_of_processes(&self) -> usize {
        self.cache.len()
    }

    /// Drop the derived process list. Necessary when the data structure the
    /// processes were derived from has changed, or when they had only been
    /// added temporarily to write a complete XML file.
    pub fn clear_processes(&self) {
        self.cache.clear();
    }

    pub(crate) fn set_processes_volatile(&self, volatile: bool) {
        self.cache.set_volatile(volatile);
    }

    pub(crate) fn push_process(&self, process: Vec<IndividualIssue>) {
        self.cache.push(process);
    }

    /// Re-derive the regular days of week of every issue of every block.
    pub fn recalculate_regularity_of_issues(&mut self) {
        for block in &mut self.blocks {
            block.recalculate_regularity_of_issues();
        }
    }

    /// A guessed total page count for the digitization project, presuming
    /// 40 pages per issue and Sunday issues at six times that size.
    pub fn guess_total_number_of_pages(&self) -> u64 {
        let mut total = 0;
        for block in &self.blocks {
            let (Some(first), Some(last)) = (block.first_appearance(), block.last_appearance())
            else {
                continue;
            };
            for day in each_day(first, last) {
                for issue in block.issues() {
                    if issue.is_match(day) {
                        total += if day.weekday() == Weekday::Sun {
                            SUNDAY_PAGES
                        } else {
                            WEEKDAY_PAGES
                        };
                    }
                }
            }
        }
        total
    }

    /// The block identified by the given variant, resolved through the
    /// checked cache and falling back to a linear scan.
    fn resolve_block(&mut self, variant: Option<&str>) -> Option<usize> {
        let key = variant.map(str::to_owned);
        let blocks = &self.blocks;
        self.variant_cache.resolve(
            &key,
            |index| {
                blocks
                    .get(*index)
                    .is_some_and(|block| block.is_identified_by(variant))
            },
            || blocks.iter().position(|block| block.is_identified_by(variant)),
        )
    }

    /// Record one appearance: the block identified by `variant` is created
    /// on demand or widened to cover `date`, the issues named in `before`
    /// and the issue itself are created on demand, and the date is added to
    /// the issue's additions.
    ///
    /// Widening a block with regularly appearing issues makes those show up
    /// on the newly covered days too, so this is only used while replaying
    /// stored appearances, before regularity is recalculated.
    pub(crate) fn add_addition(
        &mut self,
        variant: Option<&str>,
        before: &[String],
        heading: &str,
        date: NaiveDate,
    ) -> Result<IndividualIssue> {
        let block_index = match self.resolve_block(variant) {
            Some(index) => {
                let block = &self.blocks[index];
                if block.first_appearance().is_some_and(|first| first > date) {
                    self.set_first_appearance(index, date)?;
                }
                if self.blocks[index]
                    .last_appearance()
                    .is_some_and(|last| last < date)
                {
                    self.set_last_appearance(index, date)?;
                }
                index
            }
            None => {
                let mut block = Block::with_variant_opt(variant.map(str::to_owned));
                block.set_publication_period(date, date);
                self.append(block)?
            }
        };

        for issue_before in before {
            if self.blocks[block_index].issue_index(issue_before).is_none() {
                self.blocks[block_index].add_issue(Issue::with_heading(issue_before.clone()));
            }
        }
        let issue_index = match self.blocks[block_index].issue_index(heading) {
            Some(index) => index,
            None => {
                self.blocks[block_index].add_issue(Issue::with_heading(heading));
                self.blocks[block_index].issues().len() - 1
            }
        };
        if let Some(issue) = self.blocks[block_index].issue_mut(issue_index) {
            issue.add_addition(date);
        }

        Ok(IndividualIssue::new(
            block_index,
            issue_index,
            date,
            heading.to_string(),
            variant.map(str::to_owned),
            None,
        ))
    }
}

impl Default for Course {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn block(first: NaiveDate, last: NaiveDate) -> Block {
        let mut block = Block::new();
        block.set_publication_period(first, last);
        block
    }

    /// One block, January and February 2020, one Monday issue with a
    /// Sunday addition on January 5.
    fn sample_course() -> Course {
        let mut course = Course::new();
        let index = course
            .append(block(date(2020, 1, 1), date(2020, 2, 29)))
            .unwrap();
        let issue = course.add_issue(index, "Morning edition").unwrap();
        issue.add_day_of_week(Weekday::Mon);
        issue.add_addition(date(2020, 1, 5));
        course
    }

    #[test]
    fn test_append_rejects_overlap_and_leaves_state() {
        let mut course = Course::new();
        course
            .append(block(date(2020, 1, 1), date(2020, 3, 31)))
            .unwrap();
        let result = course.append(block(date(2020, 3, 31), date(2020, 6, 30)));
        assert!(matches!(result, Err(AppError::Overlap { .. })));
        assert_eq!(course.len(), 1);

        // adjacent is fine
        course
            .append(block(date(2020, 4, 1), date(2020, 6, 30)))
            .unwrap();
        assert_eq!(course.len(), 2);
    }

    #[test]
    fn test_bound_setters_reject_overlap_and_leave_state() {
        let mut course = Course::new();
        course
            .append(block(date(2020, 1, 1), date(2020, 3, 31)))
            .unwrap();
        let second = course
            .append(block(date(2020, 5, 1), date(2020, 6, 30)))
            .unwrap();

        let result = course.set_first_appearance(second, date(2020, 3, 1));
        assert!(matches!(result, Err(AppError::Overlap { .. })));
        assert_eq!(
            course.block(second).unwrap().first_appearance(),
            Some(date(2020, 5, 1))
        );

        course.set_first_appearance(second, date(2020, 4, 1)).unwrap();
        assert_eq!(
            course.block(second).unwrap().first_appearance(),
            Some(date(2020, 4, 1))
        );
    }

    #[test]
    fn test_global_range_spans_blocks() {
        let mut course = Course::new();
        course
            .append(block(date(2020, 5, 1), date(2020, 6, 30)))
            .unwrap();
        course
            .append(block(date(2020, 1, 1), date(2020, 3, 31)))
            .unwrap();
        assert_eq!(course.first_appearance(), Some(date(2020, 1, 1)));
        assert_eq!(course.last_appearance(), Some(date(2020, 6, 30)));
        assert!(course.matching_block(date(2020, 2, 2)).is_some());
        assert!(course.matching_block(date(2020, 4, 15)).is_none());
    }

    #[test]
    fn test_individual_issues_in_date_order() {
        let course = sample_course();
        let issues = course.individual_issues();
        assert_eq!(issues.len() as u64, course.count_individual_issues());
        for pair in issues.windows(2) {
            assert!(pair[0].date() <= pair[1].date());
        }
        assert_eq!(issues[0].date(), date(2020, 1, 5));
    }

    #[test]
    fn test_split_into_issues_gives_singletons() {
        let mut course = sample_course();
        let total = course.count_individual_issues() as usize;
        course.split_into(Granularity::Issues);
        let processes = course.processes();
        assert_eq!(processes.len(), total);
        assert!(processes.iter().all(|process| process.len() == 1));
    }

    #[test]
    fn test_split_into_months_aligns_to_month_change() {
        let mut course = sample_course();
        course.split_into(Granularity::Months);
        let processes = course.processes();
        assert_eq!(processes.len(), 2);
        assert!(processes[0].iter().all(|i| i.date().month() == 1));
        assert!(processes[1].iter().all(|i| i.date().month() == 2));
    }

    #[test]
    fn test_split_into_years_honors_business_year() {
        let mut course = Course::new();
        let index = course
            .append(block(date(2020, 6, 29), date(2020, 7, 2)))
            .unwrap();
        let issue = course.add_issue(index, "").unwrap();
        for day in [29, 30] {
            issue.add_addition(date(2020, 6, day));
        }
        for day in [1, 2] {
            issue.add_addition(date(2020, 7, day));
        }
        course.set_year_start(MonthDay::new(7, 1).unwrap());
        course.split_into(Granularity::Years);
        assert_eq!(course.number_of_processes(), 2);
    }

    #[test]
    fn test_mutation_invalidates_processes() {
        let mut course = sample_course();
        course.split_into(Granularity::Months);
        assert_eq!(course.number_of_processes(), 2);

        course
            .issue_mut(0, 0)
            .unwrap()
            .add_addition(date(2020, 2, 4));
        assert_eq!(course.number_of_processes(), 0);
    }

    #[test]
    fn test_remove_block_invalidates_processes() {
        let mut course = sample_course();
        course.split_into(Granularity::Months);
        assert!(course.number_of_processes() > 0);
        let removed = course.remove(0).unwrap();
        assert!(removed.count_individual_issues() > 0);
        assert_eq!(course.number_of_processes(), 0);
        assert!(course.remove(5).is_none());
    }

    #[test]
    fn test_add_addition_builds_blocks_and_issues() {
        let mut course = Course::new();
        course
            .add_addition(Some("1"), &[], "Evening", date(2020, 1, 10))
            .unwrap();
        course
            .add_addition(Some("1"), &[], "Evening", date(2020, 1, 2))
            .unwrap();
        course
            .add_addition(Some("2"), &[], "", date(2020, 3, 1))
            .unwrap();

        assert_eq!(course.len(), 2);
        let first = course.block(0).unwrap();
        assert_eq!(first.first_appearance(), Some(date(2020, 1, 2)));
        assert_eq!(first.last_appearance(), Some(date(2020, 1, 10)));
        assert_eq!(first.issues().len(), 1);
        assert_eq!(first.issues()[0].additions().len(), 2);
    }

    #[test]
    fn test_add_addition_respects_before_ordering() {
        let mut course = Course::new();
        course
            .add_addition(
                None,
                &["Morning edition".to_string()],
                "Evening edition",
                date(2020, 1, 2),
            )
            .unwrap();
        let block = course.block(0).unwrap();
        assert_eq!(block.issues()[0].heading(), "Morning edition");
        assert_eq!(block.issues()[1].heading(), "Evening edition");
    }

    #[test]
    fn test_resolve_block_survives_removal() {
        let mut course = Course::new();
        course
            .add_addition(Some("1"), &[], "", date(2020, 1, 1))
            .unwrap();
        course
            .add_addition(Some("2"), &[], "", date(2020, 2, 1))
            .unwrap();
        course.remove(0);

        // the cached position of variant "2" is stale; the checked cache
        // must evict it and rescan
        course
            .add_addition(Some("2"), &[], "", date(2020, 2, 15))
            .unwrap();
        assert_eq!(course.len(), 1);
        assert_eq!(
            course.block(0).unwrap().last_appearance(),
            Some(date(2020, 2, 15))
        );
    }

    #[test]
    fn test_guess_total_number_of_pages() {
        let course = sample_course();
        // Mondays at 40 pages each, one Sunday addition at 240
        let mondays = course
            .individual_issues()
            .iter()
            .filter(|i| i.date().weekday() != Weekday::Sun)
            .count() as u64;
        assert_eq!(
            course.guess_total_number_of_pages(),
            mondays * 40 + 240
        );
    }

    #[test]
    fn test_issues_before() {
        let mut course = Course::new();
        let index = course
            .append(block(date(2020, 1, 1), date(2020, 1, 31)))
            .unwrap();
        course.add_issue(index, "A").unwrap();
        course.add_issue(index, "B").unwrap();
        let individual = IndividualIssue::new(0, 1, date(2020, 1, 6), "B".to_string(), None, None);
        assert_eq!(course.issues_before(&individual), vec!["A".to_string()]);
    }
}
