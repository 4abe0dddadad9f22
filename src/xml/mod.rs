//! XML interchange format for courses of appearance.
//!
//! The format stores the course as the list of processes it has been split
//! into; each process lists the appeared issue stampings grouped by block.
//! Loading replays those appearances and re-derives the regular appearance
//! pattern, so a written file can be loaded back without loss.

mod reader;
mod writer;

pub use reader::{read_course, read_course_from_file};
pub use writer::{write_course, write_course_to_file};

/// Root element of the interchange format.
pub(crate) const ELEMENT_COURSE: &str = "course";
/// Human-readable summary, informative only and skipped on load.
pub(crate) const ELEMENT_DESCRIPTION: &str = "description";
pub(crate) const ELEMENT_PROCESSES: &str = "processes";
pub(crate) const ELEMENT_PROCESS: &str = "process";
/// Groups the appearances of one block. Named `title` for compatibility
/// with files written when blocks were called titles.
pub(crate) const ELEMENT_BLOCK: &str = "title";
pub(crate) const ELEMENT_APPEARED: &str = "appeared";

/// Block variant identifier, written as the 1-based block ordinal.
pub(crate) const ATTRIBUTE_VARIANT: &str = "index";
pub(crate) const ATTRIBUTE_ISSUE_HEADING: &str = "issue";
pub(crate) const ATTRIBUTE_DATE: &str = "date";
/// Headings of the issues sorted before this one, space separated with
/// quoting. Declared once per block and issue.
pub(crate) const ATTRIBUTE_AFTER: &str = "after";
/// First day of the (business) year as `--MM-DD`; absent means January 1.
pub(crate) const ATTRIBUTE_YEAR_BEGIN: &str = "yearBegin";
/// Name of the year, such as "business year".
pub(crate) const ATTRIBUTE_YEAR_TERM: &str = "yearTerm";
