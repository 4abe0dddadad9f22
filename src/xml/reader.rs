//! Loading a course of appearance from its XML representation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AppError, Result};
use crate::models::{Course, IndividualIssue, MonthDay};
use crate::utils::split_at_spaces;

use super::{
    ATTRIBUTE_AFTER, ATTRIBUTE_DATE, ATTRIBUTE_ISSUE_HEADING, ATTRIBUTE_VARIANT,
    ATTRIBUTE_YEAR_BEGIN, ATTRIBUTE_YEAR_TERM, ELEMENT_APPEARED, ELEMENT_BLOCK, ELEMENT_COURSE,
    ELEMENT_PROCESS, ELEMENT_PROCESSES,
};

/// Load a course of appearance from an XML file.
pub fn read_course_from_file(path: impl AsRef<Path>) -> Result<Course> {
    let content = fs::read_to_string(&path)?;
    log::debug!("Loading course from {:?}", path.as_ref());
    read_course(&content)
}

/// Parse a course of appearance from its XML representation.
///
/// The stored individual appearances are replayed into blocks and issues,
/// keeping the process grouping of the file; afterwards the regular days of
/// week are re-derived from the resulting mass of additions.
pub fn read_course(xml: &str) -> Result<Course> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut course = Course::new();
    // suspend process invalidation while the appearances are replayed
    course.set_processes_volatile(false);

    let mut seen_course = false;
    let mut seen_processes = false;
    let mut in_course = false;
    let mut in_processes = false;
    let mut in_process = false;
    let mut variant: Option<String> = None;

    let mut processes: Vec<Vec<IndividualIssue>> = Vec::new();
    let mut process: Vec<IndividualIssue> = Vec::new();
    // per date, position of the latest stamping: (process, position in it)
    let mut last_issue_for_date: HashMap<NaiveDate, (usize, usize)> = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                match element.local_name().as_ref() {
                    name if name == ELEMENT_COURSE.as_bytes() && !in_course => {
                        seen_course = true;
                        in_course = true;
                        read_course_attributes(&element, &mut course)?;
                    }
                    name if name == ELEMENT_PROCESSES.as_bytes() && in_course => {
                        seen_processes = true;
                        in_processes = true;
                    }
                    name if name == ELEMENT_PROCESS.as_bytes() && in_processes => {
                        in_process = true;
                    }
                    name if name == ELEMENT_BLOCK.as_bytes() && in_process => {
                        variant = attribute(&element, ATTRIBUTE_VARIANT)?;
                    }
                    name if name == ELEMENT_APPEARED.as_bytes() && in_process => {
                        let mut individual = read_appeared(&element, &mut course, &variant)?;
                        if let Some(&(in_process_list, position)) =
                            last_issue_for_date.get(&individual.date())
                        {
                            let previous = if in_process_list == processes.len() {
                                &mut process[position]
                            } else {
                                &mut processes[in_process_list][position]
                            };
                            let number = match previous.sorting_number() {
                                Some(number) => number,
                                None => {
                                    previous.set_sorting_number(1);
                                    1
                                }
                            };
                            individual.set_sorting_number(number + 1);
                        }
                        last_issue_for_date
                            .insert(individual.date(), (processes.len(), process.len()));
                        process.push(individual);
                    }
                    _ => {}
                }
            }
            Event::End(element) => match element.local_name().as_ref() {
                name if name == ELEMENT_COURSE.as_bytes() => in_course = false,
                name if name == ELEMENT_PROCESSES.as_bytes() => in_processes = false,
                name if name == ELEMENT_PROCESS.as_bytes() => {
                    in_process = false;
                    processes.push(std::mem::take(&mut process));
                }
                name if name == ELEMENT_BLOCK.as_bytes() => variant = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_course {
        return Err(AppError::MissingElement(ELEMENT_COURSE));
    }
    if !seen_processes {
        return Err(AppError::MissingElement(ELEMENT_PROCESSES));
    }

    for finished in processes {
        course.push_process(finished);
    }
    course.recalculate_regularity_of_issues();
    course.set_processes_volatile(true);
    log::debug!(
        "Loaded {} blocks, {} processes",
        course.len(),
        course.number_of_processes()
    );
    Ok(course)
}

fn read_course_attributes(element: &BytesStart<'_>, course: &mut Course) -> Result<()> {
    if let Some(year_begin) = attribute(element, ATTRIBUTE_YEAR_BEGIN)? {
        course.set_year_start(year_begin.parse::<MonthDay>()?);
    }
    if let Some(year_name) = attribute(element, ATTRIBUTE_YEAR_TERM)? {
        course.set_year_name(year_name);
    }
    Ok(())
}

fn read_appeared(
    element: &BytesStart<'_>,
    course: &mut Course,
    variant: &Option<String>,
) -> Result<IndividualIssue> {
    let heading = attribute(element, ATTRIBUTE_ISSUE_HEADING)?.unwrap_or_default();
    let date: NaiveDate = attribute(element, ATTRIBUTE_DATE)?
        .ok_or(AppError::MissingAttribute(ATTRIBUTE_DATE))?
        .parse()?;
    let before = match attribute(element, ATTRIBUTE_AFTER)? {
        Some(after) => split_at_spaces(&after),
        None => Vec::new(),
    };
    course.add_addition(variant.as_deref(), &before, &heading, date)
}

/// Fetch an attribute by name, unescaped, or `None` when absent.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
