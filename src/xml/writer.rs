//! Serializing a course of appearance to its XML representation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::describe;
use crate::error::Result;
use crate::models::{Course, IndividualIssue, MonthDay};
use crate::utils::join_quoting;

use super::{
    ATTRIBUTE_AFTER, ATTRIBUTE_DATE, ATTRIBUTE_ISSUE_HEADING, ATTRIBUTE_VARIANT,
    ATTRIBUTE_YEAR_BEGIN, ATTRIBUTE_YEAR_TERM, ELEMENT_APPEARED, ELEMENT_BLOCK, ELEMENT_COURSE,
    ELEMENT_DESCRIPTION, ELEMENT_PROCESS, ELEMENT_PROCESSES,
};

/// Serialize a course of appearance to an XML file.
pub fn write_course_to_file(course: &Course, path: impl AsRef<Path>) -> Result<()> {
    let xml = write_course(course)?;
    fs::write(&path, xml)?;
    log::debug!("Wrote course to {:?}", path.as_ref());
    Ok(())
}

/// Serialize a course of appearance to XML.
///
/// The file stores the process grouping; a course that has not been split
/// is written as a single process holding every appearance, so no data is
/// lost.
pub fn write_course(course: &Course) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut course_node = BytesStart::new(ELEMENT_COURSE);
    if course.year_start() != MonthDay::FIRST_OF_JANUARY {
        let year_begin = course.year_start().to_string();
        course_node.push_attribute((ATTRIBUTE_YEAR_BEGIN, year_begin.as_str()));
    }
    if !course.year_name().is_empty() {
        course_node.push_attribute((ATTRIBUTE_YEAR_TERM, course.year_name()));
    }
    writer.write_event(Event::Start(course_node))?;

    let description = describe::as_readable_text(course).join("\n\n");
    writer.write_event(Event::Start(BytesStart::new(ELEMENT_DESCRIPTION)))?;
    writer.write_event(Event::Text(BytesText::new(&description)))?;
    writer.write_event(Event::End(BytesEnd::new(ELEMENT_DESCRIPTION)))?;

    let processes = match course.number_of_processes() {
        0 => {
            let all = course.individual_issues();
            if all.is_empty() { Vec::new() } else { vec![all] }
        }
        _ => course.processes(),
    };

    writer.write_event(Event::Start(BytesStart::new(ELEMENT_PROCESSES)))?;
    let mut after_declared: HashSet<(usize, String)> = HashSet::new();
    for process in &processes {
        writer.write_event(Event::Start(BytesStart::new(ELEMENT_PROCESS)))?;
        write_process(&mut writer, course, process, &mut after_declared)?;
        writer.write_event(Event::End(BytesEnd::new(ELEMENT_PROCESS)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(ELEMENT_PROCESSES)))?;

    writer.write_event(Event::End(BytesEnd::new(ELEMENT_COURSE)))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Write one process, grouping consecutive appearances of the same block
/// under a shared block element.
fn write_process(
    writer: &mut Writer<Vec<u8>>,
    course: &Course,
    process: &[IndividualIssue],
    after_declared: &mut HashSet<(usize, String)>,
) -> Result<()> {
    let mut open_block: Option<usize> = None;
    for individual in process {
        let index = individual.block_index();
        if open_block != Some(index) {
            if open_block.is_some() {
                writer.write_event(Event::End(BytesEnd::new(ELEMENT_BLOCK)))?;
            }
            let mut block_node = BytesStart::new(ELEMENT_BLOCK);
            let ordinal = (index + 1).to_string();
            block_node.push_attribute((ATTRIBUTE_VARIANT, ordinal.as_str()));
            writer.write_event(Event::Start(block_node))?;
            open_block = Some(index);
        }

        let mut appeared = BytesStart::new(ELEMENT_APPEARED);
        if !individual.heading().is_empty() {
            appeared.push_attribute((ATTRIBUTE_ISSUE_HEADING, individual.heading()));
        }
        let date = individual.date().to_string();
        appeared.push_attribute((ATTRIBUTE_DATE, date.as_str()));

        let declaration = (index, individual.heading().to_string());
        if !after_declared.contains(&declaration) {
            let before = course.issues_before(individual);
            if !before.is_empty() {
                let after = join_quoting(before.iter().map(String::as_str));
                appeared.push_attribute((ATTRIBUTE_AFTER, after.as_str()));
            }
            after_declared.insert(declaration);
        }
        writer.write_event(Event::Empty(appeared))?;
    }
    if open_block.is_some() {
        writer.write_event(Event::End(BytesEnd::new(ELEMENT_BLOCK)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use crate::models::Block;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_empty_course_writes_empty_processes() {
        let xml = write_course(&Course::new()).unwrap();
        assert!(xml.contains("<processes>") || xml.contains("<processes/>"));
        assert!(!xml.contains("<process>"));
    }

    #[test]
    fn test_after_attribute_is_declared_once() {
        let mut course = Course::new();
        let mut block = Block::new();
        block.set_publication_period(date(2020, 1, 6), date(2020, 1, 13));
        let index = course.append(block).unwrap();
        course
            .add_issue(index, "First")
            .unwrap()
            .add_day_of_week(Weekday::Mon);
        course
            .add_issue(index, "Second")
            .unwrap()
            .add_day_of_week(Weekday::Mon);

        let xml = write_course(&course).unwrap();
        assert_eq!(xml.matches("after=\"First\"").count(), 1);
    }

    #[test]
    fn test_heading_attribute_omitted_when_blank() {
        let mut course = Course::new();
        let mut block = Block::new();
        block.set_publication_period(date(2020, 1, 6), date(2020, 1, 6));
        let index = course.append(block).unwrap();
        course
            .add_issue(index, "")
            .unwrap()
            .add_addition(date(2020, 1, 6));

        let xml = write_course(&course).unwrap();
        assert!(xml.contains(r#"<appeared date="2020-01-06"/>"#));
        assert!(!xml.contains("issue="));
    }
}
