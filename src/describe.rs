//! Verbal description of a course of appearance.
//!
//! The generated text goes into the description element of the XML file so
//! that a human inspecting the file can check the recorded course without
//! replaying the appearances.

use chrono::{NaiveDate, Weekday};

use crate::models::{Block, Course, Issue};

/// Describe the course of appearance in English prose, one paragraph per
/// block.
pub fn as_readable_text(course: &Course) -> Vec<String> {
    course.blocks().iter().map(block_paragraph).collect()
}

fn block_paragraph(block: &Block) -> String {
    let mut text = match (block.first_appearance(), block.last_appearance()) {
        (Some(first), Some(last)) if first == last => {
            format!("The newspaper appeared on {}.", long_date(first))
        }
        (Some(first), Some(last)) => format!(
            "The newspaper appeared from {} to {}.",
            long_date(first),
            long_date(last)
        ),
        _ => "The newspaper's period of appearance is not yet determined.".to_string(),
    };
    for issue in block.issues() {
        text.push(' ');
        text.push_str(&issue_sentences(issue));
    }
    text
}

fn issue_sentences(issue: &Issue) -> String {
    let subject = if issue.heading().is_empty() {
        "The issue".to_string()
    } else {
        format!("The issue {}", issue.heading())
    };

    let days: Vec<String> = issue
        .days_of_week()
        .map(|day| plural_weekday(day).to_string())
        .collect();
    let mut text = if days.is_empty() {
        format!("{subject} appeared on individual days only.")
    } else {
        format!("{subject} appeared regularly on {}.", join_natural(&days))
    };

    let exclusions: Vec<String> = issue.exclusions().iter().map(|&d| long_date(d)).collect();
    if !exclusions.is_empty() {
        text.push_str(&format!(
            " It did not appear on {}.",
            join_natural(&exclusions)
        ));
    }
    let additions: Vec<String> = issue.additions().iter().map(|&d| long_date(d)).collect();
    if !additions.is_empty() {
        let also = if days.is_empty() { "" } else { " also" };
        text.push_str(&format!(
            " It{also} appeared on {}.",
            join_natural(&additions)
        ));
    }
    text
}

fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

fn plural_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mondays",
        Weekday::Tue => "Tuesdays",
        Weekday::Wed => "Wednesdays",
        Weekday::Thu => "Thursdays",
        Weekday::Fri => "Fridays",
        Weekday::Sat => "Saturdays",
        Weekday::Sun => "Sundays",
    }
}

/// Join items as English prose: "a", "a and b", "a, b and c".
fn join_natural(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        _ => format!(
            "{} and {}",
            items[..items.len() - 1].join(", "),
            items[items.len() - 1]
        ),
    }
}
