//! gazette CLI
//!
//! Inspect, validate and split courses of appearance stored as XML.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gazette::{
    describe,
    error::Result,
    models::{Config, Course, Granularity, IndividualIssue},
    xml,
};
use serde::Serialize;

/// gazette - Newspaper Course of Appearance Tool
#[derive(Parser, Debug)]
#[command(
    name = "gazette",
    version,
    about = "Models the course of appearance of historical newspapers"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "gazette.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show summary figures of a course of appearance
    Info {
        /// Course of appearance XML file
        file: PathBuf,
    },

    /// Check a course of appearance file for inconsistencies
    Validate {
        /// Course of appearance XML file
        file: PathBuf,
    },

    /// Print the verbal description of a course of appearance
    Describe {
        /// Course of appearance XML file
        file: PathBuf,
    },

    /// Split a course of appearance into processes
    Split {
        /// Course of appearance XML file
        file: PathBuf,

        /// Granularity: issues, days, weeks, months, quarters or years
        #[arg(short, long)]
        granularity: Option<String>,

        /// Write the split course back to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the process list as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

/// One process in the `split` command output.
#[derive(Debug, Serialize)]
struct ProcessSummary {
    title: String,
    first: String,
    last: String,
    issues: usize,
}

impl ProcessSummary {
    fn new(process: &[IndividualIssue], template: &str) -> Option<Self> {
        let first = process.first()?;
        let last = process.last()?;
        Some(ProcessSummary {
            title: title_from_template(template, first),
            first: first.date().to_string(),
            last: last.date().to_string(),
            issues: process.len(),
        })
    }
}

/// Substitute the generic field tokens of the process's first issue into
/// the title template.
fn title_from_template(template: &str, issue: &IndividualIssue) -> String {
    let mut title = template.to_string();
    // longer tokens first, so #ISSU is not eaten by a #IS replacement
    let mut fields: Vec<(String, String)> = issue.generic_fields().into_iter().collect();
    fields.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
    for (token, value) in fields {
        title = title.replace(&token, &value);
    }
    title
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load(file: &PathBuf) -> Result<Course> {
    let course = xml::read_course_from_file(file)?;
    log::info!(
        "Loaded {} with {} blocks and {} issues appeared",
        file.display(),
        course.len(),
        course.count_individual_issues()
    );
    Ok(course)
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Info { file } => {
            let course = load(&file)?;
            match (course.first_appearance(), course.last_appearance()) {
                (Some(first), Some(last)) => {
                    println!("Period of appearance: {first} to {last}");
                }
                _ => println!("Period of appearance: empty"),
            }
            println!("Blocks:               {}", course.len());
            println!("Issues appeared:      {}", course.count_individual_issues());
            println!("Processes:            {}", course.number_of_processes());
            println!(
                "Estimated pages:      {}",
                course.guess_total_number_of_pages()
            );
            if !course.year_name().is_empty() {
                println!(
                    "Year:                 {} starting {}",
                    course.year_name(),
                    course.year_start()
                );
            }
        }

        Command::Validate { file } => {
            let course = load(&file)?;
            let mut findings = 0;
            for (index, block) in course.blocks().iter().enumerate() {
                if block.issues().is_empty() {
                    log::warn!("Block {} has no issues", index + 1);
                    findings += 1;
                }
                if let Some(heading) = block.duplicate_heading() {
                    log::warn!("Block {} repeats the heading '{heading}'", index + 1);
                    findings += 1;
                }
                if block.count_individual_issues() == 0 {
                    log::warn!("Block {} has no appearances", index + 1);
                    findings += 1;
                }
            }
            if findings == 0 {
                log::info!("No inconsistencies found");
            } else {
                log::warn!("{findings} finding(s)");
            }
        }

        Command::Describe { file } => {
            let course = load(&file)?;
            println!("{}", describe::as_readable_text(&course).join("\n\n"));
        }

        Command::Split {
            file,
            granularity,
            output,
            json,
        } => {
            let granularity: Granularity = granularity
                .as_deref()
                .unwrap_or(&config.split.default_granularity)
                .parse()?;
            let mut course = load(&file)?;
            course.split_into(granularity);
            log::info!(
                "Split into {} processes at {granularity} granularity",
                course.number_of_processes()
            );

            let summaries: Vec<ProcessSummary> = course
                .processes()
                .iter()
                .filter_map(|process| ProcessSummary::new(process, &config.title.template))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for summary in &summaries {
                    println!(
                        "{}  {} to {}  ({} issues)",
                        summary.title, summary.first, summary.last, summary.issues
                    );
                }
            }

            if let Some(output) = output {
                xml::write_course_to_file(&course, &output)?;
                log::info!("Wrote split course to {}", output.display());
            }
        }
    }

    Ok(())
}
