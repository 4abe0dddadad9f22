// src/error.rs

//! Unified error handling for the course model and CLI.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for course operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML reading/writing failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute syntax error
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Calendar date parsing failed
    #[error("Date parse error: {0}")]
    Date(#[from] chrono::ParseError),

    /// Serialized XML was not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A block bound mutation would collide with another block's date range
    #[error("Date range collides with block ({variant}) {first} - {last}")]
    Overlap {
        variant: String,
        first: NaiveDate,
        last: NaiveDate,
    },

    /// A required XML attribute is absent
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(&'static str),

    /// A required XML element is absent
    #[error("Missing required element <{0}>")]
    MissingElement(&'static str),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an overlap error for the given conflicting block range.
    pub fn overlap(variant: Option<&str>, first: NaiveDate, last: NaiveDate) -> Self {
        Self::Overlap {
            variant: variant.unwrap_or("").to_string(),
            first,
            last,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message() {
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2020, 3, 31).unwrap();
        let error = AppError::overlap(Some("2"), first, last);
        assert_eq!(
            error.to_string(),
            "Date range collides with block (2) 2020-01-01 - 2020-03-31"
        );
    }

    #[test]
    fn test_validation_message() {
        let error = AppError::validation("no block at index 3");
        assert_eq!(error.to_string(), "Validation error: no block at index 3");
    }
}
