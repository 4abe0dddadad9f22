//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::Granularity;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Process splitting behavior
    #[serde(default)]
    pub split: SplitConfig,

    /// Process title generation settings
    #[serde(default)]
    pub title: TitleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.split
            .default_granularity
            .parse::<Granularity>()
            .map_err(|_| {
                AppError::validation(format!(
                    "split.default_granularity '{}' is not a granularity",
                    self.split.default_granularity
                ))
            })?;
        if self.title.template.trim().is_empty() {
            return Err(AppError::validation("title.template is empty"));
        }
        Ok(())
    }
}

/// Process splitting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Granularity used when none is given on the command line
    #[serde(default = "defaults::granularity")]
    pub default_granularity: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            default_granularity: defaults::granularity(),
        }
    }
}

/// Process title generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleConfig {
    /// Title template; `#DAY`, `#MONTH`, `#YEAR`, `#YR`, `#Issue` and the
    /// heading prefix tokens are substituted per process
    #[serde(default = "defaults::title_template")]
    pub template: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            template: defaults::title_template(),
        }
    }
}

mod defaults {
    pub fn granularity() -> String {
        "issues".into()
    }
    pub fn title_template() -> String {
        "#YEAR-#MONTH-#DAY_#issu".into()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_granularity() {
        let mut config = Config::default();
        config.split.default_granularity = "fortnights".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_template() {
        let mut config = Config::default();
        config.title.template = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[split]\ndefault_granularity = \"months\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.split.default_granularity, "months");
        assert_eq!(config.title.template, "#YEAR-#MONTH-#DAY_#issu");
    }

    #[test]
    fn load_or_default_falls_back() {
        let config = Config::load_or_default("/nonexistent/gazette.toml");
        assert_eq!(config.split.default_granularity, "issues");
    }
}
