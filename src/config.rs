//! Runtime settings loaded from an optional YAML file.
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```yaml
//! user_agent: "ethics-news-board/1.0"
//! timeout_secs: 20
//! max_per_category: 60
//! crossref_rows: 40
//! mailto: "ops@example.org"
//! news_endpoint: "https://news.google.com/rss/search"
//! research_endpoint: "https://api.crossref.org/works"
//! output_dir: "data"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::cli::Cli;
use crate::error::BoardError;

pub const DEFAULT_USER_AGENT: &str =
    "ethics-news-board/1.0 (+https://github.com/rkchristensen/ethics_news_test)";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_per_category: usize,
    pub crossref_rows: u32,
    pub mailto: Option<String>,
    pub news_endpoint: String,
    pub research_endpoint: String,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 20,
            max_per_category: 60,
            crossref_rows: 40,
            mailto: None,
            news_endpoint: "https://news.google.com/rss/search".to_string(),
            research_endpoint: "https://api.crossref.org/works".to_string(),
            output_dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    /// Read settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Io`] if the file cannot be read or
    /// [`BoardError::Config`] if it is not valid settings YAML.
    pub fn from_file(path: &Path) -> Result<Self, BoardError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, BoardError> {
        // An empty file deserializes as null rather than an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, then the `--config` file, then individual CLI flags.
    pub fn resolve(cli: &Cli) -> Result<Self, BoardError> {
        let mut settings = match &cli.config {
            Some(path) => {
                info!(path = %path.display(), "Loading settings file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        if let Some(ua) = &cli.user_agent {
            settings.user_agent = ua.clone();
        }
        if let Some(max) = cli.max_per_category {
            settings.max_per_category = max;
        }
        if let Some(mailto) = &cli.mailto {
            settings.mailto = Some(mailto.clone());
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.timeout_secs == 0 {
            return Err(BoardError::Config("timeout_secs must be positive".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(BoardError::Config("user_agent must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.timeout_secs, 20);
        assert_eq!(s.max_per_category, 60);
        assert_eq!(s.output_dir, PathBuf::from("data"));
        assert!(s.mailto.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let s = Settings::from_yaml("max_per_category: 25\nmailto: ops@example.org\n").unwrap();
        assert_eq!(s.max_per_category, 25);
        assert_eq!(s.mailto.as_deref(), Some("ops@example.org"));
        assert_eq!(s.timeout_secs, 20);
        assert_eq!(s.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Settings::from_yaml("max_stories: 5\n").unwrap_err();
        assert!(matches!(err, BoardError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(Settings::from_yaml("timeout_secs: 0\n").is_err());
    }

    #[test]
    fn test_cli_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_per_category: 10\nuser_agent: from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "ethics_board",
            "--config",
            path.as_str(),
            "--max-per-category",
            "5",
        ]);
        let s = Settings::resolve(&cli).unwrap();
        assert_eq!(s.max_per_category, 5);
        assert_eq!(s.user_agent, "from-file");
    }
}
