//! Settings file for commit statistics.
//!
//! Looked up as `commit-stats.toml` at the repository root unless a path is
//! given explicitly. Every key is optional:
//!
//! ```toml
//! delete_policy = "as-deletions"
//! workers = 8
//! binary_sample_size = 8000
//! root_against_empty = true
//! default_language = "Go"
//! vendor_patterns = ["^generated/"]
//!
//! [[languages]]
//! name = "Zig"
//! extensions = ["zig"]
//! line_comments = ["//"]
//! ```

use crate::classifier::{Language, Languages, SyntaxClassifier};
use crate::error::ConfigError;
use crate::filter::{ContentFilter, DEFAULT_BINARY_SAMPLE};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "commit-stats.toml";

/// How lines of a deleted file are counted.
///
/// `AsAdditions` reproduces the historical numbers, where a deleted file is
/// counted exactly like an inserted one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    #[default]
    AsAdditions,
    AsDeletions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub delete_policy: DeletePolicy,
    pub workers: usize,
    pub binary_sample_size: usize,
    /// Count a root commit's files as inserted instead of reporting no stats
    pub root_against_empty: bool,
    pub default_language: Option<String>,
    pub vendor_patterns: Vec<String>,
    pub languages: Vec<Language>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::default(),
            workers: 4,
            binary_sample_size: DEFAULT_BINARY_SAMPLE,
            root_against_empty: false,
            default_language: None,
            vendor_patterns: Vec::new(),
            languages: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Loads `commit-stats.toml` from `dir`, or the defaults if there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=64).contains(&self.workers) {
            return Err(ConfigError::Workers(self.workers));
        }
        if self.binary_sample_size == 0 {
            return Err(ConfigError::BinarySample);
        }
        if let Some(name) = &self.default_language {
            if self.languages().get(name).is_none() {
                return Err(ConfigError::DefaultLanguage(name.clone()));
            }
        }
        regex::RegexSet::new(&self.vendor_patterns)?;
        Ok(())
    }

    /// Built-in languages with the configured ones layered on top.
    pub fn languages(&self) -> Languages {
        let mut langs = Languages::builtin();
        langs.extend(self.languages.iter().cloned());
        langs
    }

    pub fn classifier(&self) -> SyntaxClassifier {
        SyntaxClassifier::new(self.languages()).with_default_language(self.default_language.clone())
    }

    pub fn filter(&self) -> Result<ContentFilter, ConfigError> {
        Ok(ContentFilter::new(&self.vendor_patterns, self.binary_sample_size)?)
    }
}
