//! Analysis configuration and the column-detection rule set.
//!
//! The default rules are embedded from `rules/column_rules.json`, which
//! `build.rs` validates at compile time. A replacement file with the same
//! shape can be supplied at runtime with `--config`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::types::{Ranking, Strictness};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read rules file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse rules file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid rules: {0}")]
    Invalid(String),
}

/// Rules version for compatibility checking
pub const RULES_VERSION: &str = "1.0.0";

/// Default number of species shown before collapsing into "Other"
pub const DEFAULT_TOP_N: usize = 15;

/// Upper bound on user-supplied top-N values
pub const MAX_TOP_N: usize = 100;

pub const DEFAULT_OTHER_LABEL: &str = "Other";

/// Header patterns used to classify columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRules {
    #[serde(default = "default_version")]
    pub version: String,

    /// Species column aliases, compared case-insensitively
    pub species_aliases: Vec<String>,

    /// Fall back to the second column when no alias matches
    #[serde(default)]
    pub positional_species_fallback: bool,

    /// Substrings marking a header as a sequencing-file sample column
    pub sample_header_patterns: Vec<String>,

    /// Substrings marking a numeric column as metadata rather than a sample
    #[serde(default)]
    pub metadata_exclusions: Vec<String>,

    /// Whole headers (ignoring case) marking a numeric column as taxonomy metadata
    #[serde(default)]
    pub metadata_headers: Vec<String>,
}

fn default_version() -> String {
    RULES_VERSION.to_string()
}

impl ColumnRules {
    /// Load the embedded default rules
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the embedded JSON is malformed,
    /// which `build.rs` rules out for release builds.
    pub fn load_embedded() -> Result<Self, ConfigError> {
        // Embedded at compile time via build.rs
        const EMBEDDED_RULES: &str = include_str!("../rules/column_rules.json");
        Self::from_json(EMBEDDED_RULES)
    }

    /// Load rules from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read, or a parse
    /// or validation error if its content is not a usable rule set.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate rules from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed JSON or
    /// `ConfigError::Invalid` if no species alias is given or a list repeats
    /// an entry.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: ColumnRules = serde_json::from_str(json)?;

        if rules.version != RULES_VERSION {
            tracing::warn!(
                "Rules version mismatch: file has {}, expected {}",
                rules.version,
                RULES_VERSION
            );
        }

        if rules.species_aliases.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "at least one species alias is required".to_string(),
            ));
        }

        for (field, list) in [
            ("species_aliases", &rules.species_aliases),
            ("sample_header_patterns", &rules.sample_header_patterns),
            ("metadata_exclusions", &rules.metadata_exclusions),
            ("metadata_headers", &rules.metadata_headers),
        ] {
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|entry| !seen.insert(entry.as_str())) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate '{field}' entry '{dup}'"
                )));
            }
        }

        Ok(rules)
    }
}

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub rules: ColumnRules,
    pub strictness: Strictness,
    pub top_n: usize,
    pub ranking: Ranking,
    pub other_label: String,
    /// Derive short sample names from sequencing file names
    pub clean_sample_names: bool,
}

impl AnalysisConfig {
    #[must_use]
    pub fn new(rules: ColumnRules) -> Self {
        Self {
            rules,
            strictness: Strictness::default(),
            top_n: DEFAULT_TOP_N,
            ranking: Ranking::default(),
            other_label: DEFAULT_OTHER_LABEL.to_string(),
            clean_sample_names: true,
        }
    }

    /// Embedded rules, or the rules file at `path` when given
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the rules cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let rules = match path {
            Some(path) => ColumnRules::load_from_file(path)?,
            None => ColumnRules::load_embedded()?,
        };
        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.min(MAX_TOP_N);
        self
    }

    #[must_use]
    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_rules() {
        let rules = ColumnRules::load_embedded().unwrap();
        assert!(rules.species_aliases.iter().any(|a| a == "種名"));
        assert!(rules.species_aliases.iter().any(|a| a == "Species"));
        assert_eq!(rules.sample_header_patterns, vec![".fastq".to_string()]);
        assert!(!rules.positional_species_fallback);
        assert!(rules.metadata_exclusions.iter().any(|e| e == "TaxonID"));
        assert!(rules.metadata_headers.iter().any(|h| h == "Order"));
    }

    #[test]
    fn test_rules_require_alias() {
        let json = r#"{"species_aliases": [" "], "sample_header_patterns": []}"#;
        assert!(matches!(
            ColumnRules::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rules_reject_duplicates() {
        let json = r#"{"species_aliases": ["taxon"], "sample_header_patterns": [".fq", ".fq"]}"#;
        let err = ColumnRules::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("sample_header_patterns"));
    }

    #[test]
    fn test_rules_defaults() {
        let json = r#"{"species_aliases": ["taxon"], "sample_header_patterns": [".fq"]}"#;
        let rules = ColumnRules::from_json(json).unwrap();
        assert_eq!(rules.version, RULES_VERSION);
        assert!(rules.metadata_exclusions.is_empty());
        assert!(rules.metadata_headers.is_empty());
    }

    #[test]
    fn test_config_builders() {
        let config = AnalysisConfig::load(None)
            .unwrap()
            .with_top_n(10_000)
            .with_strictness(Strictness::Strict)
            .with_ranking(Ranking::Global);
        assert_eq!(config.top_n, MAX_TOP_N);
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.ranking, Ranking::Global);
        assert_eq!(config.other_label, "Other");
    }
}
