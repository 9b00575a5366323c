//! Ingestion of MitoFish-style abundance tables.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`detect`]: sniff the text encoding (UTF-8 with BOM, UTF-8, Shift-JIS)
//!    and the field delimiter (comma or tab)
//! 2. [`table`]: split the decoded text into a [`RawTable`]
//! 3. [`classify`]: find the species column and the sample columns
//! 4. [`normalize`]: reshape the wide table into long-form records
//!
//! [`sample_names`] turns sequencing file names such as
//! `1-1-tamagawa-6000.fastq` into short display names.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mitofish_viz::config::AnalysisConfig;
//! use mitofish_viz::parsing::{classify, detect, normalize, table};
//!
//! let bytes = std::fs::read("tax-results.csv").unwrap();
//! let config = AnalysisConfig::load(None).unwrap();
//!
//! let (detection, text) = detect::decode(&bytes).unwrap();
//! let raw = table::parse_table(&text, detection.delimiter).unwrap();
//! let roles = classify::classify(&raw, &config.rules).unwrap();
//! let normalized = normalize::normalize(&raw, &roles, &config).unwrap();
//!
//! println!("{} records", normalized.records.len());
//! ```
//!
//! [`RawTable`]: crate::core::table::RawTable

pub mod classify;
pub mod detect;
pub mod normalize;
pub mod sample_names;
pub mod table;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported text encoding: tried {}", attempted.join(", "))]
    UnsupportedEncoding { attempted: Vec<&'static str> },

    #[error("No species column found (looked for: {})", aliases.join(", "))]
    SpeciesColumnNotFound { aliases: Vec<String> },

    #[error("No sample columns found: no sequencing-file headers and no numeric columns")]
    NoSampleColumnsFound,

    #[error("Table has a header row but no data rows")]
    EmptyTable,

    #[error("Invalid abundance on row {row}, column '{column}': '{value}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("Too many rows: {0} exceeds maximum allowed ({max})", max = crate::utils::validation::MAX_DATA_ROWS)]
    TooManyRows(usize),
}

impl ParseError {
    /// Stable machine-readable identifier for API responses
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::UnsupportedEncoding { .. } => "unsupported_encoding",
            Self::SpeciesColumnNotFound { .. } => "species_column_not_found",
            Self::NoSampleColumnsFound => "no_sample_columns_found",
            Self::EmptyTable => "empty_table",
            Self::InvalidCell { .. } => "invalid_cell",
            Self::Csv(_) => "malformed_table",
            Self::TooManyRows(_) => "too_many_rows",
        }
    }
}
