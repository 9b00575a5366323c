//! # mitofish-viz
//!
//! A library for summarizing fish eDNA metabarcoding results.
//!
//! The MitoFish/MiFish pipeline reports read counts as a species × sample table.
//! These tables arrive in different shapes: comma or tab separated, UTF-8 with or
//! without a BOM, or Shift-JIS from Japanese spreadsheet software, with the
//! species column called "Species" or "種名" and sample columns named after
//! sequencing files.
//!
//! `mitofish-viz` reads such a table, works out which columns are which, and
//! derives the per-sample views a field ecologist looks at first.
//!
//! ## Features
//!
//! - **Encoding detection**: UTF-8, UTF-8 with BOM, and Shift-JIS
//! - **Delimiter detection**: comma or tab, from the header line
//! - **Column classification**: configurable species aliases and sample rules
//! - **Composition**: top-N species per sample, the rest folded into "Other"
//! - **Diversity**: richness, Shannon and Simpson indices
//! - **Export**: CSV tables, including a wide summary that re-imports cleanly
//!
//! ## Example
//!
//! ```rust
//! use mitofish_viz::{AnalysisConfig, AnalysisSession, Ranking};
//!
//! let table = "Species,sample1,sample2\nTuna,10,0\nCod,5,5\nSalmon,0,5\n";
//! let config = AnalysisConfig::load(None).unwrap();
//! let session = AnalysisSession::from_bytes(table.as_bytes(), &config).unwrap();
//!
//! for summary in session.summaries(1, Ranking::PerSample) {
//!     for entry in &summary.entries {
//!         println!("{}: {} {:.1}%", summary.sample, entry.label, entry.proportion * 100.0);
//!     }
//! }
//!
//! let metrics = session.diversity();
//! assert_eq!(metrics[0].richness, 2);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Column rules and analysis settings
//! - [`core`]: Core data types for tables, records and detection results
//! - [`parsing`]: Encoding and delimiter detection, classification, normalization
//! - [`analysis`]: Aggregation, diversity and the analysis session
//! - [`export`]: CSV writers for derived tables
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based charts

pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod export;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisSession, DiversityMetrics, SampleSummary};
pub use config::{AnalysisConfig, ColumnRules};
pub use crate::core::record::{AbundanceRecord, NormalizedTable};
pub use crate::core::types::*;
pub use parsing::ParseError;
