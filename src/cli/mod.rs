//! Command-line interface for mitofish-viz.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **inspect**: Show detected encoding, delimiter, column roles and warnings
//! - **summarize**: Top-N plus "Other" composition of every sample
//! - **diversity**: Richness, Shannon and Simpson indices per sample
//! - **export**: Write a derived table as CSV
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # What did the parser make of this file?
//! mitofish-viz inspect species_table.csv
//!
//! # Top 10 species per sample as JSON
//! mitofish-viz summarize species_table.csv -n 10 --format json
//!
//! # Shared legend across samples
//! mitofish-viz summarize species_table.csv --ranking global
//!
//! # Download the re-importable wide summary
//! mitofish-viz export species_table.csv --table summary-wide -o summary.csv
//!
//! # Start web UI
//! mitofish-viz serve --port 8080 --open
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::analysis::AnalysisSession;
use crate::config::AnalysisConfig;
use crate::core::types::Strictness;

pub mod diversity;
pub mod export;
pub mod inspect;
pub mod summarize;

#[derive(Parser)]
#[command(name = "mitofish-viz")]
#[command(version)]
#[command(about = "Summarize and visualize fish eDNA species tables from MitoFish")]
#[command(
    long_about = "mitofish-viz reads the species-by-sample abundance tables produced by the MitoFish/MiFish pipeline.\n\nIt detects the file's encoding and delimiter, finds the species and sample columns, and provides:\n- Per-sample composition as top-N species plus \"Other\"\n- Alpha-diversity indices (richness, Shannon, Simpson)\n- CSV exports of every derived table\n- A browser UI with stacked bar charts and a heatmap"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a custom column rules file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reject tables containing non-numeric or negative abundance cells
    #[arg(long, global = true)]
    pub strict: bool,
}

impl Cli {
    /// Analysis settings from the global flags
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` points to an unreadable or invalid rules file.
    pub fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let strictness = if self.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        };
        Ok(AnalysisConfig::load(self.config.as_deref())?.with_strictness(strictness))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a table was detected and classified
    Inspect(inspect::InspectArgs),

    /// Summarize each sample as its top-N species plus "Other"
    Summarize(summarize::SummarizeArgs),

    /// Compute diversity indices per sample
    Diversity(diversity::DiversityArgs),

    /// Export a derived table as CSV
    Export(export::ExportArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Parse a table file, naming the file in any error
pub(crate) fn load_session(path: &Path, config: &AnalysisConfig) -> anyhow::Result<AnalysisSession> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    AnalysisSession::from_file(path, config)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))
}
