use std::path::Path;

use crate::analysis::aggregate::{summarize_with, SampleSummary, SummaryOptions};
use crate::analysis::diversity::{diversity, DiversityMetrics};
use crate::analysis::matrix::{abundance_matrix, overview, AbundanceMatrix, DatasetOverview};
use crate::config::AnalysisConfig;
use crate::core::record::NormalizedTable;
use crate::core::table::{ColumnRoles, RawTable};
use crate::core::types::{Detection, Ranking};
use crate::parsing::{classify, normalize, table, ParseError};

/// One uploaded table, parsed once and analyzed on demand.
///
/// Detection, classification and normalization run in the constructor.
/// Changing display parameters such as top-N only re-runs the aggregation.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    pub detection: Detection,
    pub table: RawTable,
    pub roles: ColumnRoles,
    pub normalized: NormalizedTable,
    pub config: AnalysisConfig,
}

impl AnalysisSession {
    /// Parse an uploaded table
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` from any ingestion stage: encoding, table
    /// structure, column classification or (in strict mode) cell validation.
    pub fn from_bytes(bytes: &[u8], config: &AnalysisConfig) -> Result<Self, ParseError> {
        let (detection, table) = table::read_table(bytes)?;
        let roles = classify::classify(&table, &config.rules)?;
        let normalized = normalize::normalize(&table, &roles, config)?;

        tracing::info!(
            "Loaded {} species rows x {} samples ({}, {} delimited)",
            normalized.rows_kept,
            normalized.samples.len(),
            detection.encoding,
            detection.delimiter
        );

        Ok(Self {
            detection,
            table,
            roles,
            normalized,
            config: config.clone(),
        })
    }

    /// Parse a table file from disk
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or any error from
    /// [`AnalysisSession::from_bytes`].
    pub fn from_file(path: &Path, config: &AnalysisConfig) -> Result<Self, ParseError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, config)
    }

    /// Top-N plus Other composition of every sample
    #[must_use]
    pub fn summaries(&self, top_n: usize, ranking: Ranking) -> Vec<SampleSummary> {
        let options = SummaryOptions {
            top_n,
            ranking,
            other_label: self.config.other_label.clone(),
        };
        summarize_with(&self.normalized.records, &options)
    }

    /// Summaries with the configured top-N and ranking
    #[must_use]
    pub fn default_summaries(&self) -> Vec<SampleSummary> {
        self.summaries(self.config.top_n, self.config.ranking)
    }

    #[must_use]
    pub fn diversity(&self) -> Vec<DiversityMetrics> {
        diversity(&self.normalized.records)
    }

    #[must_use]
    pub fn matrix(&self, log_scale: bool) -> AbundanceMatrix {
        let matrix = abundance_matrix(&self.normalized.records);
        if log_scale {
            matrix.log_scaled()
        } else {
            matrix
        }
    }

    #[must_use]
    pub fn overview(&self) -> DatasetOverview {
        overview(&self.normalized)
    }
}
