//! CSV downloads of the processed data.
//!
//! Every table is plain UTF-8, comma separated, with a header row. The wide
//! summary ([`ExportTable::SummaryWide`]) has the same shape as an input table,
//! so it can be uploaded again.

pub mod csv;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::analysis::AnalysisSession;
use crate::core::types::Ranking;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Unknown export table '{0}'. Expected one of: summary-long, summary-wide, diversity, matrix")]
    UnknownTable(String),
}

/// Which table to download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTable {
    /// Sample, Label, Abundance, Proportion
    SummaryLong,
    /// Species × sample proportions; re-importable
    SummaryWide,
    /// Richness, Shannon and Simpson per sample
    Diversity,
    /// Species × sample abundances
    Matrix,
}

impl ExportTable {
    pub const ALL: [ExportTable; 4] = [
        ExportTable::SummaryLong,
        ExportTable::SummaryWide,
        ExportTable::Diversity,
        ExportTable::Matrix,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTable::SummaryLong => "summary-long",
            ExportTable::SummaryWide => "summary-wide",
            ExportTable::Diversity => "diversity",
            ExportTable::Matrix => "matrix",
        }
    }

    /// Download file name, e.g. `mitofish_diversity_20240101_120000.csv`
    #[must_use]
    pub fn file_name(&self, timestamp: &str) -> String {
        format!("mitofish_{}_{timestamp}.csv", self.as_str().replace('-', "_"))
    }
}

impl fmt::Display for ExportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportTable {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| ExportError::UnknownTable(s.to_string()))
    }
}

/// Render one table of a session to CSV bytes
///
/// `top_n` and `ranking` only affect the summary tables.
///
/// # Errors
///
/// Returns `ExportError::Csv` if serialization fails.
pub fn render(
    session: &AnalysisSession,
    table: ExportTable,
    top_n: usize,
    ranking: Ranking,
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    match table {
        ExportTable::SummaryLong => {
            csv::write_summary_long(&session.summaries(top_n, ranking), &mut buf)?;
        }
        ExportTable::SummaryWide => {
            csv::write_summary_wide(&session.summaries(top_n, ranking), &mut buf)?;
        }
        ExportTable::Diversity => csv::write_diversity(&session.diversity(), &mut buf)?,
        ExportTable::Matrix => csv::write_matrix(&session.matrix(false), &mut buf)?,
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    const SCENARIO: &str = "Species,sample1.fastq,sample2.fastq\nTuna,10,0\nCod,5,5\nSalmon,0,5\n";

    #[test]
    fn test_table_names() {
        assert_eq!("summary-wide".parse::<ExportTable>().unwrap(), ExportTable::SummaryWide);
        assert_eq!("Summary_Long".parse::<ExportTable>().unwrap(), ExportTable::SummaryLong);
        assert!("pie".parse::<ExportTable>().is_err());
        assert_eq!(
            ExportTable::SummaryWide.file_name("20240101_000000"),
            "mitofish_summary_wide_20240101_000000.csv"
        );
    }

    #[test]
    fn test_wide_summary_reimports() {
        let table = "Species,1-1-nikaryo-yosui-500.fastq,1-1-mujin-ike-250.fastq\n\
                     Tuna,10,0\nCod,5,5\nSalmon,0,5\n";
        let config = AnalysisConfig::load(None).unwrap();
        let session = AnalysisSession::from_bytes(table.as_bytes(), &config).unwrap();
        assert_eq!(session.normalized.samples, vec!["nikaryo-yosui-1", "mujin-ike-1"]);
        let summaries = session.summaries(1, Ranking::PerSample);

        let bytes = render(&session, ExportTable::SummaryWide, 1, Ranking::PerSample).unwrap();
        let reloaded = AnalysisSession::from_bytes(&bytes, &config).unwrap();
        assert_eq!(reloaded.normalized.samples, session.normalized.samples);

        for summary in &summaries {
            for entry in &summary.entries {
                let value = reloaded
                    .normalized
                    .records
                    .iter()
                    .find(|r| r.sample == summary.sample && r.species == entry.label)
                    .map(|r| r.abundance)
                    .unwrap();
                assert_eq!(value, entry.proportion);
            }
        }
    }

    #[test]
    fn test_matrix_render() {
        let config = AnalysisConfig::load(None).unwrap();
        let session = AnalysisSession::from_bytes(SCENARIO.as_bytes(), &config).unwrap();
        let bytes = render(&session, ExportTable::Matrix, 15, Ranking::PerSample).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // Tuna and Cod tie on total; first appearance wins
        assert_eq!(text, "Species,sample1,sample2\nTuna,10,0\nCod,5,5\nSalmon,0,5\n");
    }
}
