use serde::{Deserialize, Serialize};

/// One (sample, species, abundance) observation in long form.
///
/// Duplicates are allowed; aggregation sums them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceRecord {
    pub sample: String,
    pub species: String,
    /// Always finite and >= 0
    pub abundance: f64,
}

impl AbundanceRecord {
    pub fn new(sample: impl Into<String>, species: impl Into<String>, abundance: f64) -> Self {
        Self {
            sample: sample.into(),
            species: species.into(),
            abundance,
        }
    }
}

/// A cell the lenient normalizer replaced with zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWarning {
    /// 1-based data row (header excluded)
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl std::fmt::Display for CellWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}, column '{}': '{}' is not a non-negative number, counted as 0",
            self.row, self.column, self.value
        )
    }
}

/// Output of the normalizer: long-form records plus data-quality notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub records: Vec<AbundanceRecord>,
    /// Sample identifiers in column order
    pub samples: Vec<String>,
    /// Data rows kept (rows with a blank species name are dropped)
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Total number of coerced cells, including ones past the warning cap
    pub coerced_cells: usize,
    pub warnings: Vec<CellWarning>,
}

impl NormalizedTable {
    /// Distinct species names in first-appearance order
    #[must_use]
    pub fn species(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.species.as_str()))
            .map(|r| r.species.as_str())
            .collect()
    }
}
