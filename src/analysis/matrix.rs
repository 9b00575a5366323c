use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analysis::aggregate::{count_to_f64, group_by_sample};
use crate::core::record::{AbundanceRecord, NormalizedTable};

/// Species × sample abundance grid backing the heatmap and the processed-table export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceMatrix {
    /// Row labels, most abundant overall first
    pub species: Vec<String>,
    /// Column labels in input order
    pub samples: Vec<String>,
    /// `values[species][sample]`
    pub values: Vec<Vec<f64>>,
    /// Whether `values` hold `log10(x + 1)` instead of raw abundances
    pub log_scaled: bool,
}

impl AbundanceMatrix {
    /// Copy with every value replaced by `log10(x + 1)`
    #[must_use]
    pub fn log_scaled(&self) -> Self {
        if self.log_scaled {
            return self.clone();
        }
        Self {
            species: self.species.clone(),
            samples: self.samples.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| (v + 1.0).log10()).collect())
                .collect(),
            log_scaled: true,
        }
    }

    /// Sum of each species row
    #[must_use]
    pub fn row_totals(&self) -> Vec<f64> {
        self.values.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn get(&self, species: &str, sample: &str) -> Option<f64> {
        let r = self.species.iter().position(|s| s == species)?;
        let c = self.samples.iter().position(|s| s == sample)?;
        Some(self.values[r][c])
    }
}

/// Pivot records into a species × sample matrix.
///
/// Duplicate (sample, species) records are summed. Rows are ordered by total
/// abundance across all samples, largest first, with ties in first-appearance
/// order. Species that are zero everywhere are kept at the bottom.
#[must_use]
pub fn abundance_matrix(records: &[AbundanceRecord]) -> AbundanceMatrix {
    let groups = group_by_sample(records);

    let mut species: Vec<&str> = Vec::new();
    let mut species_index: HashMap<&str, usize> = HashMap::new();
    for record in records {
        species_index.entry(record.species.as_str()).or_insert_with(|| {
            species.push(record.species.as_str());
            species.len() - 1
        });
    }

    let mut values = vec![vec![0.0; groups.len()]; species.len()];
    for (c, group) in groups.iter().enumerate() {
        for &(name, a) in &group.species {
            values[species_index[name]][c] = a;
        }
    }

    let mut order: Vec<usize> = (0..species.len()).collect();
    let totals: Vec<f64> = values.iter().map(|row| row.iter().sum()).collect();
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));

    AbundanceMatrix {
        species: order.iter().map(|&i| species[i].to_string()).collect(),
        samples: groups.iter().map(|g| g.sample.to_string()).collect(),
        values: order.iter().map(|&i| values[i].clone()).collect(),
        log_scaled: false,
    }
}

/// Headline numbers shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    /// Distinct species names
    pub species_count: usize,
    pub sample_count: usize,
    pub total_abundance: f64,
    pub mean_abundance_per_sample: f64,
}

#[must_use]
pub fn overview(normalized: &NormalizedTable) -> DatasetOverview {
    let total_abundance: f64 = normalized.records.iter().map(|r| r.abundance).sum();
    let sample_count = normalized.samples.len();
    let mean_abundance_per_sample = if sample_count == 0 {
        0.0
    } else {
        total_abundance / count_to_f64(sample_count)
    };

    DatasetOverview {
        species_count: normalized.species().len(),
        sample_count,
        total_abundance,
        mean_abundance_per_sample,
    }
}
