use serde::{Deserialize, Serialize};

use crate::analysis::aggregate::group_by_sample;
use crate::core::record::AbundanceRecord;

/// Alpha-diversity of one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityMetrics {
    pub sample: String,
    /// Number of species with abundance > 0
    pub richness: usize,
    /// `-Σ p ln p`
    pub shannon: f64,
    /// `1 - Σ p²`
    pub simpson: f64,
}

/// Richness, Shannon and Simpson indices per sample, in first-appearance order.
///
/// Proportions are taken over the species' summed abundance within a sample.
/// Only species with p > 0 enter the sums, so `0 ln 0` is never evaluated. A
/// sample with zero total abundance reports zero for every index.
#[must_use]
pub fn diversity(records: &[AbundanceRecord]) -> Vec<DiversityMetrics> {
    group_by_sample(records)
        .iter()
        .map(|group| {
            let abundances: Vec<f64> = group.species.iter().map(|(_, a)| *a).collect();
            let (richness, shannon, simpson) = indices(&abundances);
            DiversityMetrics {
                sample: group.sample.to_string(),
                richness,
                shannon,
                simpson,
            }
        })
        .collect()
}

/// (richness, Shannon, Simpson) for one vector of species abundances
#[must_use]
pub fn indices(abundances: &[f64]) -> (usize, f64, f64) {
    let present: Vec<f64> = abundances.iter().copied().filter(|&a| a > 0.0).collect();
    let total: f64 = present.iter().sum();
    if present.is_empty() || total <= 0.0 {
        return (0, 0.0, 0.0);
    }

    let mut shannon = 0.0;
    let mut dominance = 0.0;
    for a in &present {
        let p = a / total;
        shannon -= p * p.ln();
        dominance += p * p;
    }

    // Clamp rounding noise below zero
    (present.len(), shannon.max(0.0), (1.0 - dominance).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sample: &str, species: &str, a: f64) -> AbundanceRecord {
        AbundanceRecord::new(sample, species, a)
    }

    #[test]
    fn test_scenario() {
        let records = vec![
            rec("sample1", "Tuna", 10.0),
            rec("sample2", "Tuna", 0.0),
            rec("sample1", "Cod", 5.0),
            rec("sample2", "Cod", 5.0),
            rec("sample1", "Salmon", 0.0),
            rec("sample2", "Salmon", 5.0),
        ];
        let metrics = diversity(&records);
        assert_eq!(metrics.len(), 2);

        let s1 = &metrics[0];
        assert_eq!(s1.sample, "sample1");
        assert_eq!(s1.richness, 2);
        assert!((s1.shannon - 0.636_514).abs() < 1e-4);
        let expected_simpson = 1.0 - ((2.0_f64 / 3.0).powi(2) + (1.0_f64 / 3.0).powi(2));
        assert!((s1.simpson - expected_simpson).abs() < 1e-12);

        let s2 = &metrics[1];
        assert_eq!(s2.richness, 2);
        assert!((s2.shannon - 2.0_f64.ln()).abs() < 1e-12);
        assert!((s2.simpson - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_species() {
        let (richness, shannon, simpson) = indices(&[42.0, 0.0]);
        assert_eq!(richness, 1);
        assert!(shannon == 0.0 && shannon.is_sign_positive());
        assert!(simpson == 0.0);
    }

    #[test]
    fn test_zero_total() {
        let metrics = diversity(&[rec("x", "Tuna", 0.0), rec("x", "Cod", 0.0)]);
        assert_eq!(metrics[0].richness, 0);
        assert!(metrics[0].shannon == 0.0);
        assert!(metrics[0].simpson == 0.0);
        assert_eq!(indices(&[]), (0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicate_species_counted_once() {
        let metrics = diversity(&[rec("x", "Tuna", 1.0), rec("x", "Tuna", 1.0), rec("x", "Cod", 2.0)]);
        assert_eq!(metrics[0].richness, 2);
        assert!((metrics[0].simpson - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let even: Vec<f64> = vec![1.0; 20];
        let (r, h, d) = indices(&even);
        assert_eq!(r, 20);
        assert!((h - 20.0_f64.ln()).abs() < 1e-9);
        assert!(d >= 0.0 && d < 1.0);
    }
}
