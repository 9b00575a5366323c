use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::DEFAULT_OTHER_LABEL;
use crate::core::record::AbundanceRecord;
use crate::core::types::Ranking;

/// Helper function to convert usize count to f64 with explicit precision loss allowance
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Whether a summary entry is a single species or the collapsed remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Species,
    Other,
}

/// One bar segment of a sample's stacked bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub label: String,
    pub kind: EntryKind,
    pub abundance: f64,
    /// Share of the sample total; 0 when the total is 0
    pub proportion: f64,
}

/// Composition of one sample, collapsed to top-N species plus "Other"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub sample: String,
    pub total: f64,
    pub entries: Vec<SummaryEntry>,
}

impl SampleSummary {
    /// Sum of entry proportions: 1.0 for a non-empty sample, 0.0 otherwise
    #[must_use]
    pub fn proportion_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.proportion).sum()
    }

    #[must_use]
    pub fn entry(&self, label: &str) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    #[must_use]
    pub fn other(&self) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.kind == EntryKind::Other)
    }
}

/// Look up one sample's summary by name
#[must_use]
pub fn find<'a>(summaries: &'a [SampleSummary], sample: &str) -> Option<&'a SampleSummary> {
    summaries.iter().find(|s| s.sample == sample)
}

/// Options controlling the top-N collapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    pub top_n: usize,
    pub ranking: Ranking,
    pub other_label: String,
}

impl SummaryOptions {
    #[must_use]
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            ranking: Ranking::PerSample,
            other_label: DEFAULT_OTHER_LABEL.to_string(),
        }
    }
}

/// Summed abundance per species for one sample, in first-appearance order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SampleTotals<'a> {
    pub sample: &'a str,
    pub species: Vec<(&'a str, f64)>,
}

impl SampleTotals<'_> {
    pub fn total(&self) -> f64 {
        self.species.iter().map(|(_, a)| a).sum()
    }
}

/// Group records by sample and sum duplicate species (exact, case-sensitive names)
pub(crate) fn group_by_sample(records: &[AbundanceRecord]) -> Vec<SampleTotals<'_>> {
    let mut groups: Vec<SampleTotals<'_>> = Vec::new();
    let mut sample_index: HashMap<&str, usize> = HashMap::new();
    let mut species_index: Vec<HashMap<&str, usize>> = Vec::new();

    for record in records {
        let g = *sample_index.entry(record.sample.as_str()).or_insert_with(|| {
            groups.push(SampleTotals {
                sample: record.sample.as_str(),
                species: Vec::new(),
            });
            species_index.push(HashMap::new());
            groups.len() - 1
        });

        let group = &mut groups[g];
        let s = *species_index[g]
            .entry(record.species.as_str())
            .or_insert_with(|| {
                group.species.push((record.species.as_str(), 0.0));
                group.species.len() - 1
            });
        group.species[s].1 += record.abundance;
    }

    groups
}

/// Species with positive abundance, largest first; ties keep input order
fn rank_positive<'a>(species: &[(&'a str, f64)]) -> Vec<(&'a str, f64)> {
    let mut ranked: Vec<(&str, f64)> = species.iter().copied().filter(|(_, a)| *a > 0.0).collect();
    // Stable sort preserves first-appearance order among equal abundances
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

fn proportion(abundance: f64, total: f64) -> f64 {
    if total > 0.0 {
        abundance / total
    } else {
        0.0
    }
}

fn entry(label: &str, kind: EntryKind, abundance: f64, total: f64) -> SummaryEntry {
    SummaryEntry {
        label: label.to_string(),
        kind,
        abundance,
        proportion: proportion(abundance, total),
    }
}

/// Per-sample top-N summary with the default "Other" label
#[must_use]
pub fn summarize(records: &[AbundanceRecord], top_n: usize) -> Vec<SampleSummary> {
    summarize_with(records, &SummaryOptions::new(top_n))
}

/// Top-N summary where the kept species are ranked over the whole dataset
#[must_use]
pub fn summarize_global(records: &[AbundanceRecord], top_n: usize) -> Vec<SampleSummary> {
    summarize_with(
        records,
        &SummaryOptions {
            ranking: Ranking::Global,
            ..SummaryOptions::new(top_n)
        },
    )
}

/// Collapse each sample to its top-N species plus a single "Other" entry.
///
/// Samples come back in first-appearance order. Zero-abundance species are
/// left out of the ranking but the sample total still covers every record, so
/// a sample with total 0 has no entries and nothing is divided by zero.
#[must_use]
pub fn summarize_with(records: &[AbundanceRecord], options: &SummaryOptions) -> Vec<SampleSummary> {
    let groups = group_by_sample(records);

    match options.ranking {
        Ranking::PerSample => groups
            .iter()
            .map(|g| summarize_sample(g, options))
            .collect(),
        Ranking::Global => {
            let keep = global_top_species(&groups, options.top_n);
            groups
                .iter()
                .map(|g| summarize_sample_global(g, &keep, options))
                .collect()
        }
    }
}

fn summarize_sample(group: &SampleTotals<'_>, options: &SummaryOptions) -> SampleSummary {
    let total = group.total();
    let ranked = rank_positive(&group.species);
    let split = options.top_n.min(ranked.len());

    let mut entries: Vec<SummaryEntry> = ranked[..split]
        .iter()
        .map(|(name, a)| entry(name, EntryKind::Species, *a, total))
        .collect();

    if split < ranked.len() {
        let rest: f64 = ranked[split..].iter().map(|(_, a)| a).sum();
        entries.push(entry(&options.other_label, EntryKind::Other, rest, total));
    }

    SampleSummary {
        sample: group.sample.to_string(),
        total,
        entries,
    }
}

/// Top-N species by dataset-wide total, in rank order
fn global_top_species<'a>(groups: &[SampleTotals<'a>], top_n: usize) -> Vec<&'a str> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for group in groups {
        for &(name, a) in &group.species {
            let i = *index.entry(name).or_insert_with(|| {
                totals.push((name, 0.0));
                totals.len() - 1
            });
            totals[i].1 += a;
        }
    }

    rank_positive(&totals)
        .into_iter()
        .take(top_n)
        .map(|(name, _)| name)
        .collect()
}

fn summarize_sample_global(
    group: &SampleTotals<'_>,
    keep: &[&str],
    options: &SummaryOptions,
) -> SampleSummary {
    let total = group.total();
    let lookup: HashMap<&str, f64> = group.species.iter().copied().collect();

    let mut entries: Vec<SummaryEntry> = keep
        .iter()
        .filter_map(|name| {
            let a = lookup.get(name).copied().unwrap_or(0.0);
            (a > 0.0).then(|| entry(name, EntryKind::Species, a, total))
        })
        .collect();

    let rest: f64 = group
        .species
        .iter()
        .filter(|(name, _)| !keep.contains(name))
        .map(|(_, a)| a)
        .sum();
    if rest > 0.0 {
        entries.push(entry(&options.other_label, EntryKind::Other, rest, total));
    }

    SampleSummary {
        sample: group.sample.to_string(),
        total,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sample: &str, species: &str, a: f64) -> AbundanceRecord {
        AbundanceRecord::new(sample, species, a)
    }

    fn scenario() -> Vec<AbundanceRecord> {
        vec![
            rec("sample1", "Tuna", 10.0),
            rec("sample2", "Tuna", 0.0),
            rec("sample1", "Cod", 5.0),
            rec("sample2", "Cod", 5.0),
            rec("sample1", "Salmon", 0.0),
            rec("sample2", "Salmon", 5.0),
        ]
    }

    #[test]
    fn test_scenario_top_two() {
        let summaries = summarize(&scenario(), 2);
        assert_eq!(summaries.len(), 2);

        let s1 = find(&summaries, "sample1").unwrap();
        assert!((s1.total - 15.0).abs() < 1e-12);
        assert_eq!(s1.entries.len(), 2);
        assert_eq!(s1.entries[0].label, "Tuna");
        assert!((s1.entries[0].proportion - 10.0 / 15.0).abs() < 1e-12);
        assert_eq!(s1.entries[1].label, "Cod");
        assert!((s1.entries[1].proportion - 5.0 / 15.0).abs() < 1e-12);
        assert!(s1.other().is_none());
        assert!(s1.entry("Salmon").is_none());
    }

    #[test]
    fn test_other_collects_remainder() {
        let summaries = summarize(&scenario(), 1);
        let s1 = find(&summaries, "sample1").unwrap();
        assert_eq!(s1.entries.len(), 2);
        let other = s1.other().unwrap();
        assert_eq!(other.label, "Other");
        assert!((other.abundance - 5.0).abs() < 1e-12);
        assert!((s1.proportion_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_zero_collapses_everything() {
        let summaries = summarize(&scenario(), 0);
        let s2 = find(&summaries, "sample2").unwrap();
        assert_eq!(s2.entries.len(), 1);
        assert_eq!(s2.entries[0].kind, EntryKind::Other);
        assert!((s2.entries[0].proportion - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let summaries = summarize(&scenario(), 5);
        let s2 = find(&summaries, "sample2").unwrap();
        let labels: Vec<_> = s2.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Cod", "Salmon"]);
    }

    #[test]
    fn test_duplicates_are_summed_case_sensitive() {
        let records = vec![
            rec("s", "Tuna", 1.0),
            rec("s", "tuna", 2.5),
            rec("s", "Tuna", 2.0),
        ];
        let summaries = summarize(&records, 10);
        let s = &summaries[0];
        assert_eq!(s.entries[0].label, "Tuna");
        assert!((s.entries[0].abundance - 3.0).abs() < 1e-12);
        assert_eq!(s.entries[1].label, "tuna");
    }

    #[test]
    fn test_zero_total_sample() {
        let records = vec![rec("empty", "Tuna", 0.0), rec("empty", "Cod", 0.0)];
        let summaries = summarize(&records, 1);
        let s = &summaries[0];
        assert!(s.total.abs() < f64::EPSILON);
        assert!(s.entries.iter().all(|e| e.proportion == 0.0));
        assert!(s.proportion_sum().abs() < f64::EPSILON);
    }

    #[test]
    fn test_global_ranking_shares_labels() {
        let records = vec![
            rec("a", "Carp", 1.0),
            rec("b", "Carp", 100.0),
            rec("a", "Eel", 50.0),
            rec("b", "Eel", 0.0),
            rec("a", "Goby", 2.0),
            rec("b", "Goby", 3.0),
        ];
        let summaries = summarize_global(&records, 1);
        // Carp has the largest overall total (101), so it is kept everywhere
        let a = find(&summaries, "a").unwrap();
        assert_eq!(a.entries[0].label, "Carp");
        assert!((a.other().unwrap().abundance - 52.0).abs() < 1e-12);

        let b = find(&summaries, "b").unwrap();
        assert_eq!(b.entries[0].label, "Carp");
        assert!((b.other().unwrap().abundance - 3.0).abs() < 1e-12);
        assert!((b.proportion_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_other_label() {
        let options = SummaryOptions {
            other_label: "その他 (Other)".to_string(),
            ..SummaryOptions::new(1)
        };
        let summaries = summarize_with(&scenario(), &options);
        assert_eq!(summaries[0].other().unwrap().label, "その他 (Other)");
    }

    #[test]
    fn test_idempotent() {
        let records = scenario();
        assert_eq!(summarize(&records, 2), summarize(&records, 2));
    }
}
