use std::io::Write;

use crate::analysis::aggregate::{EntryKind, SampleSummary};
use crate::analysis::diversity::DiversityMetrics;
use crate::analysis::matrix::AbundanceMatrix;

/// Header of the species column in wide exports; matches the default alias list
pub const SPECIES_HEADER: &str = "Species";

/// Shortest representation that parses back to the same `f64`
fn num(v: f64) -> String {
    format!("{v}")
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().from_writer(out)
}

/// Long form: one row per (sample, bar segment)
///
/// # Errors
///
/// Returns `csv::Error` if writing to `out` fails.
pub fn write_summary_long<W: Write>(summaries: &[SampleSummary], out: W) -> Result<(), csv::Error> {
    let mut w = writer(out);
    w.write_record(["Sample", "Label", "Abundance", "Proportion"])?;
    for summary in summaries {
        for entry in &summary.entries {
            w.write_record([
                summary.sample.as_str(),
                entry.label.as_str(),
                &num(entry.abundance),
                &num(entry.proportion),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Wide form: one row per label, one proportion column per sample.
///
/// Labels appear in first-seen order with "Other" last. A label missing from
/// a sample is written as 0. The layout re-imports as an ordinary table.
///
/// # Errors
///
/// Returns `csv::Error` if writing to `out` fails.
pub fn write_summary_wide<W: Write>(summaries: &[SampleSummary], out: W) -> Result<(), csv::Error> {
    let mut species_labels: Vec<&str> = Vec::new();
    let mut other_label: Option<&str> = None;
    for entry in summaries.iter().flat_map(|s| &s.entries) {
        match entry.kind {
            EntryKind::Species => {
                if !species_labels.contains(&entry.label.as_str()) {
                    species_labels.push(&entry.label);
                }
            }
            EntryKind::Other => other_label = Some(&entry.label),
        }
    }

    let mut w = writer(out);
    let mut header = vec![SPECIES_HEADER];
    header.extend(summaries.iter().map(|s| s.sample.as_str()));
    w.write_record(&header)?;

    let rows = species_labels
        .iter()
        .map(|label| (*label, EntryKind::Species))
        .chain(other_label.map(|label| (label, EntryKind::Other)));

    for (label, kind) in rows {
        let mut record = vec![label.to_string()];
        record.extend(summaries.iter().map(|s| {
            let proportion = s
                .entries
                .iter()
                .find(|e| e.kind == kind && e.label == label)
                .map_or(0.0, |e| e.proportion);
            num(proportion)
        }));
        w.write_record(&record)?;
    }

    w.flush()?;
    Ok(())
}

/// One row per sample with its diversity indices
///
/// # Errors
///
/// Returns `csv::Error` if writing to `out` fails.
pub fn write_diversity<W: Write>(metrics: &[DiversityMetrics], out: W) -> Result<(), csv::Error> {
    let mut w = writer(out);
    w.write_record(["Sample", "Richness", "Shannon", "Simpson"])?;
    for m in metrics {
        w.write_record([
            m.sample.as_str(),
            &m.richness.to_string(),
            &num(m.shannon),
            &num(m.simpson),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Species rows × sample columns, as in the source table
///
/// # Errors
///
/// Returns `csv::Error` if writing to `out` fails.
pub fn write_matrix<W: Write>(matrix: &AbundanceMatrix, out: W) -> Result<(), csv::Error> {
    let mut w = writer(out);
    let mut header = vec![SPECIES_HEADER];
    header.extend(matrix.samples.iter().map(String::as_str));
    w.write_record(&header)?;

    for (species, row) in matrix.species.iter().zip(&matrix.values) {
        let mut record = vec![species.clone()];
        record.extend(row.iter().map(|v| num(*v)));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}
