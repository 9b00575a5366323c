use std::path::PathBuf;

use clap::Args;

use crate::analysis::{EntryKind, SampleSummary};
use crate::cli::{load_session, OutputFormat};
use crate::config::{AnalysisConfig, DEFAULT_TOP_N, MAX_TOP_N};
use crate::core::types::Ranking;

#[derive(Args)]
pub struct SummarizeArgs {
    /// Species table (CSV or TSV; UTF-8 or Shift-JIS)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Number of species to show per sample before folding into "Other" (max 100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Rank species within each sample, or by their total over all samples
    #[arg(long, value_enum, default_value = "per-sample")]
    pub ranking: Ranking,
}

/// Execute summarize subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or classified.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SummarizeArgs, format: OutputFormat, config: &AnalysisConfig) -> anyhow::Result<()> {
    let session = load_session(&args.input, config)?;
    let top_n = args.top_n.min(MAX_TOP_N);
    let summaries = session.summaries(top_n, args.ranking);

    tracing::debug!(
        "Summarized {} samples (top {top_n}, {:?} ranking)",
        summaries.len(),
        args.ranking
    );

    match format {
        OutputFormat::Text => print_text(&summaries),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Tsv => print_tsv(&summaries),
    }

    Ok(())
}

fn print_text(summaries: &[SampleSummary]) {
    for (i, summary) in summaries.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }
        println!("\n{} (total {})", summary.sample, summary.total);

        if summary.entries.is_empty() {
            println!("   (no species detected)");
            continue;
        }

        let width = summary.entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
        for entry in &summary.entries {
            let marker = match entry.kind {
                EntryKind::Species => " ",
                EntryKind::Other => "+",
            };
            println!(
                " {marker} {:<width$}  {:>6.1}%  ({})",
                entry.label,
                entry.proportion * 100.0,
                entry.abundance,
            );
        }
    }
}

fn print_tsv(summaries: &[SampleSummary]) {
    println!("sample\trank\tlabel\tkind\tabundance\tproportion");
    for summary in summaries {
        for (i, entry) in summary.entries.iter().enumerate() {
            let kind = match entry.kind {
                EntryKind::Species => "species",
                EntryKind::Other => "other",
            };
            println!(
                "{}\t{}\t{}\t{kind}\t{}\t{:.6}",
                summary.sample,
                i + 1,
                entry.label,
                entry.abundance,
                entry.proportion,
            );
        }
    }
}
