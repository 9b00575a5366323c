use std::path::PathBuf;

use clap::Args;

use crate::analysis::DiversityMetrics;
use crate::cli::{load_session, OutputFormat};
use crate::config::AnalysisConfig;

#[derive(Args)]
pub struct DiversityArgs {
    /// Species table (CSV or TSV; UTF-8 or Shift-JIS)
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute diversity subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or classified.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DiversityArgs, format: OutputFormat, config: &AnalysisConfig) -> anyhow::Result<()> {
    let session = load_session(&args.input, config)?;
    let metrics = session.diversity();

    match format {
        OutputFormat::Text => print_text(&metrics),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        OutputFormat::Tsv => {
            println!("sample\trichness\tshannon\tsimpson");
            for m in &metrics {
                println!("{}\t{}\t{:.6}\t{:.6}", m.sample, m.richness, m.shannon, m.simpson);
            }
        }
    }

    Ok(())
}

fn print_text(metrics: &[DiversityMetrics]) {
    let width = metrics
        .iter()
        .map(|m| m.sample.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sample".len());

    println!("{:<width$}  {:>8}  {:>8}  {:>8}", "Sample", "Richness", "Shannon", "Simpson");
    for m in metrics {
        println!(
            "{:<width$}  {:>8}  {:>8.3}  {:>8.3}",
            m.sample, m.richness, m.shannon, m.simpson
        );
    }
}
