use std::path::PathBuf;

use clap::Args;

use crate::analysis::AnalysisSession;
use crate::cli::{load_session, OutputFormat};
use crate::config::AnalysisConfig;

#[derive(Args)]
pub struct InspectArgs {
    /// Species table (CSV or TSV; UTF-8 or Shift-JIS)
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute inspect subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or classified.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: InspectArgs, format: OutputFormat, config: &AnalysisConfig) -> anyhow::Result<()> {
    let session = load_session(&args.input, config)?;

    match format {
        OutputFormat::Text => print_text(&args, &session),
        OutputFormat::Json => print_json(&session)?,
        OutputFormat::Tsv => print_tsv(&session),
    }

    Ok(())
}

fn print_text(args: &InspectArgs, session: &AnalysisSession) {
    let overview = session.overview();
    let normalized = &session.normalized;

    println!("File: {}", args.input.display());
    println!("   Encoding: {}", session.detection.encoding);
    println!("   Delimiter: {}", session.detection.delimiter);

    println!(
        "\nSpecies column: '{}' (rule: {})",
        session.roles.species.header, session.roles.species_rule
    );
    println!(
        "Sample columns: {} (rule: {})",
        session.roles.samples.len(),
        session.roles.sample_rule
    );
    for (column, name) in session.roles.samples.iter().zip(&normalized.samples) {
        if column.header == *name {
            println!("   {name}");
        } else {
            println!("   {} -> {name}", column.header);
        }
    }

    println!("\nSpecies: {}", overview.species_count);
    println!("Samples: {}", overview.sample_count);
    println!("Total abundance: {}", overview.total_abundance);
    println!("Mean abundance per sample: {:.2}", overview.mean_abundance_per_sample);
    println!(
        "Rows: {} kept, {} dropped (blank species)",
        normalized.rows_kept, normalized.rows_dropped
    );

    if normalized.coerced_cells > 0 {
        println!("\nWarnings: {} cells counted as 0", normalized.coerced_cells);
        for warning in &normalized.warnings {
            println!("   {warning}");
        }
        let hidden = normalized.coerced_cells - normalized.warnings.len();
        if hidden > 0 {
            println!("   ... and {hidden} more");
        }
    }
}

fn print_json(session: &AnalysisSession) -> anyhow::Result<()> {
    let normalized = &session.normalized;
    let output = serde_json::json!({
        "detection": {
            "encoding": session.detection.encoding.display_name(),
            "delimiter": session.detection.delimiter.to_string(),
        },
        "roles": session.roles,
        "samples": normalized.samples,
        "overview": session.overview(),
        "rows_kept": normalized.rows_kept,
        "rows_dropped": normalized.rows_dropped,
        "coerced_cells": normalized.coerced_cells,
        "warnings": normalized.warnings,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(session: &AnalysisSession) {
    let overview = session.overview();
    let normalized = &session.normalized;

    println!("key\tvalue");
    println!("encoding\t{}", session.detection.encoding);
    println!("delimiter\t{}", session.detection.delimiter);
    println!("species_column\t{}", session.roles.species.header);
    println!("species_rule\t{}", session.roles.species_rule);
    println!("sample_rule\t{}", session.roles.sample_rule);
    println!("samples\t{}", normalized.samples.join(","));
    println!("species_count\t{}", overview.species_count);
    println!("sample_count\t{}", overview.sample_count);
    println!("total_abundance\t{}", overview.total_abundance);
    println!("rows_kept\t{}", normalized.rows_kept);
    println!("rows_dropped\t{}", normalized.rows_dropped);
    println!("coerced_cells\t{}", normalized.coerced_cells);
}
