use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_session, OutputFormat};
use crate::config::{AnalysisConfig, DEFAULT_TOP_N, MAX_TOP_N};
use crate::core::types::Ranking;
use crate::export::{self, ExportTable};

#[derive(Args)]
pub struct ExportArgs {
    /// Species table (CSV or TSV; UTF-8 or Shift-JIS)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Which derived table to write
    #[arg(short, long, value_enum)]
    pub table: ExportTable,

    /// Species per sample before folding into "Other" (summary tables only, max 100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Ranking used for the summary tables
    #[arg(long, value_enum, default_value = "per-sample")]
    pub ranking: Ranking,

    /// Output file. If not specified, writes to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute export subcommand
///
/// Output is always CSV; the global `--format` flag is ignored.
///
/// # Errors
///
/// Returns an error if the input cannot be read or classified, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ExportArgs, _format: OutputFormat, config: &AnalysisConfig) -> anyhow::Result<()> {
    let session = load_session(&args.input, config)?;
    let bytes = export::render(&session, args.table, args.top_n.min(MAX_TOP_N), args.ranking)?;

    if let Some(path) = &args.output {
        std::fs::write(path, &bytes)?;
        eprintln!("Wrote {} table to {}", args.table, path.display());
    } else {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    }

    Ok(())
}
