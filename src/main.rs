use clap::Parser;
use tracing_subscriber::EnvFilter;

use mitofish_viz::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("mitofish_viz=debug,info")
    } else {
        EnvFilter::new("mitofish_viz=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = cli.analysis_config()?;

    match cli.command {
        cli::Commands::Inspect(args) => {
            cli::inspect::run(args, cli.format, &config)?;
        }
        cli::Commands::Summarize(args) => {
            cli::summarize::run(args, cli.format, &config)?;
        }
        cli::Commands::Diversity(args) => {
            cli::diversity::run(args, cli.format, &config)?;
        }
        cli::Commands::Export(args) => {
            cli::export::run(args, cli.format, &config)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, config)?;
        }
    }

    Ok(())
}
