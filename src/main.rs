use clap::Parser;
use tracing_subscriber::EnvFilter;

use clsify::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("clsify=debug,info")
    } else {
        EnvFilter::new("clsify=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Classify(args) => {
            cli::classify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::VariantTable(args) => {
            cli::variant_table::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Consensus(args) => {
            cli::consensus::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Paste(args) => {
            cli::paste::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
