use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::external::{Blastn, ToolConfig};
use crate::parsing::fasta::read_fasta_file;
use crate::workflow::paste::paste_files;

#[derive(Args)]
pub struct PasteArgs {
    /// Query FASTA files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// BLAST database of the reference loci
    #[arg(short, long)]
    pub database: PathBuf,

    /// Reference FASTA the database was built from (defaults to the database path)
    #[arg(short, long)]
    pub references: Option<PathBuf>,

    /// Path to the blastn executable
    #[arg(long, default_value = "blastn")]
    pub blastn: PathBuf,

    /// Seconds allowed for each blastn run
    #[arg(long, default_value = "600")]
    pub timeout: u64,

    /// Prefix for output files
    #[arg(short, long, default_value = "clsify_paste_out.d/")]
    pub output_prefix: String,
}

/// Execute paste subcommand
///
/// # Errors
///
/// Returns an error if the references cannot be read. Inputs that fail are reported
/// as skipped.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PasteArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let references_path = args.references.as_ref().unwrap_or(&args.database);
    let references = read_fasta_file(references_path)
        .with_context(|| format!("Failed to read references {}", references_path.display()))?;

    let config = ToolConfig::new(&args.blastn, Duration::from_secs(args.timeout));
    let aligner = Blastn::new(config);
    let report = paste_files(
        &aligner,
        &args.database,
        &args.inputs,
        &references,
        &args.output_prefix,
    );

    if verbose {
        eprintln!("Wrote {} pasted sequences", report.written.len());
    }

    match format {
        OutputFormat::Text | OutputFormat::Tsv => {
            for path in &report.written {
                println!("{}", path.display());
            }
            for skipped in &report.skipped {
                eprintln!("Skipped {}: {}", skipped.item, skipped.reason);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
