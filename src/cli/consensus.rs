use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::OutputFormat;
use crate::parsing::fasta::{read_fasta_file, write_record};
use crate::workflow::consensus::column_consensus;

#[derive(Args)]
pub struct ConsensusArgs {
    /// Aligned FASTA file (e.g. ClustalW output)
    pub input: PathBuf,

    /// Name of the consensus record (defaults to the input file name without extension)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Write the consensus FASTA to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute consensus subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or is empty.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ConsensusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let alignment = read_fasta_file(&args.input)
        .with_context(|| format!("Failed to read alignment {}", args.input.display()))?;
    if alignment.is_empty() {
        bail!("No sequences in {}", args.input.display());
    }

    let rows: Vec<&str> = alignment.iter().map(|(_, row)| row).collect();
    let sequence = column_consensus(&rows);
    let name = args.name.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map_or_else(|| "consensus".to_string(), |s| s.to_string_lossy().into_owned())
    });
    let header = format!("consensus-{name}");

    if verbose {
        eprintln!(
            "Consensus of {} sequences: {} bp",
            alignment.len(),
            sequence.len()
        );
    }

    if let Some(path) = &args.output {
        let mut writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        write_record(&mut writer, &header, &sequence)?;
        writer.flush()?;
        return Ok(());
    }

    match format {
        OutputFormat::Text | OutputFormat::Tsv => {
            let mut stdout = io::stdout().lock();
            write_record(&mut stdout, &header, &sequence)?;
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": header,
                "sequences": alignment.len(),
                "length": sequence.len(),
                "sequence": sequence,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
