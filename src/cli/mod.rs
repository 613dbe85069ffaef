//! Command-line interface for clsify.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **classify**: Align reads against the reference loci and call their haplotypes
//! - **variant-table**: Build the per-region variant table from haplotype consensus sequences
//! - **consensus**: Column consensus of an aligned FASTA file
//! - **paste**: Paste matched read sequences into their reference sequences
//!
//! ## Usage
//!
//! ```text
//! # Classify reads
//! clsify classify --database ref_seqs.fasta --haplotype-table haplotypes.tsv reads/*.fasta
//!
//! # Machine-readable output on four threads
//! clsify --format json classify -d ref_seqs.fasta -H haplotypes.tsv -t 4 reads/*.fasta
//!
//! # Build the variant table
//! clsify --format tsv variant-table --references ref_seqs.fasta --consensus-dir consensus/
//! ```

use clap::{Parser, Subcommand};

pub mod classify;
pub mod consensus;
pub mod paste;
pub mod variant_table;

#[derive(Parser)]
#[command(name = "clsify")]
#[command(version)]
#[command(about = "Classify Liberibacter solanacearum reads into haplotypes")]
#[command(
    long_about = "clsify aligns sequencing reads against reference loci of Liberibacter solanacearum and calls the haplotype of each read and sample from the alleles at informative positions.\n\nIt also builds the variant table that describes how the haplotypes differ from the reference."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify read files into haplotypes
    Classify(classify::ClassifyArgs),

    /// Build the variant table from haplotype consensus sequences
    VariantTable(variant_table::VariantTableArgs),

    /// Compute the column consensus of an aligned FASTA file
    Consensus(consensus::ConsensusArgs),

    /// Paste matched reads into their reference sequences
    Paste(paste::PasteArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
