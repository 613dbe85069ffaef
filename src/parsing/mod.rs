//! Parsers for the flat files clsify reads and writes.
//!
//! - **FASTA**: reference loci, query reads, consensus and aligned (MSA) sequences
//! - **TSV**: the informative-position table and other tab-separated inputs
//! - **BLAST JSON**: `blastn -outfmt 15` output, turned into strand-normalised matches
//!
//! ## Example
//!
//! ```rust,no_run
//! use clsify::parsing::fasta::read_fasta_file;
//! use std::path::Path;
//!
//! let sequences = read_fasta_file(Path::new("ref_seqs.fasta")).unwrap();
//! for name in sequences.names() {
//!     println!("{name}");
//! }
//! ```

use thiserror::Error;

pub mod blast_json;
pub mod fasta;
pub mod tsv;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
