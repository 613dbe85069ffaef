//! # clsify
//!
//! Haplotype classification of *Liberibacter solanacearum* (Lso) sequencing reads.
//!
//! Reads are aligned against reference loci (16S, 50S, ...) with an external pairwise
//! aligner. Each match is strand-normalised so the reference side is always forward,
//! and the read's alleles at known informative positions are compared with the
//! expected alleles of every haplotype. Observations of several reads of one sample
//! are merged before the best haplotype is called.
//!
//! Separately, the variant table describing how each haplotype's consensus differs
//! from the reference is derived from a multiple sequence alignment.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use clsify::external::{Blastn, ToolConfig};
//! use clsify::haplotyping::HaplotypeTable;
//! use clsify::workflow::{classify_batch, ClassifyConfig};
//!
//! let table = HaplotypeTable::load(Path::new("haplotypes.tsv")).unwrap();
//! let blastn = Blastn::new(ToolConfig::new("blastn", Duration::from_secs(600)));
//! let reads = vec![Path::new("reads/CA_SJV_Tm3_16S_LsoF.fasta").to_path_buf()];
//!
//! let report = classify_batch(
//!     &blastn,
//!     Path::new("ref_seqs.fasta"),
//!     &reads,
//!     &table,
//!     &ClassifyConfig::default(),
//! );
//! for file in &report.files {
//!     println!("{}: {}", file.query, file.haplotyping.call.best_haplotypes);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Alignments, CIGAR strings, strands and matches
//! - [`haplotyping`]: Informative positions, allele extraction, merging and scoring
//! - [`variants`]: Variant calling from alignment rows and variant tables
//! - [`parsing`]: FASTA, TSV and blastn JSON parsers
//! - [`external`]: External aligners run with timeouts
//! - [`workflow`]: Batch classification, checkpoints, consensus and paste
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod external;
pub mod haplotyping;
pub mod parsing;
pub mod variants;
pub mod workflow;

// Re-export commonly used types for convenience
pub use crate::core::hit::Match;
pub use crate::core::types::*;
pub use haplotyping::{HaplotypeTable, HaplotypingResult, HaplotypingSummary};
pub use variants::{call_variants, VariantCall};
