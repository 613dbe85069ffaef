//! Haplotyping of matches at informative positions.
//!
//! - [`HaplotypeTable`]: informative positions and expected per-haplotype alleles,
//!   loaded once and shared read-only
//! - [`extract_alleles`]: walk a match and record the query allele at informative positions
//! - [`HaplotypingResult`]: observations of one file or sample, mergeable across reads
//! - [`HaplotypingSummary`]: per-haplotype counts and the best haplotype call
//!
//! ## Scoring
//!
//! For every haplotype label, each observed position counts as a match when the
//! observed allele equals the table's expected allele and as a mismatch otherwise.
//! The score is `matches - mismatches`; all labels reaching the maximum score are
//! reported, in table order, when that maximum is positive. Otherwise the result is
//! unresolved (`-`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use clsify::haplotyping::{haplotype_matches, HaplotypeTable};
//! use clsify::parsing::blast_json::parse_blastn_json;
//! use std::path::Path;
//!
//! let table = HaplotypeTable::load(Path::new("haplotype_table.txt")).unwrap();
//! let json = std::fs::read_to_string("read.json").unwrap();
//! let matches = parse_blastn_json("read.fasta", &json).unwrap();
//!
//! for (query, result) in haplotype_matches(&matches, &table).unwrap() {
//!     let summary = result.summarize(&table);
//!     println!("{query}: {} ({})", summary.call.best_haplotypes, summary.call.best_score);
//! }
//! ```

use thiserror::Error;

use crate::parsing::ParseError;

pub mod extract;
pub mod result;
pub mod table;

pub use extract::{extract_alleles, haplotype_matches};
pub use result::{HaplotypeCall, HaplotypeCount, HaplotypingResult, HaplotypingSummary};
pub use table::{HaplotypeTable, InformativePosition};

#[derive(Error, Debug)]
pub enum HaplotypingError {
    #[error("Malformed alignment for {query}: invalid hit character '{character}' in column {column}")]
    MalformedAlignment {
        query: String,
        column: usize,
        character: char,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
