//! Orchestration: batch classification, reference-table artifacts and sequence
//! post-processing.

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod consensus;
pub mod paste;

pub use batch::{
    classify_batch, classify_file, sample_id, BatchReport, FileResult, SkippedItem,
};
pub use checkpoint::Checkpoint;
pub use config::ClassifyConfig;
pub use consensus::column_consensus;
pub use paste::{paste_files, paste_match, write_pasted, PasteReport};

use thiserror::Error;

use crate::external::ExternalToolError;
use crate::haplotyping::HaplotypingError;
use crate::parsing::ParseError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Haplotyping(#[from] HaplotypingError),

    #[error(transparent)]
    Tool(#[from] ExternalToolError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Match of {query} on {database} [{start}, {end}) is outside the reference")]
    MatchOutOfRange {
        query: String,
        database: String,
        start: usize,
        end: usize,
    },

    #[error("Reference sequence not found: {0}")]
    MissingReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
