//! Pairwise alignment of query reads against the reference database with `blastn`.

use std::path::{Path, PathBuf};

use crate::core::hit::Match;
use crate::external::{run_tool, ExternalToolError, ToolConfig};
use crate::parsing::blast_json::parse_blastn_json;

/// Something that aligns a query FASTA against a reference database.
///
/// Implementations return every match found for the query, or a single no-match
/// record when nothing aligned. "No match" is a successful result; only a failure
/// of the aligner itself is an error.
pub trait PairwiseAligner {
    /// Align the sequences in `query` against `database`.
    ///
    /// # Errors
    ///
    /// Returns an error if the aligner fails or its output cannot be parsed.
    fn align(&self, database: &Path, query: &Path) -> Result<Vec<Match>, ExternalToolError>;
}

/// `blastn` from NCBI BLAST+
#[derive(Debug, Clone)]
pub struct Blastn {
    config: ToolConfig,
}

impl Blastn {
    #[must_use]
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    fn arguments(database: &Path, query: &Path) -> Vec<PathBuf> {
        vec![
            PathBuf::from("-db"),
            database.to_path_buf(),
            PathBuf::from("-query"),
            query.to_path_buf(),
            PathBuf::from("-outfmt"),
            PathBuf::from("15"),
        ]
    }
}

/// Name under which matches of a query file are reported: the file name without
/// its extension
#[must_use]
pub fn query_name(query: &Path) -> String {
    query.file_stem().map_or_else(
        || query.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

impl PairwiseAligner for Blastn {
    fn align(&self, database: &Path, query: &Path) -> Result<Vec<Match>, ExternalToolError> {
        let json = run_tool(&self.config, Self::arguments(database, query))?;
        Ok(parse_blastn_json(&query_name(query), &json)?)
    }
}
