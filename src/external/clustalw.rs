//! Multiple sequence alignment with ClustalW.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;

use tracing::debug;

use crate::external::{run_tool, ExternalToolError, ToolConfig};
use crate::parsing::fasta::{read_fasta_file, write_fasta, SequenceSet};

/// Something that aligns a set of named sequences.
///
/// The result holds one equal-length row per input sequence, under the input name.
pub trait MultipleAligner {
    /// Align `sequences`.
    ///
    /// # Errors
    ///
    /// Returns an error if the aligner fails or its output cannot be read.
    fn align(&self, sequences: &SequenceSet) -> Result<SequenceSet, ExternalToolError>;
}

/// `clustalw` (ClustalW 2)
#[derive(Debug, Clone)]
pub struct ClustalW {
    config: ToolConfig,
}

impl ClustalW {
    /// Fixed seed so repeated runs give identical alignments
    pub const SEED: u32 = 42;

    #[must_use]
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

impl MultipleAligner for ClustalW {
    fn align(&self, sequences: &SequenceSet) -> Result<SequenceSet, ExternalToolError> {
        if sequences.len() <= 1 {
            return Ok(sequences.clone());
        }

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.fasta");
        let output = workdir.path().join("output.fasta");

        let mut writer = BufWriter::new(File::create(&input)?);
        write_fasta(&mut writer, sequences)?;
        writer.flush()?;
        drop(writer);

        run_tool(
            &self.config,
            [
                format!("-INFILE={}", input.display()),
                "-ALIGN".to_string(),
                format!("-OUTFILE={}", output.display()),
                "-OUTPUT=FASTA".to_string(),
                "-OUTORDER=ALIGNED".to_string(),
                format!("-SEED={}", Self::SEED),
            ],
        )?;

        let aligned = read_fasta_file(&output)?;
        debug!("Aligned {} sequences", aligned.len());
        Ok(aligned)
    }
}
