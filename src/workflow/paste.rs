//! Paste matched query bases into the reference sequence they aligned to.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::hit::Match;
use crate::external::PairwiseAligner;
use crate::parsing::fasta::{write_record, SequenceSet};
use crate::workflow::{SkippedItem, WorkflowError};

/// Replace the matched reference segment by the query's bases.
///
/// The query bases are the ungapped, strand-normalised query row of the alignment.
/// `N` is removed from the result and everything is upper-cased. Returns `None` for
/// "no match" records.
///
/// # Errors
///
/// Returns `WorkflowError::MatchOutOfRange` if the match coordinates do not fit the
/// reference.
pub fn paste_match(m: &Match, reference: &str) -> Result<Option<String>, WorkflowError> {
    let Some(database) = m.database.as_deref().filter(|_| m.is_match()) else {
        return Ok(None);
    };

    let out_of_range = || WorkflowError::MatchOutOfRange {
        query: m.query.clone(),
        database: database.to_string(),
        start: m.database_start,
        end: m.database_end,
    };
    let prefix = reference.get(..m.database_start).ok_or_else(out_of_range)?;
    let suffix = reference.get(m.database_end..).ok_or_else(out_of_range)?;
    if m.database_start > m.database_end {
        return Err(out_of_range());
    }

    let pasted: String = prefix
        .chars()
        .chain(m.match_seq.chars())
        .chain(suffix.chars())
        .filter(|c| *c != 'N')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    Ok(Some(pasted))
}

/// Write the pasted sequence of every match to
/// `<prefix><database>/<query>-<database>.fasta`.
///
/// No-match records are logged and skipped. Returns the written paths.
///
/// # Errors
///
/// Returns `WorkflowError::MissingReference` if a match refers to a sequence not in
/// `references`, or any IO error.
pub fn write_pasted(
    matches: &[Match],
    references: &SequenceSet,
    output_prefix: &str,
) -> Result<Vec<PathBuf>, WorkflowError> {
    let mut written = Vec::new();

    for m in matches {
        let Some(database) = m.database.as_deref().filter(|_| m.is_match()) else {
            info!("No match for {}", m.query);
            continue;
        };
        let reference = references
            .get(database)
            .ok_or_else(|| WorkflowError::MissingReference(database.to_string()))?;
        let Some(sequence) = paste_match(m, reference)? else {
            continue;
        };

        let query = m.query.split(' ').next().unwrap_or(&m.query);
        let path = PathBuf::from(format!("{output_prefix}{database}/{query}-{database}.fasta"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("Writing {}", path.display());

        let mut writer = BufWriter::new(File::create(&path)?);
        write_record(&mut writer, &format!("{query} ({} bp)", sequence.len()), &sequence)?;
        writer.flush()?;
        written.push(path);
    }

    Ok(written)
}

/// Files written by a paste run and the inputs that failed
#[derive(Debug, Clone, Default, Serialize)]
pub struct PasteReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedItem>,
}

/// Align every input and paste its matches into the references.
///
/// Inputs are independent: one that cannot be aligned, or whose matches do not fit
/// the references, is logged and reported as skipped.
pub fn paste_files<A: PairwiseAligner + ?Sized>(
    aligner: &A,
    database: &Path,
    inputs: &[PathBuf],
    references: &SequenceSet,
    output_prefix: &str,
) -> PasteReport {
    let mut report = PasteReport::default();

    for input in inputs {
        let outcome = aligner
            .align(database, input)
            .map_err(WorkflowError::from)
            .and_then(|matches| write_pasted(&matches, references, output_prefix));
        match outcome {
            Ok(paths) => report.written.extend(paths),
            Err(e) => {
                let item = input.display().to_string();
                warn!("Skipping {}: {}", item, e);
                report.skipped.push(SkippedItem {
                    item,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::AlignedPair;
    use crate::external::blast::query_name;
    use crate::external::ExternalToolError;
    use crate::core::hit::RawHit;
    use crate::core::types::Strand;
    use tempfile::TempDir;

    fn make_match(database_start: usize, qseq: &str, hseq: &str) -> Match {
        let len = hseq.chars().filter(|c| *c != '-').count();
        let qlen = qseq.chars().filter(|c| *c != '-').count();
        Match::from_hit(
            RawHit {
                query: "read1 some description".to_string(),
                database: "16S_ref".to_string(),
                identity: 1.0,
                query_strand: Strand::Forward,
                query_start: 0,
                query_end: qlen,
                query_length: qlen,
                database_strand: Strand::Forward,
                database_start,
                database_end: database_start + len,
                alignment: AlignedPair::new(hseq, "", qseq),
            },
            "",
        )
    }

    #[test]
    fn test_paste_replaces_segment() {
        let m = make_match(2, "TT-A", "GGCA");
        assert_eq!(paste_match(&m, "aaGGCAcc").unwrap().unwrap(), "AATTACC");
    }

    #[test]
    fn test_paste_drops_n() {
        let m = make_match(0, "NC", "AC");
        assert_eq!(paste_match(&m, "ACGNT").unwrap().unwrap(), "CGT");
    }

    #[test]
    fn test_no_match_is_none() {
        let m = Match::no_match("read1", "");
        assert_eq!(paste_match(&m, "ACGT").unwrap(), None);
    }

    #[test]
    fn test_out_of_range() {
        let m = make_match(6, "AC", "AC");
        assert!(matches!(
            paste_match(&m, "ACGT"),
            Err(WorkflowError::MatchOutOfRange { .. })
        ));
    }

    #[test]
    fn test_write_pasted() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/out.d/", dir.path().display());
        let references: SequenceSet = [("16S_ref", "aaGGCAcc")].into_iter().collect();
        let matches = vec![make_match(2, "TTA", "GCA"), Match::no_match("read2", "")];

        let written = write_pasted(&matches, &references, &prefix).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("16S_ref/read1-16S_ref.fasta"));
        let text = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(text, ">read1 (8 bp)\nAATTAACC\n");
    }

    #[test]
    fn test_missing_reference() {
        let references = SequenceSet::new();
        let err = write_pasted(&[make_match(0, "A", "A")], &references, "x/").unwrap_err();
        assert!(matches!(err, WorkflowError::MissingReference(_)));
    }

    /// Maps `short*` inputs to a match past the end of the reference
    struct FakeAligner;

    impl PairwiseAligner for FakeAligner {
        fn align(
            &self,
            _database: &Path,
            query: &Path,
        ) -> Result<Vec<Match>, ExternalToolError> {
            let name = query_name(query);
            let start = if name.starts_with("short") { 20 } else { 2 };
            let mut m = make_match(start, "TTA", "GCA");
            m.query = name;
            Ok(vec![m])
        }
    }

    #[test]
    fn test_paste_files_isolates_bad_input() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/out.d/", dir.path().display());
        let references: SequenceSet = [("16S_ref", "aaGGCAcc")].into_iter().collect();
        let inputs = vec![PathBuf::from("short.fasta"), PathBuf::from("good.fasta")];

        let report = paste_files(
            &FakeAligner,
            Path::new("refs.fasta"),
            &inputs,
            &references,
            &prefix,
        );

        assert_eq!(report.written.len(), 1);
        assert!(report.written[0].ends_with("16S_ref/good-16S_ref.fasta"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].item, "short.fasta");
        assert!(report.skipped[0].reason.contains("outside the reference"));
    }
}
