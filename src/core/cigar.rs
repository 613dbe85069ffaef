//! Run-length encoded alignment operations.
//!
//! Alignments are summarised as a CIGAR-like list of `(length, operation)` runs
//! computed from the gapped query and hit rows, with hard clips for the parts of the
//! query that the aligner did not include in the local alignment.

use serde::{Serialize, Serializer};

use crate::core::sequence::GAP;

/// A single alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CigarOp {
    /// Aligned column with bases on both sides (identity or mismatch)
    Match,
    /// Gap in the hit/database row
    Insert,
    /// Gap in the query row
    Delete,
    /// Query bases outside the aligned span
    HardClip,
}

impl CigarOp {
    /// Single letter SAM-style code
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Insert => 'I',
            Self::Delete => 'D',
            Self::HardClip => 'H',
        }
    }

    fn classify(query: char, hit: char) -> Self {
        if query == GAP {
            Self::Delete
        } else if hit == GAP {
            Self::Insert
        } else {
            Self::Match
        }
    }
}

/// A run of identical operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CigarRun {
    pub length: usize,
    pub op: CigarOp,
}

impl CigarRun {
    #[must_use]
    pub fn new(length: usize, op: CigarOp) -> Self {
        Self { length, op }
    }
}

/// Ordered list of runs; adjacent runs never share an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cigar {
    runs: Vec<CigarRun>,
}

impl Cigar {
    /// Build the operation runs for an alignment.
    ///
    /// `query_row` and `hit_row` are the gapped alignment rows, `start..end` is the
    /// 0-based half-open span of the query covered by the alignment and `query_length`
    /// the full length of the query.
    #[must_use]
    pub fn from_alignment(
        query_row: &str,
        hit_row: &str,
        start: usize,
        end: usize,
        query_length: usize,
    ) -> Self {
        let mut cigar = Self::default();

        if start > 0 {
            cigar.push(start, CigarOp::HardClip);
        }
        for (query, hit) in query_row.chars().zip(hit_row.chars()) {
            cigar.push(1, CigarOp::classify(query, hit));
        }
        if end != query_length {
            cigar.push(query_length.saturating_sub(end), CigarOp::HardClip);
        }

        cigar
    }

    /// Append `length` operations, extending the last run when it has the same operation.
    fn push(&mut self, length: usize, op: CigarOp) {
        match self.runs.last_mut() {
            Some(last) if last.op == op => last.length += length,
            _ => self.runs.push(CigarRun::new(length, op)),
        }
    }

    #[must_use]
    pub fn runs(&self) -> &[CigarRun] {
        &self.runs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Sum of all run lengths, clips included
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.runs.iter().map(|run| run.length).sum()
    }
}

impl std::fmt::Display for Cigar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for run in &self.runs {
            write!(f, "{}{}", run.length, run.op.code())?;
        }
        Ok(())
    }
}

impl Serialize for Cigar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_cigar() {
        let cigar = Cigar::from_alignment("CGATCG-T", "CG-TCGAT", 2, 10, 12);
        let expected = vec![
            CigarRun::new(2, CigarOp::HardClip),
            CigarRun::new(2, CigarOp::Match),
            CigarRun::new(1, CigarOp::Insert),
            CigarRun::new(3, CigarOp::Match),
            CigarRun::new(1, CigarOp::Delete),
            CigarRun::new(1, CigarOp::Match),
            CigarRun::new(2, CigarOp::HardClip),
        ];
        assert_eq!(cigar.runs(), expected.as_slice());
        assert_eq!(cigar.to_string(), "2H2M1I3M1D1M2H");
        assert_eq!(cigar.total_length(), 12);
    }

    #[test]
    fn test_no_clips_when_alignment_spans_query() {
        let cigar = Cigar::from_alignment("ACGT", "ACGT", 0, 4, 4);
        assert_eq!(cigar.to_string(), "4M");
    }

    #[test]
    fn test_adjacent_runs_never_share_operation() {
        let cigar = Cigar::from_alignment("AC--GTT-", "ACTTG--A", 3, 11, 14);
        for pair in cigar.runs().windows(2) {
            assert_ne!(pair[0].op, pair[1].op);
        }
        assert_eq!(cigar.to_string(), "3H2M2D1M2I1D3H");
        assert_eq!(cigar.total_length(), 14);
    }

    #[test]
    fn test_empty_alignment() {
        let cigar = Cigar::from_alignment("", "", 0, 0, 0);
        assert!(cigar.is_empty());
        assert_eq!(cigar.to_string(), "");
    }
}
