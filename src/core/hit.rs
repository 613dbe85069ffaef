//! Pairwise alignment results.
//!
//! The aligner reports a [`RawHit`] per database sequence. Before it becomes a
//! [`Match`] the hit is strand-normalised so that the database side is always on the
//! forward strand; informative positions are defined in forward-strand coordinates of
//! the reference, so every downstream consumer can walk the database row left to right.

use serde::Serialize;
use tracing::info;

use crate::core::alignment::AlignedPair;
use crate::core::cigar::Cigar;
use crate::core::sequence::only_bases;
use crate::core::types::Strand;

/// An alignment hit as reported by the pairwise aligner, before normalisation.
///
/// Coordinates are 0-based, half-open.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub query: String,
    pub database: String,
    pub identity: f64,
    pub query_strand: Strand,
    pub query_start: usize,
    pub query_end: usize,
    /// Full length of the query sequence
    pub query_length: usize,
    pub database_strand: Strand,
    pub database_start: usize,
    pub database_end: usize,
    pub alignment: AlignedPair,
}

impl RawHit {
    /// Put the database side of the hit on the forward strand.
    ///
    /// Hits already on the forward database strand are returned unchanged. Otherwise
    /// both alignment rows are reverse-complemented, the mid-line reversed, and the
    /// query strand flipped.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.database_strand == Strand::Forward {
            return self;
        }

        info!(
            query = %self.query,
            database = %self.database,
            "Reverse-complementing match"
        );
        Self {
            query_strand: self.query_strand.flipped(),
            database_strand: Strand::Forward,
            alignment: self.alignment.revcomp(),
            ..self
        }
    }
}

/// A normalised pairwise match of one query against one database sequence, or an
/// explicit "no match" record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Query sequence name
    pub query: String,
    /// Database sequence name, `None` for "no match"
    pub database: Option<String>,
    /// Identity fraction in `[0, 1]`
    pub identity: f64,
    pub query_strand: Strand,
    pub query_start: usize,
    pub query_end: usize,
    /// Always `Forward` for matches
    pub database_strand: Strand,
    pub database_start: usize,
    pub database_end: usize,
    /// Operation runs of the alignment, clips included
    pub cigar: Cigar,
    /// Ungapped query bases of the aligned region, database orientation
    pub match_seq: String,
    pub alignment: AlignedPair,
    /// Raw aligner output the match was parsed from
    #[serde(skip)]
    pub provenance: String,
}

impl Match {
    /// Build a match from an aligner hit, normalising its strand first.
    #[must_use]
    pub fn from_hit(hit: RawHit, provenance: impl Into<String>) -> Self {
        let hit = hit.normalized();
        let cigar = Cigar::from_alignment(
            &hit.alignment.qseq,
            &hit.alignment.hseq,
            hit.query_start,
            hit.query_end,
            hit.query_length,
        );

        Self {
            query: hit.query,
            database: Some(hit.database),
            identity: hit.identity,
            query_strand: hit.query_strand,
            query_start: hit.query_start,
            query_end: hit.query_end,
            database_strand: hit.database_strand,
            database_start: hit.database_start,
            database_end: hit.database_end,
            cigar,
            match_seq: only_bases(&hit.alignment.qseq),
            alignment: hit.alignment,
            provenance: provenance.into(),
        }
    }

    /// Record stating that `query` did not align to any database sequence.
    pub fn no_match(query: impl Into<String>, provenance: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            database: None,
            identity: 0.0,
            query_strand: Strand::Unknown,
            query_start: 0,
            query_end: 0,
            database_strand: Strand::Unknown,
            database_start: 0,
            database_end: 0,
            cigar: Cigar::default(),
            match_seq: String::new(),
            alignment: AlignedPair::empty(),
            provenance: provenance.into(),
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.database.as_deref().is_some_and(|db| !db.is_empty())
    }

    /// Reference name used for informative positions: the database id up to the first
    /// underscore (the strain suffix is dropped).
    #[must_use]
    pub fn reference_key(&self) -> Option<&str> {
        self.database
            .as_deref()
            .map(|db| db.split('_').next().unwrap_or(db))
    }

    /// The match with the highest identity; the first one wins ties.
    #[must_use]
    pub fn best(matches: &[Match]) -> Option<&Match> {
        matches
            .iter()
            .filter(|m| m.is_match())
            .fold(None, |best: Option<&Match>, m| match best {
                Some(b) if b.identity >= m.identity => Some(b),
                _ => Some(m),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_hit(database_strand: Strand) -> RawHit {
        RawHit {
            query: "read1".to_string(),
            database: "16S_Lso".to_string(),
            identity: 0.75,
            query_strand: Strand::Forward,
            query_start: 2,
            query_end: 6,
            query_length: 8,
            database_strand,
            database_start: 100,
            database_end: 104,
            alignment: AlignedPair::new("CGAT", "| ||", "C-AT"),
        }
    }

    #[test]
    fn test_forward_hit_is_unchanged() {
        let hit = raw_hit(Strand::Forward);
        assert_eq!(hit.clone().normalized(), hit);
    }

    #[test]
    fn test_reverse_hit_is_normalized() {
        let m = Match::from_hit(raw_hit(Strand::Reverse), "{}");
        assert_eq!(m.database_strand, Strand::Forward);
        assert_eq!(m.query_strand, Strand::Reverse);
        assert_eq!(m.alignment, AlignedPair::new("ATCG", "|| |", "AT-G"));
        assert_eq!(m.match_seq, "ATG");
        assert_eq!(m.cigar.to_string(), "2H2M1D1M2H");
    }

    #[test]
    fn test_cigar_covers_query() {
        let m = Match::from_hit(raw_hit(Strand::Forward), "{}");
        assert_eq!(m.cigar.total_length(), 8);
    }

    #[test]
    fn test_build_nomatch() {
        let m = Match::no_match("query", "{}");
        assert!(!m.is_match());
        assert_eq!(m.database_strand, Strand::Unknown);
        assert!(m.alignment.is_empty());
        assert_eq!(m.reference_key(), None);
    }

    #[test]
    fn test_reference_key_strips_strain_suffix() {
        let m = Match::from_hit(raw_hit(Strand::Forward), "");
        assert_eq!(m.reference_key(), Some("16S"));

        let mut hit = raw_hit(Strand::Forward);
        hit.database = "50S".to_string();
        let m = Match::from_hit(hit, "");
        assert_eq!(m.reference_key(), Some("50S"));
    }

    #[test]
    fn test_best_match() {
        let mut low = Match::from_hit(raw_hit(Strand::Forward), "");
        low.identity = 0.5;
        let high = Match::from_hit(raw_hit(Strand::Forward), "");
        let none = Match::no_match("read1", "");

        let matches = vec![low, high.clone(), none];
        assert_eq!(Match::best(&matches), Some(&high));
        assert_eq!(Match::best(&[Match::no_match("q", "")]), None);
    }
}
