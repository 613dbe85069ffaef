//! Allele extraction from strand-normalised matches.

use std::collections::BTreeMap;

use crate::core::hit::Match;
use crate::core::sequence::{is_nucleotide, GAP};
use crate::core::types::PositionKey;
use crate::haplotyping::result::HaplotypingResult;
use crate::haplotyping::table::HaplotypeTable;
use crate::haplotyping::HaplotypingError;

/// Record the query allele at every informative position covered by `m`.
///
/// A cursor starts at the match's database start and advances on every non-gap
/// character of the hit row; gap columns neither advance it nor record an allele.
/// "No match" records yield an empty result.
///
/// # Errors
///
/// Returns `HaplotypingError::MalformedAlignment` if the hit row contains a character
/// that is neither a nucleotide nor the gap symbol.
pub fn extract_alleles(
    m: &Match,
    table: &HaplotypeTable,
) -> Result<HaplotypingResult, HaplotypingError> {
    let mut result = HaplotypingResult::new(m.query.clone());
    let Some(reference) = m.reference_key() else {
        return Ok(result);
    };

    let mut pos = m.database_start;
    for (column, (hit, query)) in m.alignment.columns().enumerate() {
        if is_nucleotide(hit) {
            if table.contains(reference, pos) {
                result
                    .informative_values
                    .insert(PositionKey::new(reference, pos), query.to_ascii_uppercase());
            }
            pos += 1;
        } else if hit != GAP {
            return Err(HaplotypingError::MalformedAlignment {
                query: m.query.clone(),
                column,
                character: hit,
            });
        }
    }

    Ok(result)
}

/// Haplotype all matches, merging the observations of matches that share a query.
///
/// Matches are folded in input order, so on conflicting observations the later match
/// wins. Queries with only "no match" records get an empty result.
///
/// # Errors
///
/// Returns the first `HaplotypingError` raised by [`extract_alleles`].
pub fn haplotype_matches(
    matches: &[Match],
    table: &HaplotypeTable,
) -> Result<BTreeMap<String, HaplotypingResult>, HaplotypingError> {
    let mut results: BTreeMap<String, HaplotypingResult> = BTreeMap::new();

    for m in matches {
        let result = extract_alleles(m, table)?;
        let merged = match results.get(&m.query) {
            Some(existing) => existing.merge(&result),
            None => result,
        };
        results.insert(m.query.clone(), merged);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::AlignedPair;
    use crate::core::hit::RawHit;
    use crate::core::types::Strand;

    fn table() -> HaplotypeTable {
        HaplotypeTable::from_text(
            "reference\tposition\tA\tB\n\
             16S\t11\tC\tC\n\
             16S\t12\tG\tA\n\
             16S\t13\tT\tT\n\
             16S\t14\tA\tC\n",
        )
        .unwrap()
    }

    fn make_match(database: &str, start: usize, hseq: &str, qseq: &str) -> Match {
        let len = hseq.len();
        Match::from_hit(
            RawHit {
                query: "read1.fasta".to_string(),
                database: database.to_string(),
                identity: 1.0,
                query_strand: Strand::Forward,
                query_start: 0,
                query_end: len,
                query_length: len,
                database_strand: Strand::Forward,
                database_start: start,
                database_end: start + len,
                alignment: AlignedPair::new(hseq, "", qseq),
            },
            "",
        )
    }

    #[test]
    fn test_cursor_does_not_advance_on_hit_gap() {
        // Cursor values per column: 10, 11, 11 (gap), 12
        let m = make_match("16S_LsoA", 10, "CG-T", "CA-T");
        let result = extract_alleles(&m, &table()).unwrap();

        let positions: Vec<usize> = result
            .informative_values
            .keys()
            .map(|k| k.position)
            .collect();
        assert_eq!(positions, vec![10, 11, 12]);
        assert_eq!(result.informative_values[&PositionKey::new("16S", 10)], 'C');
        assert_eq!(result.informative_values[&PositionKey::new("16S", 11)], 'A');
        assert_eq!(result.informative_values[&PositionKey::new("16S", 12)], 'T');
    }

    #[test]
    fn test_insertion_in_query_is_skipped() {
        // The query base aligned to the hit gap is not recorded anywhere
        let m = make_match("16S", 10, "C-GT", "CAGT");
        let result = extract_alleles(&m, &table()).unwrap();
        assert_eq!(result.informative_values[&PositionKey::new("16S", 11)], 'G');
        assert_eq!(result.informative_values[&PositionKey::new("16S", 12)], 'T');
    }

    #[test]
    fn test_alleles_are_upper_cased() {
        let m = make_match("16S", 10, "cgta", "cgta");
        let result = extract_alleles(&m, &table()).unwrap();
        assert_eq!(
            result.informative_values.values().collect::<String>(),
            "CGTA"
        );
    }

    #[test]
    fn test_query_deletion_is_recorded_as_gap() {
        let m = make_match("16S", 10, "CGTA", "C-TA");
        let result = extract_alleles(&m, &table()).unwrap();
        assert_eq!(result.informative_values[&PositionKey::new("16S", 11)], '-');
    }

    #[test]
    fn test_unknown_reference_records_nothing() {
        let m = make_match("23S", 10, "CGTA", "CGTA");
        let result = extract_alleles(&m, &table()).unwrap();
        assert!(result.informative_values.is_empty());
    }

    #[test]
    fn test_malformed_hit_character() {
        let m = make_match("16S", 10, "CXTA", "CGTA");
        let err = extract_alleles(&m, &table()).unwrap_err();
        assert!(matches!(
            err,
            HaplotypingError::MalformedAlignment {
                column: 1,
                character: 'X',
                ..
            }
        ));
    }

    #[test]
    fn test_nomatch_summary_is_unresolved() {
        let m = Match::no_match("read1.fasta", "{}");
        assert!(!m.is_match());

        let table = table();
        let results = haplotype_matches(&[m], &table).unwrap();
        let summary = results["read1.fasta"].summarize(&table);
        assert_eq!(summary.call.best_haplotypes, "-");
        assert_eq!(summary.call.best_score, 0);
    }

    #[test]
    fn test_matches_of_same_query_are_merged() {
        let table = table();
        let first = make_match("16S", 10, "CG", "CG");
        let second = make_match("16S", 12, "TA", "TA");
        let results = haplotype_matches(&[first, second], &table).unwrap();

        assert_eq!(results.len(), 1);
        let merged = &results["read1.fasta"];
        assert_eq!(merged.filename, "read1.fasta");
        assert_eq!(merged.informative_values.len(), 4);

        let summary = merged.summarize(&table);
        assert_eq!(summary.call.best_haplotypes, "A");
        assert_eq!(summary.call.best_score, 4);
    }
}
