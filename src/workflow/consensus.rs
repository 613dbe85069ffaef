//! Column consensus of a multiple sequence alignment.

use std::collections::HashMap;

/// Characters kept in a consensus sequence
const CONSENSUS_ALPHABET: &str = "ACGTN";

/// Most frequent character of a column; ties go to the character seen first.
fn column_winner(column: &[char]) -> Option<char> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for &c in column {
        *counts.entry(c).or_insert(0) += 1;
    }
    let max = counts.values().copied().max()?;
    column.iter().copied().find(|c| counts.get(c) == Some(&max))
}

/// Consensus of aligned rows.
///
/// Each column contributes its most frequent character (ties broken by first
/// occurrence in row order); the result keeps only `A`, `C`, `G`, `T` and `N`, so
/// gap-majority columns disappear. Rows are compared up to the length of the shortest.
#[must_use]
pub fn column_consensus<S: AsRef<str>>(rows: &[S]) -> String {
    let rows: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let width = rows.iter().map(Vec::len).min().unwrap_or(0);

    (0..width)
        .filter_map(|i| {
            let column: Vec<char> = rows.iter().map(|row| row[i]).collect();
            column_winner(&column)
        })
        .filter(|c| CONSENSUS_ALPHABET.contains(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority() {
        assert_eq!(column_consensus(&["ACGT", "ACGA", "TCGA"]), "ACGA");
    }

    #[test]
    fn test_tie_goes_to_first_row() {
        assert_eq!(column_consensus(&["AC", "GT"]), "AC");
        assert_eq!(column_consensus(&["GT", "AC"]), "GT");
    }

    #[test]
    fn test_gap_columns_dropped() {
        assert_eq!(column_consensus(&["A-GT", "A-GT", "ACGT"]), "AGT");
    }

    #[test]
    fn test_lowercase_is_dropped() {
        assert_eq!(column_consensus(&["AcG"]), "AG");
    }

    #[test]
    fn test_empty() {
        assert_eq!(column_consensus::<&str>(&[]), "");
        assert_eq!(column_consensus(&["ACGT", "AC"]), "AC");
    }
}
