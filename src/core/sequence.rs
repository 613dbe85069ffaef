//! Nucleotide sequence helpers shared by the alignment and variant code.

/// Gap symbol used in pairwise and multiple alignments.
pub const GAP: char = '-';

/// Complement of a single nucleotide, preserving case.
///
/// Characters other than `ACGTacgt` (including `N` and the gap symbol) are returned unchanged.
#[must_use]
pub fn complement(c: char) -> char {
    match c {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

/// Reverse-complement a sequence.
///
/// ```
/// use clsify::core::sequence::revcomp;
///
/// assert_eq!(revcomp("CGAT"), "ATCG");
/// assert_eq!(revcomp("C-GAT"), "ATC-G");
/// ```
#[must_use]
pub fn revcomp(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

/// Whether `c` is a nucleotide character (`ACGTN`, either case).
#[must_use]
pub fn is_nucleotide(c: char) -> bool {
    matches!(c, 'A' | 'C' | 'G' | 'T' | 'N' | 'a' | 'c' | 'g' | 't' | 'n')
}

/// Keep only nucleotide characters, dropping gaps and anything else.
#[must_use]
pub fn only_bases(seq: &str) -> String {
    seq.chars().filter(|c| is_nucleotide(*c)).collect()
}

/// Drop `N`/`n` characters.
#[must_use]
pub fn strip_n(seq: &str) -> String {
    seq.chars().filter(|c| !matches!(c, 'N' | 'n')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revcomp() {
        assert_eq!(revcomp("CGAT"), "ATCG");
        assert_eq!(revcomp("C-GAT"), "ATC-G");
        assert_eq!(revcomp("acgtN"), "Nacgt");
        assert_eq!(revcomp(""), "");
    }

    #[test]
    fn test_revcomp_twice_is_identity() {
        for seq in ["ACGTNacgtn-", "--A", "N", "GATTACA", "g-a-t-t-a-c-a"] {
            assert_eq!(revcomp(&revcomp(seq)), seq);
        }
    }

    #[test]
    fn test_only_bases() {
        assert_eq!(only_bases("AC-G-tn"), "ACGtn");
        assert_eq!(only_bases("---"), "");
    }

    #[test]
    fn test_strip_n() {
        assert_eq!(strip_n("NNACGTnn"), "ACGT");
    }

    #[test]
    fn test_is_nucleotide() {
        assert!(is_nucleotide('A'));
        assert!(is_nucleotide('n'));
        assert!(!is_nucleotide('-'));
        assert!(!is_nucleotide('X'));
    }
}
