//! Per-file (or per-sample) allele observations and their scoring against the
//! haplotype table.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::types::{PositionKey, UNRESOLVED};
use crate::haplotyping::table::HaplotypeTable;

/// Alleles observed at informative positions for one file or sample
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HaplotypingResult {
    /// File (or sample) the observations belong to
    pub filename: String,
    /// Informative position -> observed allele (upper case)
    pub informative_values: BTreeMap<PositionKey, char>,
}

impl HaplotypingResult {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            informative_values: BTreeMap::new(),
        }
    }

    /// Rename the result, e.g. after merging all files of a sample
    #[must_use]
    pub fn with_filename(self, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..self
        }
    }

    /// Combine two observation sets.
    ///
    /// The key set is the union of both. Where both sides observed a position and
    /// disagree, `other` wins. The merged result keeps the file name when both sides
    /// share it and is named `-` otherwise.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut informative_values = self.informative_values.clone();
        for (key, value) in &other.informative_values {
            informative_values.insert(key.clone(), *value);
        }

        let filename = if self.filename == other.filename {
            self.filename.clone()
        } else {
            UNRESOLVED.to_string()
        };

        Self {
            filename,
            informative_values,
        }
    }

    /// Count `(matching, mismatching)` informative positions for `label`.
    ///
    /// Every observed position counts on exactly one side; positions the table has no
    /// expected allele for count as mismatches.
    #[must_use]
    pub fn compare(&self, label: &str, table: &HaplotypeTable) -> (usize, usize) {
        let mut positive = 0;
        let mut negative = 0;
        for (key, observed) in &self.informative_values {
            let expected = table.get(key).and_then(|pos| pos.allele(label));
            if expected.is_some_and(|e| allele_matches(e, *observed)) {
                positive += 1;
            } else {
                negative += 1;
            }
        }
        (positive, negative)
    }

    /// Score every haplotype of the table and pick the best ones.
    #[must_use]
    pub fn summarize(&self, table: &HaplotypeTable) -> HaplotypingSummary {
        let counts: Vec<HaplotypeCount> = table
            .labels()
            .iter()
            .map(|label| {
                let (positive, negative) = self.compare(label, table);
                HaplotypeCount {
                    label: label.clone(),
                    positive,
                    negative,
                }
            })
            .collect();

        let best_score = counts.iter().map(HaplotypeCount::score).max().unwrap_or(0);
        let best_haplotypes = if best_score > 0 {
            counts
                .iter()
                .filter(|c| c.score() == best_score)
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join(",")
        } else {
            UNRESOLVED.to_string()
        };

        let alleles = table
            .keys()
            .map(|key| (key.clone(), self.informative_values.get(key).copied()))
            .collect();

        HaplotypingSummary {
            filename: self.filename.clone(),
            call: HaplotypeCall {
                best_haplotypes,
                best_score,
            },
            counts,
            alleles,
        }
    }
}

fn allele_matches(expected: &str, observed: char) -> bool {
    let mut chars = expected.chars();
    chars.next() == Some(observed) && chars.next().is_none()
}

/// Matching and mismatching position counts for one haplotype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplotypeCount {
    pub label: String,
    pub positive: usize,
    pub negative: usize,
}

impl HaplotypeCount {
    /// `positive - negative`
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn score(&self) -> i64 {
        self.positive as i64 - self.negative as i64
    }
}

/// The best haplotype(s) and their score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaplotypeCall {
    /// Comma-joined tied best labels in table order, or `-` when unresolved
    pub best_haplotypes: String,
    pub best_score: i64,
}

impl HaplotypeCall {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.best_haplotypes != UNRESOLVED
    }
}

/// Full haplotyping report for one file or sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplotypingSummary {
    pub filename: String,
    pub call: HaplotypeCall,
    /// Per-label counts in table order
    pub counts: Vec<HaplotypeCount>,
    /// Observed allele at every informative position of the table
    pub alleles: Vec<(PositionKey, Option<char>)>,
}

/// Serialised flat: `filename`, `best_haplotypes`, `best_score`, `{label}_pos`,
/// `{label}_neg`, then one `reference:position` entry per informative position.
impl Serialize for HaplotypingSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3 + 2 * self.counts.len() + self.alleles.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("best_haplotypes", &self.call.best_haplotypes)?;
        map.serialize_entry("best_score", &self.call.best_score)?;
        for count in &self.counts {
            map.serialize_entry(&format!("{}_pos", count.label), &count.positive)?;
            map.serialize_entry(&format!("{}_neg", count.label), &count.negative)?;
        }
        for (key, allele) in &self.alleles {
            map.serialize_entry(&key.to_string(), allele)?;
        }
        map.end()
    }
}
