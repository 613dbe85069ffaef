//! The informative-position table.
//!
//! Loaded once from a tab-separated file with the columns `reference`, `position`
//! (1-based on disk) and one column per haplotype label, then shared read-only by
//! every component that needs it.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::core::types::PositionKey;
use crate::parsing::tsv::{parse_tsv_file, parse_tsv_text, TsvTable};
use crate::parsing::ParseError;

/// Expected alleles of every haplotype at one informative position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformativePosition {
    pub key: PositionKey,
    /// Haplotype label -> expected allele
    pub alleles: BTreeMap<String, String>,
}

impl InformativePosition {
    /// Expected allele of `label`, if the table has a value for it
    #[must_use]
    pub fn allele(&self, label: &str) -> Option<&str> {
        self.alleles.get(label).map(String::as_str)
    }
}

/// Immutable table of informative positions and the haplotype labels it knows about
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HaplotypeTable {
    labels: Vec<String>,
    positions: BTreeMap<PositionKey, InformativePosition>,
}

impl HaplotypeTable {
    /// Load the table from a TSV file
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read or
    /// `ParseError::InvalidFormat` if the content is not a valid table.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let table = Self::from_tsv(&parse_tsv_file(path)?)?;
        debug!(
            path = %path.display(),
            positions = table.len(),
            labels = ?table.labels,
            "Loaded haplotype table"
        );
        Ok(table)
    }

    /// Parse the table from TSV text
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if the text is not a valid table.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        Self::from_tsv(&parse_tsv_text(text)?)
    }

    fn from_tsv(tsv: &TsvTable) -> Result<Self, ParseError> {
        let reference_col = tsv
            .column("reference")
            .ok_or_else(|| ParseError::InvalidFormat("Missing 'reference' column".to_string()))?;
        let position_col = tsv
            .column("position")
            .ok_or_else(|| ParseError::InvalidFormat("Missing 'position' column".to_string()))?;

        // Every other column is a haplotype label, kept in header order
        let label_cols: Vec<(usize, &String)> = tsv
            .header
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != reference_col && *i != position_col)
            .collect();

        let mut positions = BTreeMap::new();
        for (line_num, fields) in &tsv.records {
            let field = |i: usize| fields.get(i).map(|s| s.trim()).unwrap_or_default();

            let reference = field(reference_col);
            if reference.is_empty() {
                return Err(ParseError::InvalidFormat(format!(
                    "Missing reference on line {line_num}"
                )));
            }
            let position: usize = match field(position_col).parse() {
                Ok(p) if p > 0 => p,
                _ => {
                    return Err(ParseError::InvalidFormat(format!(
                        "Invalid 1-based position on line {}: '{}'",
                        line_num,
                        field(position_col)
                    )))
                }
            };

            let key = PositionKey::new(reference, position - 1);
            let alleles = label_cols
                .iter()
                .filter_map(|(i, label)| {
                    let value = field(*i);
                    (!value.is_empty()).then(|| ((*label).clone(), value.to_string()))
                })
                .collect();

            positions.insert(key.clone(), InformativePosition { key, alleles });
        }

        Ok(Self {
            labels: label_cols.into_iter().map(|(_, l)| l.clone()).collect(),
            positions,
        })
    }

    /// Haplotype labels in table (header) order
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn get(&self, key: &PositionKey) -> Option<&InformativePosition> {
        self.positions.get(key)
    }

    #[must_use]
    pub fn contains(&self, reference: &str, position: usize) -> bool {
        // BTreeMap lookups need an owned key
        self.positions
            .contains_key(&PositionKey::new(reference, position))
    }

    /// All informative positions, ordered by reference and position
    pub fn keys(&self) -> impl Iterator<Item = &PositionKey> {
        self.positions.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
