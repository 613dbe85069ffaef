//! Variant calling from a pair of multiple-sequence-alignment rows.
//!
//! The reference row and one haplotype row are scanned column by column. Runs of
//! differing columns become one variant; indels are anchored on an adjacent base
//! (left if possible, otherwise right) and described HGVS-style using alignment
//! coordinates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::sequence::GAP;
use crate::variants::VariantError;

/// Shape of a variant call, decided once when the call is sealed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Single differing column
    Substitution,
    /// Haplotype bases aligned to gaps in the reference row
    ReferenceGap { inserted: String },
    /// Reference bases aligned to gaps in the haplotype row
    AlternateGap { removed: String },
    /// Several differing columns without gaps
    Complex,
}

/// Side the anchor base of an indel was borrowed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    None,
    Left,
    Right,
}

/// A sealed variant call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantCall {
    /// 1-based position on the ungapped reference
    pub position: usize,
    /// 1-based alignment column
    pub ali_position: usize,
    /// Reference allele including the anchor base, gap-padded
    pub reference: String,
    /// Alternate allele including the anchor base, gap-padded
    pub alternate: String,
    pub kind: VariantKind,
    pub anchor: Anchor,
    /// HGVS-like description, e.g. `n.5A>G`
    pub description: String,
}

impl VariantCall {
    fn describe(
        kind: &VariantKind,
        ali_position: usize,
        reference: &str,
        alternate: &str,
    ) -> String {
        match kind {
            VariantKind::Substitution => format!("n.{ali_position}{reference}>{alternate}"),
            VariantKind::ReferenceGap { inserted } => {
                let len = reference.chars().count();
                if len == 2 {
                    format!("n.{ali_position}del{inserted}")
                } else {
                    format!("n.{}_{}del{inserted}", ali_position, ali_position + len - 2)
                }
            }
            VariantKind::AlternateGap { removed } => {
                format!("n.{}_{}ins{removed}", ali_position, ali_position + 1)
            }
            VariantKind::Complex => format!(
                "n.{}_{}del{reference}ins{alternate}",
                ali_position.saturating_sub(1),
                ali_position
            ),
        }
    }
}

/// A run of differing columns that has not been sealed yet
struct OpenVariant {
    /// 1-based reference position of the first column
    position: usize,
    /// 0-based index of the first column
    start: usize,
    reference: String,
    alternate: String,
}

impl OpenVariant {
    fn len(&self) -> usize {
        self.reference.chars().count()
    }

    /// Anchor (when needed), classify and describe the run.
    ///
    /// Runs opening with a gap borrow an adjacent base. Runs opening with a base on
    /// both rows use their own first column as the anchor, so their indel payload
    /// drops that column.
    fn seal(self, ref_row: &[char], alt_row: &[char]) -> Result<VariantCall, VariantError> {
        let is_reference_gapped = self.reference.contains(GAP);
        let is_alternate_gapped = self.alternate.contains(GAP);
        let opens_with_gap = self.reference.starts_with(GAP) || self.alternate.starts_with(GAP);

        let unsupported = || VariantError::UnsupportedVariantShape {
            position: self.position,
            reference: self.reference.clone(),
            alternate: self.alternate.clone(),
        };

        if is_reference_gapped && is_alternate_gapped {
            return Err(unsupported());
        }

        let payload = |allele: &str| {
            if opens_with_gap {
                allele.to_string()
            } else {
                allele.chars().skip(1).collect()
            }
        };
        let kind = if is_reference_gapped {
            VariantKind::ReferenceGap {
                inserted: payload(&self.alternate),
            }
        } else if is_alternate_gapped {
            VariantKind::AlternateGap {
                removed: payload(&self.reference),
            }
        } else if self.len() == 1 {
            VariantKind::Substitution
        } else {
            VariantKind::Complex
        };

        // An anchor column must carry a base on both rows
        let usable = |i: usize| ref_row[i] != GAP && alt_row[i] != GAP;

        let (position, ali_position, reference, alternate, anchor) = if !opens_with_gap {
            (
                self.position,
                self.start + 1,
                self.reference.clone(),
                self.alternate.clone(),
                Anchor::None,
            )
        } else if self.start > 0 && usable(self.start - 1) {
            let left = self.start - 1;
            (
                self.position - 1,
                self.start,
                format!("{}{}", ref_row[left], self.reference),
                format!("{}{}", alt_row[left], self.alternate),
                Anchor::Left,
            )
        } else {
            let right = self.start + self.len();
            if right >= ref_row.len() || !usable(right) {
                return Err(unsupported());
            }
            (
                self.position,
                self.start + 1,
                format!("{}{}", self.reference, ref_row[right]),
                format!("{}{}", self.alternate, alt_row[right]),
                Anchor::Right,
            )
        };

        let description = VariantCall::describe(&kind, ali_position, &reference, &alternate);
        Ok(VariantCall {
            position,
            ali_position,
            reference,
            alternate,
            kind,
            anchor,
            description,
        })
    }
}

/// Call variants of `alt` (a haplotype row) against `reference` (the reference row).
///
/// Both rows come from the same multiple sequence alignment. Calls are keyed by their
/// 1-based reference position.
///
/// # Errors
///
/// Returns `VariantError::LengthMismatch` if the rows differ in length and
/// `VariantError::UnsupportedVariantShape` for runs with gaps on both rows and
/// indels that cannot be anchored.
pub fn call_variants(
    reference: &str,
    alt: &str,
) -> Result<BTreeMap<usize, VariantCall>, VariantError> {
    let ref_row: Vec<char> = reference.chars().collect();
    let alt_row: Vec<char> = alt.chars().collect();
    if ref_row.len() != alt_row.len() {
        return Err(VariantError::LengthMismatch {
            reference: ref_row.len(),
            alternate: alt_row.len(),
        });
    }

    let mut result = BTreeMap::new();
    let mut ref_pos = 0;
    let mut current: Option<OpenVariant> = None;

    for (i, (&r, &a)) in ref_row.iter().zip(alt_row.iter()).enumerate() {
        if r == a {
            if let Some(open) = current.take() {
                let call = open.seal(&ref_row, &alt_row)?;
                result.insert(call.position, call);
            }
        } else {
            let open = current.get_or_insert_with(|| OpenVariant {
                position: ref_pos + 1,
                start: i,
                reference: String::new(),
                alternate: String::new(),
            });
            open.reference.push(r);
            open.alternate.push(a);
        }

        if r != GAP {
            ref_pos += 1;
        }
    }

    if let Some(open) = current {
        let call = open.seal(&ref_row, &alt_row)?;
        result.insert(call.position, call);
    }

    Ok(result)
}
