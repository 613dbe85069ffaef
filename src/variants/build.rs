//! Build the variant table from region references and haplotype consensus sequences.

use std::path::Path;

use tracing::{info, warn};

use crate::core::sequence::strip_n;
use crate::external::MultipleAligner;
use crate::parsing::fasta::{parse_fasta_text, read_fasta_file, write_fasta, SequenceSet};
use crate::variants::{call_variants, HaplotypeCalls, RegionTable, VariantError};
use crate::workflow::checkpoint::Checkpoint;
use crate::workflow::SkippedItem;

/// Reference sequence of one region, from a record named `<reference>_<region>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReference {
    pub reference: String,
    pub region: String,
    /// Reference bases with `N` removed
    pub sequence: String,
}

/// Split reference records into regions; records without `_` in their name are ignored.
#[must_use]
pub fn region_references(references: &SequenceSet) -> Vec<RegionReference> {
    references
        .iter()
        .filter_map(|(name, sequence)| match name.split_once('_') {
            Some((reference, region)) => Some(RegionReference {
                reference: reference.to_string(),
                region: region.to_string(),
                sequence: strip_n(sequence),
            }),
            None => {
                warn!("Ignoring reference {} without region suffix", name);
                None
            }
        })
        .collect()
}

/// Haplotype label of an aligned consensus record `<region>_<haplotype>`
fn haplotype_label(name: &str) -> &str {
    name.split_once('_').map_or(name, |(_, label)| label)
}

/// Variant tables of all regions that could be built, plus the skipped ones
#[derive(Debug, Clone)]
pub struct VariantTableReport {
    pub tables: Vec<RegionTable>,
    pub skipped: Vec<SkippedItem>,
}

/// Align the region reference with its consensus sequences and call variants.
///
/// The alignment is stored at `msa_path` behind a checkpoint and reused while the
/// inputs are unchanged. Returns `None` if there are no consensus sequences.
///
/// # Errors
///
/// Returns an error if the aligner fails, the alignment lacks the reference row or
/// a variant cannot be called.
pub fn build_region_table<M: MultipleAligner + ?Sized>(
    aligner: &M,
    region: &RegionReference,
    consensus: &SequenceSet,
    msa_path: &Path,
) -> Result<Option<RegionTable>, VariantError> {
    let mut input = SequenceSet::new();
    input.insert(region.region.clone(), region.sequence.clone());
    for (name, sequence) in consensus.iter() {
        input.insert(name, sequence);
    }
    if input.len() == 1 {
        warn!("Only reference and no consensus for {}", region.region);
        return Ok(None);
    }

    let mut input_fasta = Vec::new();
    write_fasta(&mut input_fasta, &input)?;
    let checkpoint = Checkpoint::new(msa_path, &input_fasta);

    let msa = if let Some(existing) = checkpoint.load() {
        info!("Reusing alignment {}", msa_path.display());
        parse_fasta_text(&String::from_utf8_lossy(&existing))?
    } else {
        info!("Aligning {} sequences for {}", input.len(), region.region);
        let msa = aligner.align(&input)?;
        let mut output = Vec::new();
        write_fasta(&mut output, &msa)?;
        checkpoint.commit(&output)?;
        msa
    };

    let reference_row = msa
        .get(&region.region)
        .ok_or_else(|| VariantError::MissingReference(region.region.clone()))?;

    let mut rows: Vec<(&str, &str)> = msa
        .iter()
        .filter(|(name, _)| *name != region.region)
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let haplotypes = rows
        .into_iter()
        .map(|(name, row)| {
            call_variants(reference_row, row)
                .map(|calls| HaplotypeCalls::new(haplotype_label(name), calls))
        })
        .collect::<Result<Vec<_>, VariantError>>()?;

    Ok(Some(RegionTable::build(
        region.reference.clone(),
        region.region.clone(),
        &haplotypes,
    )))
}

/// Build variant tables for every region (or only `regions`, if given).
///
/// Consensus sequences of a region are read from `<consensus_dir>/<region>.fasta` and
/// the alignment is kept at `<consensus_dir>/<region>.clustalw.fasta`. Regions that
/// cannot be built are reported as skipped.
///
/// # Errors
///
/// Returns `VariantError::MissingReference` if a requested region has no reference.
pub fn build_variant_tables<M: MultipleAligner + ?Sized>(
    aligner: &M,
    references: &SequenceSet,
    consensus_dir: &Path,
    regions: &[String],
) -> Result<VariantTableReport, VariantError> {
    let mut selected = region_references(references);
    if !regions.is_empty() {
        if let Some(missing) = regions.iter().find(|r| !selected.iter().any(|s| &s.region == *r)) {
            return Err(VariantError::MissingReference(missing.clone()));
        }
        selected.retain(|s| regions.contains(&s.region));
    }

    let mut tables = Vec::new();
    let mut skipped = Vec::new();
    let mut skip = |region: &str, reason: String| {
        warn!("Skipping region {}: {}", region, reason);
        skipped.push(SkippedItem {
            item: region.to_string(),
            reason,
        });
    };

    for region in &selected {
        let fasta_path = consensus_dir.join(format!("{}.fasta", region.region));
        if !fasta_path.exists() {
            skip(
                &region.region,
                format!("consensus sequences not found: {}", fasta_path.display()),
            );
            continue;
        }

        let consensus = match read_fasta_file(&fasta_path) {
            Ok(consensus) => consensus,
            Err(e) => {
                skip(&region.region, e.to_string());
                continue;
            }
        };

        let msa_path = consensus_dir.join(format!("{}.clustalw.fasta", region.region));
        match build_region_table(aligner, region, &consensus, &msa_path) {
            Ok(Some(table)) => tables.push(table),
            Ok(None) => skip(&region.region, "no consensus sequences".to_string()),
            Err(e) => skip(&region.region, e.to_string()),
        }
    }

    Ok(VariantTableReport { tables, skipped })
}
