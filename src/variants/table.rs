//! Variant presence tables: which haplotype of a region carries which call.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use serde::Serialize;

use crate::core::sequence::only_bases;
use crate::variants::VariantCall;

/// Allele written for a haplotype that has no row in a region
pub const MISSING_ALLELE: &str = "N";

/// One haplotype's calls within a region, keyed by reference position
#[derive(Debug, Clone)]
pub struct HaplotypeCalls {
    pub label: String,
    pub calls: BTreeMap<usize, VariantCall>,
}

impl HaplotypeCalls {
    #[must_use]
    pub fn new(label: impl Into<String>, calls: BTreeMap<usize, VariantCall>) -> Self {
        Self {
            label: label.into(),
            calls,
        }
    }

    fn find(&self, position: usize, description: &str) -> Option<&VariantCall> {
        self.calls
            .get(&position)
            .filter(|call| call.description == description)
    }
}

/// One distinct (position, description) variant of a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    pub position: usize,
    pub description: String,
    /// Reference allele (bases only)
    pub reference: String,
    /// Allele per haplotype label (bases only)
    pub alleles: BTreeMap<String, String>,
    /// Whether each haplotype carries the variant
    pub present: BTreeMap<String, bool>,
}

impl VariantRow {
    #[must_use]
    pub fn allele(&self, label: &str) -> &str {
        self.alleles.get(label).map_or(MISSING_ALLELE, String::as_str)
    }

    #[must_use]
    pub fn is_present(&self, label: &str) -> bool {
        self.present.get(label).copied().unwrap_or(false)
    }
}

/// Variant presence table for one reference region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTable {
    pub reference: String,
    pub region: String,
    /// Haplotype labels in the order they were supplied
    pub labels: Vec<String>,
    pub rows: Vec<VariantRow>,
}

impl RegionTable {
    /// Build the presence table from per-haplotype calls.
    ///
    /// Rows are sorted by position, then description. The reference allele of a row
    /// is taken from the first haplotype (in input order) that carries the call;
    /// haplotypes without the call show the reference bases of that call.
    #[must_use]
    pub fn build(
        reference: impl Into<String>,
        region: impl Into<String>,
        haplotypes: &[HaplotypeCalls],
    ) -> Self {
        let distinct: BTreeSet<(usize, &str)> = haplotypes
            .iter()
            .flat_map(|h| h.calls.values())
            .map(|call| (call.position, call.description.as_str()))
            .collect();

        let rows = distinct
            .into_iter()
            .filter_map(|(position, description)| {
                let first = haplotypes
                    .iter()
                    .find_map(|h| h.find(position, description))?;
                let reference_allele = only_bases(&first.reference);

                let mut alleles = BTreeMap::new();
                let mut present = BTreeMap::new();
                for haplotype in haplotypes {
                    let (allele, carried) = match haplotype.find(position, description) {
                        Some(call) => (only_bases(&call.alternate), true),
                        None => (reference_allele.clone(), false),
                    };
                    alleles.insert(haplotype.label.clone(), allele);
                    present.insert(haplotype.label.clone(), carried);
                }

                Some(VariantRow {
                    position,
                    description: description.to_string(),
                    reference: reference_allele,
                    alleles,
                    present,
                })
            })
            .collect();

        Self {
            reference: reference.into(),
            region: region.into(),
            labels: haplotypes.iter().map(|h| h.label.clone()).collect(),
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Union of the labels of all tables, in first-seen order
#[must_use]
pub fn all_labels(tables: &[RegionTable]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in tables.iter().flat_map(|t| t.labels.iter()) {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

fn separator(columns: usize) -> String {
    let mut line = String::from("# --------\t------\t------\t--------------");
    for _ in 0..columns {
        line.push_str("\t------");
    }
    line
}

/// Write the tab-separated variant table.
///
/// Regions are written in the order given, each followed by a separator line.
/// A haplotype absent from a region gets the `N` allele.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_variant_table<W: Write>(writer: &mut W, tables: &[RegionTable]) -> io::Result<()> {
    let labels = all_labels(tables);
    let separator = separator(labels.len());

    writeln!(writer, "{separator}")?;
    let mut header = String::from("reference\tregion\tpos\tdescription");
    for label in &labels {
        header.push('\t');
        header.push_str(label);
    }
    writeln!(writer, "{header}")?;
    writeln!(writer, "{separator}")?;

    for table in tables {
        for row in &table.rows {
            let mut line = format!(
                "{}\t{}\t{}\t{}",
                table.reference, table.region, row.position, row.description
            );
            for label in &labels {
                line.push('\t');
                line.push_str(row.allele(label));
            }
            writeln!(writer, "{line}")?;
        }
        writeln!(writer, "{separator}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tsv::parse_tsv_text;
    use crate::variants::call_variants;

    fn haplotypes() -> Vec<HaplotypeCalls> {
        let reference = "ACGTACGT";
        vec![
            HaplotypeCalls::new("hap1", call_variants(reference, "ACGTGCGT").unwrap()),
            HaplotypeCalls::new("hap2", call_variants(reference, "ACGTACGT").unwrap()),
            HaplotypeCalls::new("hap3", call_variants(reference, "ACCTGCGT").unwrap()),
        ]
    }

    #[test]
    fn test_build_rows_sorted_with_presence() {
        let table = RegionTable::build("NC_1", "16S", &haplotypes());
        assert_eq!(table.labels, vec!["hap1", "hap2", "hap3"]);
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.position, 3);
        assert_eq!(first.description, "n.3G>C");
        assert_eq!(first.reference, "G");
        assert_eq!(first.allele("hap1"), "G");
        assert_eq!(first.allele("hap3"), "C");
        assert!(!first.is_present("hap1"));
        assert!(first.is_present("hap3"));

        let second = &table.rows[1];
        assert_eq!(second.description, "n.5A>G");
        assert_eq!(second.allele("hap1"), "G");
        assert_eq!(second.allele("hap2"), "A");
        assert_eq!(second.allele("hap3"), "G");
        assert!(second.is_present("hap1") && !second.is_present("hap2"));
    }

    #[test]
    fn test_indel_alleles_drop_gaps() {
        let haps = vec![
            HaplotypeCalls::new("a", call_variants("ACGTA-CG", "ACGTATCG").unwrap()),
            HaplotypeCalls::new("b", BTreeMap::new()),
        ];
        let table = RegionTable::build("NC_1", "23S", &haps);
        let row = &table.rows[0];
        assert_eq!(row.description, "n.5delT");
        assert_eq!(row.reference, "A");
        assert_eq!(row.allele("a"), "AT");
        assert_eq!(row.allele("b"), "A");
    }

    #[test]
    fn test_same_position_rows_sorted_by_description() {
        let reference = "ACGTACGT";
        let haps = vec![
            HaplotypeCalls::new("x", call_variants(reference, "ACGTGCGT").unwrap()),
            HaplotypeCalls::new("y", call_variants(reference, "ACGTCCGT").unwrap()),
        ];
        let table = RegionTable::build("NC_1", "16S", &haps);

        let keys: Vec<(usize, &str)> = table
            .rows
            .iter()
            .map(|row| (row.position, row.description.as_str()))
            .collect();
        assert_eq!(keys, vec![(5, "n.5A>C"), (5, "n.5A>G")]);

        assert_eq!(table.rows[0].allele("x"), "A");
        assert_eq!(table.rows[0].allele("y"), "C");
        assert!(table.rows[0].is_present("y") && !table.rows[0].is_present("x"));
        assert_eq!(table.rows[1].allele("x"), "G");
        assert_eq!(table.rows[1].allele("y"), "A");
    }

    #[test]
    fn test_empty_region() {
        let table = RegionTable::build("NC_1", "5S", &[]);
        assert!(table.is_empty());
        assert!(table.labels.is_empty());
    }

    #[test]
    fn test_write_variant_table() {
        let first = RegionTable::build("NC_1", "16S", &haplotypes());
        let second = RegionTable::build(
            "NC_1",
            "23S",
            &[HaplotypeCalls::new("hap4", call_variants("AC", "AT").unwrap())],
        );

        let mut out = Vec::new();
        write_variant_table(&mut out, &[first, second]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let separator = "# --------\t------\t------\t--------------\t------\t------\t------\t------";
        assert_eq!(lines[0], separator);
        assert_eq!(lines[1], "reference\tregion\tpos\tdescription\thap1\thap2\thap3\thap4");
        assert_eq!(lines[2], separator);
        assert_eq!(lines[3], "NC_1\t16S\t3\tn.3G>C\tG\tG\tC\tN");
        assert_eq!(lines[4], "NC_1\t16S\t5\tn.5A>G\tG\tA\tG\tN");
        assert_eq!(lines[5], separator);
        assert_eq!(lines[6], "NC_1\t23S\t2\tn.2C>T\tN\tN\tN\tT");
        assert_eq!(lines[7], separator);
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_written_table_reads_back() {
        let table = RegionTable::build("NC_1", "16S", &haplotypes());
        let mut out = Vec::new();
        write_variant_table(&mut out, &[table]).unwrap();

        let parsed = parse_tsv_text(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(
            parsed.header,
            vec!["reference", "region", "pos", "description", "hap1", "hap2", "hap3"]
        );
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].1[3], "n.3G>C");
    }
}
