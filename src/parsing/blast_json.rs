//! Parser for `blastn -outfmt 15` (single-file JSON) output.
//!
//! Only the first HSP of every hit is used. Every hit becomes one strand-normalised
//! [`Match`]; a search without hits yields a single explicit "no match" record.

use serde::Deserialize;

use crate::core::alignment::AlignedPair;
use crate::core::hit::{Match, RawHit};
use crate::core::types::Strand;
use crate::parsing::ParseError;

#[derive(Debug, Deserialize)]
struct BlastOutput {
    #[serde(rename = "BlastOutput2")]
    outputs: Vec<BlastOutputEntry>,
}

#[derive(Debug, Deserialize)]
struct BlastOutputEntry {
    report: Report,
}

#[derive(Debug, Deserialize)]
struct Report {
    results: Results,
}

#[derive(Debug, Deserialize)]
struct Results {
    search: Search,
}

#[derive(Debug, Deserialize)]
struct Search {
    query_len: usize,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    description: Vec<Description>,
    hsps: Vec<Hsp>,
}

#[derive(Debug, Deserialize)]
struct Description {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Hsp {
    identity: u64,
    align_len: u64,
    query_from: usize,
    query_to: usize,
    #[serde(default = "plus")]
    query_strand: String,
    hit_from: usize,
    hit_to: usize,
    #[serde(default = "plus")]
    hit_strand: String,
    qseq: String,
    hseq: String,
    midline: String,
}

fn plus() -> String {
    "Plus".to_string()
}

/// Identity fraction of an HSP
#[allow(clippy::cast_precision_loss)]
fn identity_fraction(identity: u64, align_len: u64) -> f64 {
    if align_len == 0 {
        0.0
    } else {
        identity as f64 / align_len as f64
    }
}

impl Hsp {
    fn into_raw_hit(self, query: &str, database: String, query_length: usize) -> RawHit {
        RawHit {
            query: query.to_string(),
            database,
            identity: identity_fraction(self.identity, self.align_len),
            query_strand: Strand::from_blast(&self.query_strand),
            query_start: self.query_from.min(self.query_to).saturating_sub(1),
            query_end: self.query_from.max(self.query_to),
            query_length,
            database_strand: Strand::from_blast(&self.hit_strand),
            database_start: self.hit_from.min(self.hit_to).saturating_sub(1),
            database_end: self.hit_from.max(self.hit_to),
            alignment: AlignedPair::new(self.hseq, self.midline, self.qseq),
        }
    }
}

/// Parse `blastn` JSON output for the query named `query`.
///
/// # Errors
///
/// Returns `ParseError::Json` if the document is not valid `-outfmt 15` JSON, or
/// `ParseError::InvalidFormat` if a hit has no description or HSP.
pub fn parse_blastn_json(query: &str, json: &str) -> Result<Vec<Match>, ParseError> {
    let output: BlastOutput = serde_json::from_str(json)?;
    let mut matches = Vec::new();

    for entry in output.outputs {
        let search = entry.report.results.search;
        for hit in search.hits {
            let database = hit
                .description
                .first()
                .and_then(|d| d.title.split_whitespace().next())
                .ok_or_else(|| ParseError::InvalidFormat("BLAST hit without title".to_string()))?
                .to_string();
            let hsp = hit.hsps.into_iter().next().ok_or_else(|| {
                ParseError::InvalidFormat(format!("BLAST hit on {database} without HSP"))
            })?;

            let raw = hsp.into_raw_hit(query, database, search.query_len);
            matches.push(Match::from_hit(raw, json));
        }
    }

    if matches.is_empty() {
        matches.push(Match::no_match(query, json));
    }

    Ok(matches)
}
