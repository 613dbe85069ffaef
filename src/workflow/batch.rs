//! Batch classification of query files.
//!
//! Every file is aligned against the reference database, all of its matches are
//! haplotyped and merged, and files are grouped into samples by file name. Files are
//! independent, so they are spread over scoped worker threads; results are re-joined
//! and ordered by file name afterwards. A file that fails is reported as skipped and
//! does not stop the batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::hit::Match;
use crate::external::blast::{query_name, PairwiseAligner};
use crate::haplotyping::{
    haplotype_matches, HaplotypeTable, HaplotypingResult, HaplotypingSummary,
};
use crate::workflow::config::ClassifyConfig;
use crate::workflow::WorkflowError;

/// Classification of one query file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub query: String,
    pub path: PathBuf,
    /// Highest-identity match, or a no-match record if none reaches the minimal identity
    pub best_match: Match,
    pub matches: Vec<Match>,
    pub haplotyping: HaplotypingSummary,
    /// Merged observations of all matches, used to build sample results
    #[serde(skip)]
    pub observations: HaplotypingResult,
}

/// An input that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub item: String,
    pub reason: String,
}

/// Everything a batch run produced
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-file results, ordered by query name
    pub files: Vec<FileResult>,
    /// Per-sample results, ordered by sample id
    pub samples: Vec<HaplotypingSummary>,
    pub skipped: Vec<SkippedItem>,
}

/// Sample id of a query: its first `fields` underscore-separated fields.
///
/// The name must have at least one further field (e.g. the primer) after the sample
/// fields; otherwise the query is not part of a sample.
#[must_use]
pub fn sample_id(query: &str, fields: usize) -> Option<String> {
    if fields == 0 {
        return None;
    }
    let parts: Vec<&str> = query.splitn(fields + 1, '_').collect();
    if parts.len() <= fields || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts[..fields].join("_"))
}

/// Align and haplotype a single query file.
///
/// # Errors
///
/// Returns an error if the aligner fails or a match has a malformed alignment.
pub fn classify_file<A: PairwiseAligner + ?Sized>(
    aligner: &A,
    database: &Path,
    path: &Path,
    table: &HaplotypeTable,
    config: &ClassifyConfig,
) -> Result<FileResult, WorkflowError> {
    let query = query_name(path);
    info!("Classifying {}", path.display());

    let matches = aligner.align(database, path)?;
    debug!("{} matches for {}", matches.len(), query);

    let best_match = Match::best(&matches)
        .filter(|m| m.identity >= config.min_identity)
        .cloned()
        .unwrap_or_else(|| Match::no_match(query.clone(), ""));

    // All matches contribute observations, whatever their identity
    let observations = haplotype_matches(&matches, table)?
        .into_values()
        .fold(HaplotypingResult::new(query.clone()), |acc, result| {
            acc.merge(&result.with_filename(query.clone()))
        });
    let haplotyping = observations.summarize(table);

    Ok(FileResult {
        query,
        path: path.to_path_buf(),
        best_match,
        matches,
        haplotyping,
        observations,
    })
}

/// Merge file results into per-sample summaries.
///
/// `files` must be ordered by query name; observations are merged in that order.
#[must_use]
pub fn summarize_samples(
    files: &[FileResult],
    table: &HaplotypeTable,
    sample_fields: usize,
) -> Vec<HaplotypingSummary> {
    let mut grouped: BTreeMap<String, HaplotypingResult> = BTreeMap::new();
    for file in files {
        let Some(sample) = sample_id(&file.query, sample_fields) else {
            debug!("{} is not part of a sample", file.query);
            continue;
        };
        let observations = file.observations.clone().with_filename(sample.clone());
        let merged = match grouped.get(&sample) {
            Some(existing) => existing.merge(&observations),
            None => observations,
        };
        grouped.insert(sample, merged);
    }

    grouped.values().map(|result| result.summarize(table)).collect()
}

/// Classify all `paths` on `config.threads` worker threads.
///
/// Failed files are logged and reported in [`BatchReport::skipped`], as are files
/// whose worker thread panicked.
pub fn classify_batch<A: PairwiseAligner + Sync + ?Sized>(
    aligner: &A,
    database: &Path,
    paths: &[PathBuf],
    table: &HaplotypeTable,
    config: &ClassifyConfig,
) -> BatchReport {
    let threads = config.threads.clamp(1, paths.len().max(1));
    info!("Classifying {} files on {} threads", paths.len(), threads);

    let next = AtomicUsize::new(0);
    let outcomes: Mutex<Vec<(usize, Result<FileResult, WorkflowError>)>> =
        Mutex::new(Vec::with_capacity(paths.len()));

    thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = paths.get(index) else {
                        break;
                    };
                    let outcome = classify_file(aligner, database, path, table, config);
                    outcomes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, outcome));
                })
            })
            .collect();

        for worker in workers {
            if worker.join().is_err() {
                error!("A classification worker panicked");
            }
        }
    });

    let outcomes = outcomes.into_inner().unwrap_or_else(PoisonError::into_inner);
    let mut seen = vec![false; paths.len()];
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for (index, outcome) in outcomes {
        seen[index] = true;
        match outcome {
            Ok(result) => files.push(result),
            Err(e) => {
                let item = paths[index].display().to_string();
                warn!("Skipping {}: {}", item, e);
                skipped.push(SkippedItem {
                    item,
                    reason: e.to_string(),
                });
            }
        }
    }

    // Files claimed by a panicked worker, or left unclaimed after all workers died
    for (path, _) in paths.iter().zip(&seen).filter(|(_, done)| !**done) {
        let item = path.display().to_string();
        warn!("Skipping {}: no result from its worker", item);
        skipped.push(SkippedItem {
            item,
            reason: "classification worker panicked".to_string(),
        });
    }

    files.sort_by(|a, b| a.query.cmp(&b.query).then_with(|| a.path.cmp(&b.path)));
    skipped.sort_by(|a, b| a.item.cmp(&b.item));
    let samples = summarize_samples(&files, table, config.sample_fields);

    BatchReport {
        files,
        samples,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::AlignedPair;
    use crate::core::hit::RawHit;
    use crate::core::types::Strand;
    use crate::external::ExternalToolError;
    use crate::haplotyping::table::tests::table;

    /// Aligns every query to 16S at position 10. `Tm3` files carry haplotype A's
    /// alleles, others haplotype B's; files named `fail*` make the aligner fail and
    /// files named `panic*` make it panic.
    struct FakeAligner;

    impl PairwiseAligner for FakeAligner {
        fn align(
            &self,
            _database: &Path,
            query: &Path,
        ) -> Result<Vec<Match>, ExternalToolError> {
            let name = query_name(query);
            if name.starts_with("panic") {
                panic!("aligner crashed on {name}");
            }
            if name.starts_with("fail") {
                return Err(ExternalToolError::Timeout {
                    program: "fake".to_string(),
                    seconds: 1,
                });
            }
            let qseq = if name.contains("Tm3") { "CATA" } else { "TGTA" };
            let identity = if name.contains("low") { 0.2 } else { 0.99 };
            Ok(vec![Match::from_hit(
                RawHit {
                    query: name,
                    database: "16S_ZC1".to_string(),
                    identity,
                    query_strand: Strand::Forward,
                    query_start: 0,
                    query_end: 4,
                    query_length: 4,
                    database_strand: Strand::Forward,
                    database_start: 10,
                    database_end: 14,
                    alignment: AlignedPair::new("CGTA", "", qseq),
                },
                "",
            )])
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/reads/{n}.fasta"))).collect()
    }

    #[test]
    fn test_sample_id() {
        assert_eq!(sample_id("CA_SJV_Tm3_16S_LsoF", 3).as_deref(), Some("CA_SJV_Tm3"));
        assert_eq!(sample_id("CA_SJV_Tm3", 3), None);
        assert_eq!(sample_id("CA__Tm3_16S", 3), None);
        assert_eq!(sample_id("read_1", 1).as_deref(), Some("read"));
        assert_eq!(sample_id("read_1", 0), None);
    }

    #[test]
    fn test_classify_file() {
        let table = table();
        let result = classify_file(
            &FakeAligner,
            Path::new("refs.fasta"),
            Path::new("/reads/CA_SJV_Tm3_16S_LsoF.fasta"),
            &table,
            &ClassifyConfig::default(),
        )
        .unwrap();
        assert_eq!(result.query, "CA_SJV_Tm3_16S_LsoF");
        assert!(result.best_match.is_match());
        assert_eq!(result.haplotyping.filename, "CA_SJV_Tm3_16S_LsoF");
        assert_eq!(result.haplotyping.call.best_haplotypes, "A");
        assert_eq!(result.haplotyping.call.best_score, 3);
    }

    #[test]
    fn test_low_identity_still_haplotyped() {
        let table = table();
        let result = classify_file(
            &FakeAligner,
            Path::new("refs.fasta"),
            Path::new("/reads/low_Tm3.fasta"),
            &table,
            &ClassifyConfig::default(),
        )
        .unwrap();
        assert!(!result.best_match.is_match());
        assert_eq!(result.haplotyping.call.best_haplotypes, "A");
    }

    #[test]
    fn test_batch_isolates_failures_and_groups_samples() {
        let table = table();
        let config = ClassifyConfig {
            threads: 3,
            ..ClassifyConfig::default()
        };
        let report = classify_batch(
            &FakeAligner,
            Path::new("refs.fasta"),
            &paths(&[
                "CA_SJV_Tm4_16S_LsoF",
                "fail_me",
                "CA_SJV_Tm3_16S_LsoF",
                "CA_SJV_Tm3_50S_CL514F",
                "single",
            ]),
            &table,
            &config,
        );

        let queries: Vec<&str> = report.files.iter().map(|f| f.query.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "CA_SJV_Tm3_16S_LsoF",
                "CA_SJV_Tm3_50S_CL514F",
                "CA_SJV_Tm4_16S_LsoF",
                "single"
            ]
        );

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].item, "/reads/fail_me.fasta");
        assert!(report.skipped[0].reason.contains("fake"));

        let samples: Vec<(&str, &str)> = report
            .samples
            .iter()
            .map(|s| (s.filename.as_str(), s.call.best_haplotypes.as_str()))
            .collect();
        assert_eq!(samples, vec![("CA_SJV_Tm3", "A"), ("CA_SJV_Tm4", "B")]);
    }

    #[test]
    fn test_panicked_worker_files_are_skipped() {
        let table = table();
        let config = ClassifyConfig {
            threads: 1,
            ..ClassifyConfig::default()
        };
        let report = classify_batch(
            &FakeAligner,
            Path::new("refs.fasta"),
            &paths(&["a_Tm3", "panic_me", "z_last"]),
            &table,
            &config,
        );

        // The only worker dies on the second file, so the third is never claimed
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].query, "a_Tm3");
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.item.as_str()).collect();
        assert_eq!(skipped, vec!["/reads/panic_me.fasta", "/reads/z_last.fasta"]);
        assert!(report.skipped.iter().all(|s| s.reason.contains("panicked")));
    }

    #[test]
    fn test_empty_batch() {
        let table = table();
        let report = classify_batch(
            &FakeAligner,
            Path::new("refs.fasta"),
            &[],
            &table,
            &ClassifyConfig::default(),
        );
        assert!(report.files.is_empty());
        assert!(report.samples.is_empty());
        assert!(report.skipped.is_empty());
    }
}
