use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::UNRESOLVED;
use crate::external::{Blastn, ToolConfig};
use crate::haplotyping::{HaplotypeTable, HaplotypingSummary};
use crate::workflow::batch::{classify_batch, sample_id, BatchReport, FileResult};
use crate::workflow::config::{ClassifyConfig, DEFAULT_MIN_IDENTITY, DEFAULT_SAMPLE_FIELDS};

/// Line length of alignments shown in verbose text output
const ALIGNMENT_LINE_LENGTH: usize = 60;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Query FASTA files, one read (or read pair) per file
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// BLAST database of the reference loci
    #[arg(short, long)]
    pub database: PathBuf,

    /// Informative positions table (TSV with reference, position and one column per haplotype)
    #[arg(short = 'H', long)]
    pub haplotype_table: PathBuf,

    /// Path to the blastn executable
    #[arg(long, default_value = "blastn")]
    pub blastn: PathBuf,

    /// Minimal identity (0-1) for a match to be reported as best match
    #[arg(long, default_value_t = DEFAULT_MIN_IDENTITY)]
    pub min_identity: f64,

    /// Number of files classified in parallel
    #[arg(short, long, default_value = "1")]
    pub threads: usize,

    /// Seconds allowed for each blastn run
    #[arg(long, default_value = "600")]
    pub timeout: u64,

    /// Number of leading underscore-separated file name fields forming the sample id
    #[arg(long, default_value_t = DEFAULT_SAMPLE_FIELDS)]
    pub sample_fields: usize,
}

impl ClassifyArgs {
    fn config(&self) -> ClassifyConfig {
        ClassifyConfig {
            min_identity: self.min_identity,
            threads: self.threads,
            tool_timeout: Duration::from_secs(self.timeout),
            sample_fields: self.sample_fields,
        }
    }
}

/// Execute classify subcommand
///
/// # Errors
///
/// Returns an error if the haplotype table cannot be loaded or no input could be
/// classified.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let table = HaplotypeTable::load(&args.haplotype_table)?;
    if verbose {
        eprintln!(
            "Loaded {} informative positions for {} haplotypes",
            table.len(),
            table.labels().len()
        );
    }

    let config = args.config();
    let aligner = Blastn::new(ToolConfig::new(&args.blastn, config.tool_timeout));
    let report = classify_batch(&aligner, &args.database, &args.inputs, &table, &config);

    if report.files.is_empty() && !report.skipped.is_empty() {
        for item in &report.skipped {
            eprintln!("{}: {}", item.item, item.reason);
        }
        bail!("None of the {} input files could be classified", args.inputs.len());
    }

    match format {
        OutputFormat::Text => print_text_results(&report, verbose),
        OutputFormat::Json => print_json_results(&report)?,
        OutputFormat::Tsv => print_tsv_results(&report, &table, config.sample_fields),
    }

    Ok(())
}

fn print_text_results(report: &BatchReport, verbose: bool) {
    for (i, file) in report.files.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }
        print_text_file(file, verbose);
    }

    if !report.samples.is_empty() {
        println!("\nSamples");
        println!("{}", "=".repeat(60));
        for sample in &report.samples {
            println!(
                "   {}: {} (score {})",
                sample.filename, sample.call.best_haplotypes, sample.call.best_score
            );
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped {} input(s):", report.skipped.len());
        for item in &report.skipped {
            println!("   {}: {}", item.item, item.reason);
        }
    }
}

fn print_text_file(file: &FileResult, verbose: bool) {
    let best = &file.best_match;
    println!("\n{}", file.query);
    match &best.database {
        Some(database) => {
            println!("   Best match: {} ({:.1}% identity)", database, best.identity * 100.0);
            println!(
                "   Query: {}-{} ({})   Database: {}-{} ({})",
                best.query_start,
                best.query_end,
                best.query_strand,
                best.database_start,
                best.database_end,
                best.database_strand
            );
            println!("   CIGAR: {}", best.cigar);
        }
        None => println!("   Best match: none"),
    }

    let call = &file.haplotyping.call;
    println!("   Haplotype: {} (score {})", call.best_haplotypes, call.best_score);

    if verbose {
        for count in &file.haplotyping.counts {
            println!("     {}: +{} -{}", count.label, count.positive, count.negative);
        }
        if best.is_match() {
            println!();
            println!(
                "{}",
                best.alignment
                    .wrapped(best.query_start, best.database_start, ALIGNMENT_LINE_LENGTH)
            );
        }
    }
}

fn print_json_results(report: &BatchReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// One TSV row per file and one per sample, ordered by sample then query; fields that
/// do not apply are `-`.
fn print_tsv_results(report: &BatchReport, table: &HaplotypeTable, sample_fields: usize) {
    let mut header = String::from("sample\tquery\tdatabase\tidentity\tbest_haplotypes\tbest_score");
    for label in table.labels() {
        header.push_str(&format!("\t{label}_pos\t{label}_neg"));
    }
    println!("{header}");

    let mut rows: Vec<(String, String, String)> = Vec::new();
    for file in &report.files {
        let sample =
            sample_id(&file.query, sample_fields).unwrap_or_else(|| UNRESOLVED.to_string());
        let database = file.best_match.database.as_deref().unwrap_or(UNRESOLVED);
        let identity = if file.best_match.is_match() {
            format!("{:.2}", file.best_match.identity * 100.0)
        } else {
            UNRESOLVED.to_string()
        };
        rows.push((
            sample,
            file.query.clone(),
            format_row(database, &identity, &file.haplotyping),
        ));
    }
    for summary in &report.samples {
        rows.push((
            summary.filename.clone(),
            UNRESOLVED.to_string(),
            format_row(UNRESOLVED, UNRESOLVED, summary),
        ));
    }
    rows.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

    for (sample, query, rest) in rows {
        println!("{sample}\t{query}\t{rest}");
    }
}

fn format_row(database: &str, identity: &str, summary: &HaplotypingSummary) -> String {
    let mut row = format!(
        "{}\t{}\t{}\t{}",
        database, identity, summary.call.best_haplotypes, summary.call.best_score
    );
    for count in &summary.counts {
        row.push_str(&format!("\t{}\t{}", count.positive, count.negative));
    }
    row
}
