use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::OutputFormat;
use crate::external::{ClustalW, ToolConfig};
use crate::parsing::fasta::read_fasta_file;
use crate::variants::{all_labels, build_variant_tables, write_variant_table, VariantTableReport};

#[derive(Args)]
pub struct VariantTableArgs {
    /// Reference FASTA with one record per region, named `<reference>_<region>`
    #[arg(short, long)]
    pub references: PathBuf,

    /// Directory with `<region>.fasta` haplotype consensus sequences; alignments are
    /// written here as well
    #[arg(short, long)]
    pub consensus_dir: PathBuf,

    /// Only build these regions
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Path to the clustalw executable
    #[arg(long, default_value = "clustalw")]
    pub clustalw: PathBuf,

    /// Seconds allowed for each clustalw run
    #[arg(long, default_value = "600")]
    pub timeout: u64,

    /// Also write the variant table TSV to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute variant-table subcommand
///
/// # Errors
///
/// Returns an error if the references cannot be read, a requested region is unknown
/// or no region could be built.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: VariantTableArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let references = read_fasta_file(&args.references)
        .with_context(|| format!("Failed to read references {}", args.references.display()))?;
    if verbose {
        eprintln!("Loaded {} reference sequences", references.len());
    }

    let config = ToolConfig::new(&args.clustalw, Duration::from_secs(args.timeout));
    let aligner = ClustalW::new(config);
    let report = build_variant_tables(&aligner, &references, &args.consensus_dir, &args.regions)?;

    if report.tables.is_empty() {
        for item in &report.skipped {
            eprintln!("{}: {}", item.item, item.reason);
        }
        bail!("No variant table could be built");
    }

    if let Some(path) = &args.output {
        let mut writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        write_variant_table(&mut writer, &report.tables)?;
        writer.flush()?;
        if verbose {
            eprintln!("Wrote {}", path.display());
        }
    }

    match format {
        OutputFormat::Text => print_text_results(&report),
        OutputFormat::Json => print_json_results(&report)?,
        OutputFormat::Tsv => {
            let mut stdout = io::stdout().lock();
            write_variant_table(&mut stdout, &report.tables)?;
        }
    }

    Ok(())
}

/// Presence grid: `+` where a haplotype carries the variant
fn print_text_results(report: &VariantTableReport) {
    let labels = all_labels(&report.tables);

    for table in &report.tables {
        println!("\n{} {}", table.reference, table.region);
        println!("{}", "─".repeat(60));
        println!("   pos\tdescription\t{}", labels.join("\t"));
        for row in &table.rows {
            let presence: Vec<&str> = labels
                .iter()
                .map(|label| if row.is_present(label) { "+" } else { "-" })
                .collect();
            println!("   {}\t{}\t{}", row.position, row.description, presence.join("\t"));
        }
        if table.rows.is_empty() {
            println!("   (no variants)");
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped {} region(s):", report.skipped.len());
        for item in &report.skipped {
            println!("   {}: {}", item.item, item.reason);
        }
    }
}

fn print_json_results(report: &VariantTableReport) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "regions": report.tables,
        "skipped": report.skipped,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
