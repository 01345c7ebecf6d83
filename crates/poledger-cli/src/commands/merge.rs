//! Merge command - add purchase orders to an existing ledger.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::{Term, style};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use poledger_core::batch::{Batch, BatchOutcome, DuplicateKind};
use poledger_core::ledger::{Ledger, LedgerKind, LedgerMerger};
use poledger_core::models::config::PoLedgerConfig;
use poledger_core::models::record::{Record, Supplement};
use poledger_core::purchase_order::FieldExtractor;
use poledger_core::read_document_text;

use super::{collect_inputs, load_config};

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Existing ledger (.xlsx or .csv)
    #[arg(short, long)]
    ledger: PathBuf,

    /// Input files (PDF or extracted text) or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: updated_file.<ext> next to the ledger)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// ROTATION for every new record
    #[arg(long)]
    rotation: Option<i64>,

    /// CARRIER for every new record
    #[arg(long)]
    carrier: Option<String>,

    /// TYPE for every new record
    #[arg(long = "type")]
    kind: Option<String>,

    /// CLIENT for every new record
    #[arg(long)]
    client: Option<String>,

    /// Do not prompt for fields missing from the command line
    #[arg(long)]
    no_prompt: bool,

    /// Show what would change without writing the output
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: MergeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Reject unsupported ledgers before touching any document.
    let kind = LedgerKind::from_path(&args.ledger)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.ledger, &config, kind));
    let output_kind = LedgerKind::from_path(&output_path)?;

    let data = fs::read(&args.ledger)
        .map_err(|e| anyhow::anyhow!("Failed to read ledger {}: {}", args.ledger.display(), e))?;
    let mut ledger = kind.load(&data, &config.ledger.key_column)?;
    info!(
        "Loaded ledger {} with {} rows",
        args.ledger.display(),
        ledger.len()
    );

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let mut batch = build_batch(&files, &ledger, &config)?;
    report_batch(&batch);

    if batch.is_empty() {
        println!("{} No new purchase orders to merge", style("ℹ").blue());
        return Ok(());
    }

    let cli_supplement = Supplement {
        rotation: args.rotation,
        carrier: args.carrier.clone(),
        kind: args.kind.clone(),
        client: args.client.clone(),
    };
    supplement_batch(&mut batch, &cli_supplement, should_prompt(&args, &config))?;

    let records = batch.records();
    let column_order = ledger.columns().to_vec();
    print_review_table(&records, &column_order);

    let summary = LedgerMerger::new().merge(&mut ledger, &records, &column_order)?;

    if args.dry_run {
        println!(
            "{} Dry run: {} rows would be added to {}",
            style("ℹ").blue(),
            summary.inserted.len(),
            output_path.display()
        );
        return Ok(());
    }

    write_ledger(&ledger, output_kind, &output_path)?;

    println!();
    println!(
        "{} Added {} purchase orders, {} rows total, written to {}",
        style("✓").green(),
        summary.inserted.len(),
        ledger.len(),
        output_path.display()
    );
    debug!("Merge finished in {:?}", start.elapsed());

    Ok(())
}

fn default_output_path(ledger: &Path, config: &PoLedgerConfig, kind: LedgerKind) -> PathBuf {
    let file_name = format!("{}.{}", config.ledger.output_stem, kind.extension());
    match ledger.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn build_batch(files: &[PathBuf], ledger: &Ledger, config: &PoLedgerConfig) -> anyhow::Result<Batch> {
    let extractor = FieldExtractor::new(config.extraction.template)
        .with_ship_date_check(config.extraction.warn_on_bad_ship_date);
    let mut batch = Batch::with_extractor(ledger.existing_keys()?, extractor);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    for path in files {
        let source = path.display().to_string();
        pb.set_message(source.clone());

        match read_document_text(path, config.pdf.min_text_length) {
            Ok(text) => {
                if let BatchOutcome::Accepted(po_num) = batch.add(source, &text) {
                    debug!("{} -> PO #{}", path.display(), po_num);
                }
            }
            Err(e) => batch.reject(source, e.to_string()),
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(batch)
}

fn report_batch(batch: &Batch) {
    for rejected in batch.rejected() {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            rejected.source,
            rejected.reason
        );
    }

    for duplicate in batch.duplicates() {
        let reason = match duplicate.kind {
            DuplicateKind::InLedger => "is already in the ledger",
            DuplicateKind::InBatch => "appears more than once in this batch",
        };
        eprintln!(
            "{} {}: PO #{} {}",
            style("⚠").yellow(),
            duplicate.source,
            duplicate.po_num,
            reason
        );
    }
}

fn should_prompt(args: &MergeArgs, config: &PoLedgerConfig) -> bool {
    if args.no_prompt || !config.prompt.enabled {
        return false;
    }
    if !Term::stderr().is_term() {
        warn!("Not attached to a terminal, skipping prompts");
        return false;
    }
    true
}

fn supplement_batch(batch: &mut Batch, cli: &Supplement, prompt: bool) -> anyhow::Result<()> {
    if !prompt || cli.is_complete() {
        batch.supplement_all(cli);
        return Ok(());
    }

    let po_nums: Vec<u64> = batch.accepted().iter().map(|a| a.record().po_num).collect();
    for po_num in po_nums {
        println!();
        println!("{}", style(format!("PO #{}", po_num)).bold());
        let prompted = prompt_supplement(cli)?;
        batch.supplement(po_num, &cli.clone().or(&prompted));
    }

    Ok(())
}

/// Ask for each field the command line left out. Blank answers stay missing.
fn prompt_supplement(cli: &Supplement) -> anyhow::Result<Supplement> {
    let rotation = match cli.rotation {
        Some(_) => None,
        None => {
            let answer: String = Input::new()
                .with_prompt("ROTATION")
                .allow_empty(true)
                .validate_with(|input: &String| -> Result<(), &str> {
                    let trimmed = input.trim();
                    if trimmed.is_empty() || trimmed.parse::<i64>().is_ok() {
                        Ok(())
                    } else {
                        Err("ROTATION must be a whole number")
                    }
                })
                .interact_text()?;
            answer.trim().parse().ok()
        }
    };

    Ok(Supplement {
        rotation,
        carrier: ask_text("CARRIER", &cli.carrier)?,
        kind: ask_text("TYPE", &cli.kind)?,
        client: ask_text("CLIENT", &cli.client)?,
    })
}

fn ask_text(label: &str, given: &Option<String>) -> anyhow::Result<Option<String>> {
    if given.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        return Ok(None);
    }
    let answer: String = Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?;
    Ok(Some(answer))
}

fn print_review_table(records: &[Record], column_order: &[String]) {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| r.to_row(column_order).iter().map(|c| c.to_string()).collect())
        .collect();

    let widths: Vec<usize> = column_order
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(40)
        })
        .collect();

    println!();
    let header: Vec<String> = column_order
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<w$}", name, w = *w))
        .collect();
    println!("{}", style(header.join("  ")).bold());

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, w)| format!("{:<w$}", truncate(value, *w), w = *w))
            .collect();
        println!("{}", line.join("  "));
    }
    println!();
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn write_ledger(ledger: &Ledger, kind: LedgerKind, path: &Path) -> anyhow::Result<()> {
    let bytes = kind.save(ledger)?;
    fs::write(path, bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    info!("Wrote {} rows to {}", ledger.len(), path.display());
    Ok(())
}
