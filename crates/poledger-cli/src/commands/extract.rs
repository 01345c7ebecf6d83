//! Extract command - read records from purchase-order documents.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use poledger_core::models::record::{Column, Record};
use poledger_core::purchase_order::{FieldExtractor, RecordParser};
use poledger_core::read_document_text;

use super::{collect_inputs, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files (PDF or extracted text) or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    let extractor = FieldExtractor::new(config.extraction.template)
        .with_ship_date_check(config.extraction.warn_on_bad_ship_date);

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        info!("Processing file: {}", path.display());

        let text = match read_document_text(path, config.pdf.min_text_length) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                eprintln!("{} {}: {}", style("✗").red(), path.display(), e);
                continue;
            }
        };

        match extractor.parse(&text) {
            Ok(result) => {
                for warning in &result.warnings {
                    debug!("{}: {}", path.display(), warning);
                }
                records.push(result.record);
            }
            Err(e) => {
                eprintln!("{} {}: {}", style("✗").red(), path.display(), e);
            }
        }
    }

    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!(
        "Extracted {} of {} files in {:?}",
        records.len(),
        files.len(),
        start.elapsed()
    );

    Ok(())
}

fn format_records(records: &[Record], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

fn format_csv(records: &[Record]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Column::ALL.iter().map(|c| c.as_str()))?;
    for record in records {
        wtr.write_record(Column::ALL.iter().map(|c| record.cell(*c).to_string()))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[Record]) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!("PO #{}\n", record.po_num));
        for column in Column::ALL.iter().skip(1) {
            output.push_str(&format!("  {:<18} {}\n", column.as_str(), record.cell(*column)));
        }
        output.push('\n');
    }

    output
}
