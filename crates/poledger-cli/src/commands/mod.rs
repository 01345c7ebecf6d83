//! Subcommands and the helpers they share.

pub mod config;
pub mod extract;
pub mod merge;

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use poledger_core::models::config::PoLedgerConfig;

/// Load the config from `--config`, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PoLedgerConfig> {
    match config_path {
        Some(path) => Ok(PoLedgerConfig::from_file(Path::new(path))?),
        None => Ok(PoLedgerConfig::default()),
    }
}

/// Expand input paths and glob patterns into document files.
///
/// Only `.pdf` and `.txt` files are kept. A literal path that does not exist
/// is an error; a pattern matching nothing is not.
pub fn collect_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if Path::new(input).exists() {
            files.push(PathBuf::from(input));
            continue;
        }

        let is_pattern = input.contains(['*', '?', '[']);
        if !is_pattern {
            anyhow::bail!("Input file not found: {}", input);
        }

        let matched: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| is_document(p))
            .collect();
        debug!("Pattern {} matched {} files", input, matched.len());
        files.extend(matched);
    }

    Ok(files)
}

fn is_document(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
}
