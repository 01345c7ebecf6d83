//! Configuration structures for the ledger pipeline.

use serde::{Deserialize, Serialize};

use crate::ledger::DEFAULT_KEY_COLUMN;
use crate::purchase_order::TemplateKind;

/// Main configuration for poledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoLedgerConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Ledger file configuration.
    pub ledger: LedgerConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Operator prompt configuration.
    pub prompt: PromptConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Document template to read.
    pub template: TemplateKind,

    /// Warn when the ship date is not a real calendar date.
    pub warn_on_bad_ship_date: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            template: TemplateKind::CostcoPo,
            warn_on_bad_ship_date: true,
        }
    }
}

/// Ledger file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Header of the key column.
    pub key_column: String,

    /// File stem of the default output, written next to the input ledger.
    pub output_stem: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            output_stem: "updated_file".to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// PDFs yielding fewer characters of text are treated as unreadable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Operator prompt configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Ask for ROTATION, CARRIER, TYPE and CLIENT during a merge.
    pub enabled: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PoLedgerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
