//! Rule-table driven purchase-order extractor.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::record::{Column, Record};

use super::rules::{TemplateKind, parse_ship_date};
use super::{RecordParser, Result};

/// Result of record extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: Record,
    /// Template the document matched.
    pub template: TemplateKind,
    /// Extracted columns no rule could fill.
    pub missing: Vec<Column>,
    /// Columns filled from the alternate layout.
    pub from_fallback: Vec<Column>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extracts a [`Record`] from document text with a template's rule table.
pub struct FieldExtractor {
    template: TemplateKind,
    /// Whether to warn about ship dates that are not valid calendar dates.
    check_ship_date: bool,
}

impl FieldExtractor {
    /// Create an extractor for a template.
    pub fn new(template: TemplateKind) -> Self {
        Self {
            template,
            check_ship_date: true,
        }
    }

    /// Set ship date checking.
    pub fn with_ship_date_check(mut self, check: bool) -> Self {
        self.check_ship_date = check;
        self
    }

    /// Template this extractor reads.
    pub fn template(&self) -> TemplateKind {
        self.template
    }

    /// Extract a record, or report that the text is not this template.
    pub fn extract(&self, text: &str) -> Result<ExtractionResult> {
        self.parse(text)
    }

    /// Fold a later extraction of the same order into an earlier one.
    ///
    /// Fields the later document filled overwrite the earlier values, and the
    /// missing columns and warnings are worked out again from the combined
    /// record.
    pub fn fold(&self, earlier: &mut ExtractionResult, later: &ExtractionResult) {
        let from_fallback: Vec<Column> = Column::ALL
            .iter()
            .copied()
            .filter(|column| {
                if later.record.cell(*column).is_missing() {
                    earlier.from_fallback.contains(column)
                } else {
                    later.from_fallback.contains(column)
                }
            })
            .collect();

        earlier.record.absorb(&later.record);
        let (missing, warnings) = self.review(&earlier.record);
        earlier.missing = missing;
        earlier.warnings = warnings;
        earlier.from_fallback = from_fallback;
        earlier.processing_time_ms += later.processing_time_ms;

        debug!(
            "Folded PO #{}: {} missing fields remain",
            earlier.record.po_num,
            earlier.missing.len()
        );
    }

    /// Missing extracted columns and warnings for a record.
    fn review(&self, record: &Record) -> (Vec<Column>, Vec<String>) {
        let mut warnings = Vec::new();

        if self.check_ship_date {
            if let Some(ship_date) = &record.ship_date {
                if parse_ship_date(ship_date).is_none() {
                    warnings.push(format!("Ship date {ship_date:?} is not a valid date"));
                }
            }
        }

        let missing: Vec<Column> = record
            .missing_columns()
            .into_iter()
            .filter(|c| !Column::SUPPLEMENTAL.contains(c))
            .collect();
        for column in &missing {
            warnings.push(format!("Could not extract {column}"));
        }

        (missing, warnings)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(TemplateKind::default())
    }
}

impl RecordParser for FieldExtractor {
    fn recognizes(&self, text: &str) -> bool {
        self.template.template().recognizes(text)
    }

    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let template = self.template.template();

        let po_num = template.key(text).ok_or_else(|| ExtractionError::NotRecognized {
            template: self.template.label().to_string(),
        })?;

        info!("Parsing PO #{} from {} characters of text", po_num, text.len());

        let mut record = Record::new(po_num);
        let mut from_fallback = Vec::new();

        for rule in &template.rules {
            match rule.apply(text) {
                Some(m) => {
                    debug!("{} = {} (from {:?})", m.column, m.value, m.source);
                    if m.from_fallback {
                        from_fallback.push(m.column);
                    }
                    record.set(m.column, m.value);
                }
                None => {
                    debug!("{} not found", rule.column);
                }
            }
        }

        let (missing, warnings) = self.review(&record);

        debug!(
            "Extracted PO #{} with {} missing fields",
            po_num,
            missing.len()
        );

        Ok(ExtractionResult {
            record,
            template: self.template,
            missing,
            from_fallback,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
