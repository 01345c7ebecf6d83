//! Core library for purchase-order ledger maintenance.
//!
//! This crate provides:
//! - PDF text extraction
//! - Template-driven purchase-order field extraction
//! - CSV and XLSX ledgers with an `N/A` sentinel for missing values
//! - Keyed merging of new records into a ledger

pub mod batch;
pub mod error;
pub mod ledger;
pub mod models;
pub mod pdf;
pub mod purchase_order;

pub use batch::{Accepted, Batch, BatchOutcome, Duplicate, DuplicateKind, Rejected};
pub use error::{ExtractionError, LedgerError, PdfError, PoLedgerError, Result};
pub use ledger::{Cell, Ledger, LedgerFormat, LedgerKind, LedgerMerger, MergeSummary, SENTINEL};
pub use models::config::PoLedgerConfig;
pub use models::record::{Column, Record, Supplement};
pub use pdf::{PdfExtractor, PdfProcessor, read_document_text};
pub use purchase_order::{ExtractionResult, FieldExtractor, RecordParser, TemplateKind};
