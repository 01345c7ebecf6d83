//! Error types for the poledger-core library.

use thiserror::Error;

/// Main error type for the poledger library.
#[derive(Error, Debug)]
pub enum PoLedgerError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Record extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Ledger load/merge/save error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to record extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The text does not carry the marker of the selected template.
    #[error("document does not match the {template} format")]
    NotRecognized { template: String },
}

/// Errors related to ledger files.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The ledger file extension is neither `.xlsx` nor `.csv`.
    #[error("unsupported ledger file type: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    /// The declared column order does not contain the key column.
    #[error("key column {0} not found in ledger header")]
    MissingKeyColumn(String),

    /// The ledger has no header row.
    #[error("ledger has no header row")]
    Empty,

    /// CSV read/write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read an XLSX workbook.
    #[error("failed to read workbook: {0}")]
    XlsxRead(String),

    /// A worksheet exceeds the workbook grid limits.
    #[error("worksheet '{sheet}' has {rows} rows and {columns} columns, more than a worksheet holds")]
    SheetTooLarge {
        sheet: String,
        rows: usize,
        columns: usize,
    },

    /// Failed to write an XLSX workbook.
    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type for the poledger library.
pub type Result<T> = std::result::Result<T, PoLedgerError>;
