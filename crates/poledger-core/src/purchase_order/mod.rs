//! Purchase-order field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{ExtractionResult, FieldExtractor};
pub use rules::{FieldMatch, FieldRule, Normalizer, Template, TemplateKind, detect_template};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for purchase-order parsers.
pub trait RecordParser {
    /// Check the document marker without extracting anything.
    fn recognizes(&self, text: &str) -> bool;

    /// Parse a record from extracted document text.
    ///
    /// Unmatched fields are left missing; the only error is a document that
    /// does not carry the template marker.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}
