//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Read the text of an input document.
///
/// `.txt` files are taken as already-extracted text; anything else is parsed
/// as a PDF. PDFs yielding fewer than `min_text_length` non-blank characters
/// are reported as unreadable.
pub fn read_document_text(path: &Path, min_text_length: usize) -> crate::Result<String> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));

    if is_text {
        debug!("Reading text document {}", path.display());
        return Ok(std::fs::read_to_string(path)?);
    }

    let data = std::fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;
    let text = extractor.extract_text()?;

    let length = text.chars().filter(|c| !c.is_whitespace()).count();
    if length < min_text_length {
        return Err(PdfError::TextExtraction(format!(
            "{} characters of text, need at least {}",
            length, min_text_length
        ))
        .into());
    }

    debug!(
        "Extracted {} characters from {} ({} pages)",
        text.len(),
        path.display(),
        extractor.page_count()
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoLedgerError;

    #[test]
    fn test_text_files_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("po.TXT");
        std::fs::write(&path, "Order #: 42\n").unwrap();

        assert_eq!(read_document_text(&path, 100).unwrap(), "Order #: 42\n");
    }

    #[test]
    fn test_broken_pdf_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("po.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        let err = read_document_text(&path, 1).unwrap_err();
        assert!(matches!(err, PoLedgerError::Pdf(PdfError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_document_text(Path::new("/nonexistent/po.pdf"), 1).unwrap_err();
        assert!(matches!(err, PoLedgerError::Io(_)));
    }
}
