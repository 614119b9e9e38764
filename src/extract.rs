//! PDF text extraction.
//!
//! Uses pdf-extract for reading the text layer of uploaded PDFs.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

/// PDF header, which readers accept anywhere in the first [`HEADER_WINDOW`] bytes
const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_WINDOW: usize = 1024;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("file is {size} bytes, larger than the {limit} byte upload limit")]
    TooLarge { size: usize, limit: usize },
    #[error("file is not a PDF document")]
    NotPdf,
    #[error("failed to read PDF: {0}")]
    Malformed(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Read an upload from disk, refusing files over `max_bytes` before loading them.
pub fn read_upload(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ExtractionError> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes as u64 {
        return Err(ExtractionError::TooLarge {
            size: usize::try_from(size).unwrap_or(usize::MAX),
            limit: max_bytes,
        });
    }
    Ok(std::fs::read(path)?)
}

/// Turns uploaded document bytes into plain text.
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Extractor backed by the pdf-extract crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if !has_pdf_header(bytes) {
            return Err(ExtractionError::NotPdf);
        }

        // pdf-extract panics on some malformed inputs
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }))
        .map_err(|_| ExtractionError::Malformed("parser aborted".to_string()))?;

        let text = result.map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        tracing::debug!(chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(HEADER_WINDOW)]
        .windows(PDF_MAGIC.len())
        .any(|window| window == PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_may_follow_leading_bytes() {
        assert!(has_pdf_header(b"%PDF-1.7\n"));
        assert!(has_pdf_header(b"\xEF\xBB\xBF%PDF-1.4\n"));

        let mut late = vec![b' '; HEADER_WINDOW - PDF_MAGIC.len()];
        late.extend_from_slice(b"%PDF-1.7");
        assert!(has_pdf_header(&late));

        let mut too_late = vec![b' '; HEADER_WINDOW];
        too_late.extend_from_slice(b"%PDF-1.7");
        assert!(!has_pdf_header(&too_late));
        assert!(matches!(
            PdfExtractor.extract_text(&too_late),
            Err(ExtractionError::NotPdf)
        ));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = PdfExtractor.extract_text(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::NotPdf));
    }

    #[test]
    fn read_upload_enforces_size_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &[0u8; 64]).unwrap();

        let err = read_upload(file.path(), 32).unwrap_err();
        assert!(matches!(err, ExtractionError::TooLarge { size: 64, limit: 32 }));
        assert_eq!(read_upload(file.path(), 64).unwrap().len(), 64);
    }

    #[test]
    fn rejects_truncated_pdf() {
        let err = PdfExtractor
            .extract_text(b"%PDF-1.7\n1 0 obj\n<<")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }
}
