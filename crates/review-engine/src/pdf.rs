//! PDF text extraction
//!
//! Text is pulled page by page with lopdf. Pages that yield nothing (scanned
//! images, blank pages, pages lopdf cannot decode) are skipped rather than
//! failing the whole document; only a document with no text at all is an
//! error.

use std::io::Write;
use std::path::Path;

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to load PDF: {0}")]
    Load(String),

    #[error("PDF contains no extractable text")]
    EmptyDocument,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stateless text extractor
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extract text from a PDF on disk
    pub fn extract_file(path: &Path) -> Result<String, ExtractionError> {
        let document = Document::load(path).map_err(|e| ExtractionError::Load(e.to_string()))?;
        Self::extract_document(&document)
    }

    /// Extract text from in-memory PDF bytes
    pub fn extract_bytes(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let document =
            Document::load_mem(pdf_bytes).map_err(|e| ExtractionError::Load(e.to_string()))?;
        Self::extract_document(&document)
    }

    /// Spool the bytes to a temporary `.pdf` file and extract from there.
    ///
    /// The file is removed when this function returns, on success or error.
    pub fn extract_via_tempfile(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Self::extract_via_tempfile_in(&std::env::temp_dir(), pdf_bytes)
    }

    /// Same as [`extract_via_tempfile`](Self::extract_via_tempfile), spooling into `dir`
    pub fn extract_via_tempfile_in(
        dir: &Path,
        pdf_bytes: &[u8],
    ) -> Result<String, ExtractionError> {
        let mut file = tempfile::Builder::new()
            .prefix("review-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(pdf_bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = pdf_bytes.len(), "spooled PDF");
        Self::extract_file(file.path())
    }

    fn extract_document(document: &Document) -> Result<String, ExtractionError> {
        let mut pages = Vec::new();

        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) if !text.trim().is_empty() => pages.push(text.trim_end().to_string()),
                Ok(_) => debug!(page = page_number, "skipping page without text"),
                Err(e) => debug!(page = page_number, error = %e, "skipping unreadable page"),
            }
        }

        let text = pages.join("\n");
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }
        Ok(text)
    }
}
