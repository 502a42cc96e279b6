//! privylex-extract
//!
//! Plain-text extraction for the document formats the batch accepts. Each
//! extractor works on an in-memory byte buffer and is stateless.

pub mod doc;
pub mod docx;
pub mod pdf;

use std::path::Path;

use tracing::debug;

use privylex_core::{DocumentFormat, ExtractionError, Extractor};

pub use doc::DocExtractor;
pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

pub fn extractor_for(format: DocumentFormat) -> Box<dyn Extractor> {
    match format {
        DocumentFormat::Pdf => Box::new(PdfExtractor),
        DocumentFormat::Docx => Box::new(DocxExtractor),
        DocumentFormat::Doc => Box::new(DocExtractor),
    }
}

/// Extract text for a declared format. Whitespace-only output is an error.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
    let extractor = extractor_for(format);
    let text = extractor.extract(bytes)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    debug!(format = extractor.format().as_str(), bytes = bytes.len(), chars = text.chars().count(), "extracted text");
    Ok(text)
}

/// Read a file and extract it according to its extension.
pub fn extract_path(path: &Path) -> Result<(DocumentFormat, String), ExtractionError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    Ok((format, extract(&bytes, format)?))
}
