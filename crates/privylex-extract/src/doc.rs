//! Legacy `.doc` files.
//!
//! This is a best-effort plain-text fallback, not a Word binary parser: the
//! bytes are decoded as lossy UTF-8 and control characters are dropped.
//! Text stored as UTF-16 or in complex pieces comes out garbled or missing.

use privylex_core::{DocumentFormat, ExtractionError, Extractor};

#[derive(Debug, Default, Clone, Copy)]
pub struct DocExtractor;

impl Extractor for DocExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Doc
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let decoded = String::from_utf8_lossy(bytes);
        Ok(decoded
            .chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER && (!c.is_control() || matches!(c, '\n' | '\r' | '\t')))
            .collect())
    }
}
