//! PDF text extraction.
//!
//! `pdf-extract` handles font encodings well but can error or panic on
//! unusual files; those fall back to a plain walk over the content streams
//! with `lopdf`. No OCR and no layout analysis.

use lopdf::{content::Content, Document, Object};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use privylex_core::{DocumentFormat, ExtractionError, Extractor};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes))) {
            Ok(Ok(pages)) => {
                debug!(pages = pages.len(), "pdf-extract succeeded");
                Ok(join_pages(&pages))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "pdf-extract failed, trying lopdf fallback");
                extract_via_lopdf(bytes)
            }
            Err(payload) => {
                warn!(panic = %panic_message(payload.as_ref()), "pdf-extract panicked, trying lopdf fallback");
                extract_via_lopdf(bytes)
            }
        }
    }
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Less accurate for complex fonts, more tolerant of malformed files.
pub fn extract_via_lopdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    let mut text = String::new();
    for (_page_num, page_id) in doc.get_pages() {
        let Ok(raw) = doc.get_page_content(page_id) else { continue };
        let operations = Content::decode(&raw).map(|c| c.operations).unwrap_or_default();
        for op in operations {
            match op.operator.as_str() {
                "Tj" | "'" | "\"" => {
                    if let Some(Object::String(bytes, _)) = op.operands.last() {
                        text.push_str(&decode_pdf_string(bytes));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            if let Object::String(bytes, _) = item {
                                text.push_str(&decode_pdf_string(bytes));
                            }
                        }
                    }
                }
                "Td" | "TD" | "T*" => {
                    if !text.ends_with('\n') && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
                "ET" => {
                    if !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                _ => {}
            }
        }
        text.push('\n');
    }
    Ok(text)
}

/// UTF-16BE when the BOM is present, else UTF-8 with a Latin-1 fallback.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
