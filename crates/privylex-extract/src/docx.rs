//! DOCX text extraction: a zip archive whose `word/document.xml` holds the
//! body. Only text runs are kept; one line per paragraph.

use std::io::{Cursor, Read};

use privylex_core::{DocumentFormat, ExtractionError, Extractor};

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(format!("invalid archive: {e}")))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| ExtractionError::Docx(format!("no {DOCUMENT_PART} in archive")))?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| ExtractionError::Docx(format!("failed to read {DOCUMENT_PART}: {e}")))?;
        Ok(text_from_document_xml(&xml))
    }
}

/// Collect `<w:t>` runs, breaking lines at paragraph ends and `<w:br/>`.
pub fn text_from_document_xml(xml: &str) -> String {
    let mut out = String::new();
    let mut run = String::new();
    let mut in_text = false;
    let mut rest = xml;
    while let Some(open) = rest.find('<') {
        if in_text {
            run.push_str(&rest[..open]);
        }
        let Some(close) = rest[open..].find('>') else { break };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag.trim_start_matches('/').split(|c: char| c.is_whitespace() || c == '/').next().unwrap_or("");
        match (name, closing, self_closing) {
            ("w:t", false, false) => in_text = true,
            ("w:t", true, _) => {
                in_text = false;
                out.push_str(&decode_entities(&run));
                run.clear();
            }
            ("w:tab", false, _) => out.push('\t'),
            ("w:br" | "w:cr", false, _) => out.push('\n'),
            ("w:p", true, _) => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}
