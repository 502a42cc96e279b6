//! Domain types shared by the extractor, index, retriever and answerer.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub type DocId = String;

/// Formats the extractor understands. Anything else is ignored at discovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
        }
    }
}

/// Text extracted from one input file.
///
/// - `id`: stable identity (path relative to the input directory)
/// - `file_name`: bare file name, as reported in the analysis record
/// - `text`: the full extracted text; replaced wholesale, never edited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub file_name: String,
    pub format: DocumentFormat,
    pub text: String,
}

impl Document {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous window of a document's text.
///
/// `start` is a character offset into the source text. Neighbouring chunks
/// share `overlap` characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub content: String,
}

/// One retrieved chunk with its cosine similarity to the query.
///
/// Higher `score` is better. `chunk_index` matches `Chunk::index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_index: usize,
    pub score: f32,
    pub content: String,
}

/// A single chat-style request to the generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: usize,
    pub temperature: f32,
}
