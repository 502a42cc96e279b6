use thiserror::Error;

/// A document could not be turned into plain text. The file is skipped.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("No text could be extracted")]
    Empty,
}

/// Invalid settings. Fatal to the call that received them.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid chunking: size={size}, overlap={overlap} (need size > 0 and overlap < size)")]
    InvalidChunking { size: usize, overlap: usize },

    #[error("Invalid retrieval settings: {0}")]
    InvalidRetrieval(String),

    #[error("Invalid answer settings: {0}")]
    InvalidAnswer(String),

    #[error("Missing setting '{0}'")]
    Missing(&'static str),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// A document could not be indexed. It stays unindexed and retrieval on it
/// yields an empty context.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Document '{doc_id}' has no chunks to index")]
    EmptyChunks { doc_id: String },

    #[error("Document '{doc_id}' has no usable terms after stop-word removal")]
    EmptyVocabulary { doc_id: String },
}

/// The generation collaborator failed (auth, quota, transport, bad payload).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
