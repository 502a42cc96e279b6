use crate::error::{ExtractionError, GenerationError};
use crate::types::{DocumentFormat, GenerationRequest};

/// Turns the raw bytes of one document into plain text. Stateless.
pub trait Extractor: Send + Sync {
    fn format(&self) -> DocumentFormat;
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// The language-model collaborator: one request in, generated text out.
pub trait Generator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

impl<F> Generator for F
where
    F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync,
{
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self(request)
    }
}
