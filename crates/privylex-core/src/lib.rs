#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Shared building blocks: layered configuration, the error taxonomy,
//! domain types, collaborator traits and the fixed-window chunker.

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{chunk_text, Chunker, ChunkingConfig};
pub use error::{ConfigurationError, Error, ExtractionError, GenerationError, IndexError, Result};
pub use traits::{Extractor, Generator};
pub use types::{Chunk, DocId, Document, DocumentFormat, GenerationRequest, RetrievedChunk};
