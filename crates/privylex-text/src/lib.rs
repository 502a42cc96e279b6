//! privylex-text
//!
//! Lexical retrieval: a tantivy-backed stop-word analyzer, the per-document
//! TF-IDF index, and the cosine-ranked retriever built on top of it.

pub mod analyzer;
pub mod index;
pub mod search;

pub use analyzer::Analyzer;
pub use index::{DocumentIndex, IndexedDocument, LexicalSpace, QueryVector};
pub use search::Retriever;
