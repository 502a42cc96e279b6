//! privylex-rag
//!
//! Grounded answering on top of the lexical retriever, plus the generation
//! providers it can talk to.

pub mod answerer;
pub mod pipeline;
pub mod provider;

pub use answerer::{mock_analysis, truncate_chars, Answerer, NOT_FOUND_PHRASE};
pub use pipeline::{combined_text, RagPipeline};
