use tracing::{debug, warn};

use privylex_core::config::{AnswerConfig, RetrievalConfig, Settings};
use privylex_core::{Chunker, ConfigurationError, Document, Generator, IndexError};
use privylex_text::{DocumentIndex, Retriever};

use crate::answerer::{mock_analysis, Answerer};

/// Chunker, per-document index, retriever and answerer wired together.
pub struct RagPipeline {
    chunker: Chunker,
    index: DocumentIndex,
    retrieval: RetrievalConfig,
    answer: AnswerConfig,
    answerer: Option<Answerer>,
}

impl RagPipeline {
    /// Without a generator the pipeline answers with the mock analysis.
    pub fn new(settings: &Settings, generator: Option<Box<dyn Generator>>) -> Result<Self, ConfigurationError> {
        settings.retrieval.validate()?;
        settings.answer.validate()?;
        let chunker = Chunker::new(settings.chunking)?;
        let answerer = generator.map(|g| Answerer::new(g, &settings.answer));
        Ok(Self { chunker, index: DocumentIndex::new(), retrieval: settings.retrieval, answer: settings.answer.clone(), answerer })
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub fn has_generator(&self) -> bool {
        self.answerer.is_some()
    }

    /// Chunk and fit one document, replacing any previous entry under its id.
    pub fn ingest(&self, doc: &Document) -> Result<usize, IndexError> {
        let chunks = self.chunker.chunk(&doc.text);
        let n = chunks.len();
        self.index.fit(&doc.id, chunks)?;
        Ok(n)
    }

    /// Labelled retrieved context across `documents`; empty when nothing matched.
    pub fn retrieve_context(&self, documents: &[Document], query: &str) -> String {
        let retriever = match Retriever::new(&self.index, self.retrieval) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "retriever unavailable");
                return String::new();
            }
        };
        let mut context = String::new();
        for doc in documents {
            let part = retriever.retrieve(&doc.id, query);
            if part.is_empty() {
                debug!(doc_id = %doc.id, "no relevant chunks");
                continue;
            }
            context.push_str(&format!("\n--- Content from {} ---\n{}\n", doc.file_name, part));
        }
        context
    }

    /// Produce the analysis text for `query` over the extracted documents.
    pub fn analyze(&self, query: &str, documents: &[Document]) -> String {
        let combined = combined_text(documents);
        let Some(answerer) = &self.answerer else {
            return mock_analysis(query, combined.chars().count());
        };

        let mut context = String::new();
        if self.retrieval.enabled {
            for doc in documents {
                match self.ingest(doc) {
                    Ok(chunks) => debug!(doc_id = %doc.id, chunks, "ingested"),
                    Err(e) => warn!(doc_id = %doc.id, error = %e, "document left unindexed"),
                }
            }
            debug!(indexed = ?self.index.doc_ids(), "retrieving");
            context = self.retrieve_context(documents, query);
        }
        if context.trim().is_empty() {
            debug!("falling back to the full document text as context");
            context = combined;
        }
        answerer.answer(query, &context, self.answer.context_budget_chars)
    }
}

/// Every document's text under a `--- Content from {file} ---` header.
pub fn combined_text(documents: &[Document]) -> String {
    documents.iter().map(|d| format!("\n--- Content from {} ---\n{}\n", d.file_name, d.text)).collect()
}
