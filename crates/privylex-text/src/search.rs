use tracing::debug;

use privylex_core::config::RetrievalConfig;
use privylex_core::{ConfigurationError, RetrievedChunk};

use crate::index::DocumentIndex;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Ranks a document's chunks against a query and assembles the context.
pub struct Retriever<'a> {
	index: &'a DocumentIndex,
	config: RetrievalConfig,
}

impl<'a> Retriever<'a> {
	pub fn new(index: &'a DocumentIndex, config: RetrievalConfig) -> Result<Self, ConfigurationError> {
		config.validate()?;
		Ok(Self { index, config })
	}

	/// Top chunks for `query`, best first, all scoring above the relevance floor.
	///
	/// Unknown or cleared documents yield no hits.
	pub fn search(&self, doc_id: &str, query: &str) -> Vec<RetrievedChunk> {
		self.search_with(doc_id, query, self.config.top_n, self.config.relevance_floor)
	}

	pub fn search_with(&self, doc_id: &str, query: &str, top_n: usize, relevance_floor: f32) -> Vec<RetrievedChunk> {
		let Some(doc) = self.index.get(doc_id) else {
			debug!(doc_id, "no index for document");
			return Vec::new();
		};
		let query_vec = doc.space.vectorize(self.index.analyzer(), query);
		if query_vec.is_zero() {
			debug!(doc_id = %doc.doc_id, "query shares no terms with document");
			return Vec::new();
		}
		let scores = doc.space.similarities(&query_vec);

		let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
		// descending score, earliest chunk first on ties
		ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		ranked.truncate(top_n.min(doc.chunks.len()));

		let hits: Vec<RetrievedChunk> = ranked
			.into_iter()
			.filter(|&(_, score)| score > relevance_floor)
			.map(|(i, score)| RetrievedChunk { chunk_index: i, score, content: doc.chunks[i].content.clone() })
			.collect();
		debug!(doc_id = %doc.doc_id, hits = hits.len(), top = hits.first().map(|h| h.score), "ranked chunks");
		hits
	}

	/// Joined context string; empty when nothing clears the floor.
	pub fn retrieve(&self, doc_id: &str, query: &str) -> String {
		join_hits(&self.search(doc_id, query))
	}

	pub fn retrieve_with(&self, doc_id: &str, query: &str, top_n: usize, relevance_floor: f32) -> String {
		join_hits(&self.search_with(doc_id, query, top_n, relevance_floor))
	}
}

fn join_hits(hits: &[RetrievedChunk]) -> String {
	hits.iter().map(|h| h.content.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}
