//! Per-document lexical index.
//!
//! Each document gets its own TF-IDF space fitted over its chunks, where every
//! chunk counts as one "document" for IDF purposes. Entries are swapped in
//! whole, so readers see either the old or the new index, never a mix.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use privylex_core::{Chunk, IndexError};

use crate::analyzer::Analyzer;

type TermId = u32;

/// Sparse, L2-normalized term weights sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
	entries: Vec<(TermId, f32)>,
}

impl SparseVector {
	fn from_counts(counts: BTreeMap<TermId, u32>, idf: &[f32]) -> Self {
		let mut entries: Vec<(TermId, f32)> =
			counts.into_iter().map(|(t, tf)| (t, tf as f32 * idf[t as usize])).collect();
		let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
		if norm > 0.0 {
			for (_, w) in &mut entries {
				*w /= norm;
			}
		}
		Self { entries }
	}

	pub fn is_zero(&self) -> bool {
		self.entries.is_empty()
	}

	/// Cosine similarity; both sides are already unit length.
	pub fn dot(&self, other: &Self) -> f32 {
		let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
		while i < self.entries.len() && j < other.entries.len() {
			let (a, wa) = self.entries[i];
			let (b, wb) = other.entries[j];
			match a.cmp(&b) {
				std::cmp::Ordering::Less => i += 1,
				std::cmp::Ordering::Greater => j += 1,
				std::cmp::Ordering::Equal => {
					sum += wa * wb;
					i += 1;
					j += 1;
				}
			}
		}
		sum
	}
}

/// A query vectorized against one specific fitted space.
#[derive(Debug, Clone)]
pub struct QueryVector {
	space_id: u64,
	vector: SparseVector,
}

impl QueryVector {
	pub fn space_id(&self) -> u64 {
		self.space_id
	}

	pub fn is_zero(&self) -> bool {
		self.vector.is_zero()
	}
}

/// Vocabulary, IDF weights and one vector per chunk.
#[derive(Debug)]
pub struct LexicalSpace {
	id: u64,
	vocabulary: HashMap<String, TermId>,
	idf: Vec<f32>,
	vectors: Vec<SparseVector>,
}

impl LexicalSpace {
	fn fit(id: u64, doc_id: &str, analyzer: &Analyzer, chunks: &[Chunk]) -> Result<Self, IndexError> {
		if chunks.is_empty() {
			return Err(IndexError::EmptyChunks { doc_id: doc_id.to_string() });
		}
		let tokenized: Vec<Vec<String>> = chunks.iter().map(|c| analyzer.terms(&c.content)).collect();
		let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
		if terms.is_empty() {
			return Err(IndexError::EmptyVocabulary { doc_id: doc_id.to_string() });
		}
		let vocabulary: HashMap<String, TermId> =
			terms.iter().enumerate().map(|(i, t)| ((*t).to_string(), i as TermId)).collect();

		let mut df = vec![0u32; vocabulary.len()];
		let counts: Vec<BTreeMap<TermId, u32>> = tokenized
			.iter()
			.map(|tokens| {
				let mut tf = BTreeMap::new();
				for token in tokens {
					*tf.entry(vocabulary[token.as_str()]).or_insert(0u32) += 1;
				}
				for term in tf.keys() {
					df[*term as usize] += 1;
				}
				tf
			})
			.collect();

		// smoothed idf: ln((1 + n) / (1 + df)) + 1
		let n = chunks.len() as f32;
		let idf: Vec<f32> = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();
		let vectors = counts.into_iter().map(|c| SparseVector::from_counts(c, &idf)).collect();
		Ok(Self { id, vocabulary, idf, vectors })
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn vocabulary_len(&self) -> usize {
		self.vocabulary.len()
	}

	/// Weight `query` with this space's vocabulary and IDF. Unknown terms are ignored.
	pub fn vectorize(&self, analyzer: &Analyzer, query: &str) -> QueryVector {
		let mut counts = BTreeMap::new();
		for term in analyzer.terms(query) {
			if let Some(&id) = self.vocabulary.get(&term) {
				*counts.entry(id).or_insert(0u32) += 1;
			}
		}
		QueryVector { space_id: self.id, vector: SparseVector::from_counts(counts, &self.idf) }
	}

	/// Similarity of `query` to every chunk, in chunk order.
	///
	/// A query from another space scores nothing.
	pub fn similarities(&self, query: &QueryVector) -> Vec<f32> {
		if query.space_id() != self.id {
			warn!(query_space = query.space_id(), space = self.id, "query vector does not belong to this index");
			return Vec::new();
		}
		self.vectors.iter().map(|v| v.dot(&query.vector)).collect()
	}
}

/// A fitted document: its chunks and the space built over them.
#[derive(Debug)]
pub struct IndexedDocument {
	pub doc_id: String,
	pub chunks: Vec<Chunk>,
	pub space: LexicalSpace,
}

/// Owns every document's chunk sequence and fitted space, keyed by id.
pub struct DocumentIndex {
	analyzer: Analyzer,
	entries: RwLock<HashMap<String, Arc<IndexedDocument>>>,
	next_space: AtomicU64,
}

impl Default for DocumentIndex {
	fn default() -> Self {
		Self::new()
	}
}

impl DocumentIndex {
	pub fn new() -> Self {
		Self::with_analyzer(Analyzer::english())
	}

	pub fn with_analyzer(analyzer: Analyzer) -> Self {
		Self { analyzer, entries: RwLock::new(HashMap::new()), next_space: AtomicU64::new(1) }
	}

	pub fn analyzer(&self) -> &Analyzer {
		&self.analyzer
	}

	/// Fit `chunks` for `doc_id`, replacing any previous entry.
	///
	/// On failure the document is left unindexed: any previous entry is removed.
	/// Fits of the same id race by space id: an attempt never replaces or
	/// removes an entry produced by a fit that started after it.
	pub fn fit(&self, doc_id: &str, chunks: Vec<Chunk>) -> Result<(), IndexError> {
		let space_id = self.next_space.fetch_add(1, Ordering::Relaxed);
		match LexicalSpace::fit(space_id, doc_id, &self.analyzer, &chunks) {
			Ok(space) => {
				info!(doc_id, chunks = chunks.len(), space = space.id(), terms = space.vocabulary_len(), "indexed document");
				self.install(Arc::new(IndexedDocument { doc_id: doc_id.to_string(), chunks, space }));
				Ok(())
			}
			Err(e) => {
				warn!(doc_id, error = %e, "indexing failed, document left unindexed");
				self.discard_older(doc_id, space_id);
				Err(e)
			}
		}
	}

	fn install(&self, entry: Arc<IndexedDocument>) {
		let mut entries = self.write();
		match entries.get(&entry.doc_id) {
			Some(current) if current.space.id() > entry.space.id() => {
				debug!(doc_id = %entry.doc_id, space = entry.space.id(), current = current.space.id(), "newer fit already installed");
			}
			_ => {
				entries.insert(entry.doc_id.clone(), entry);
			}
		}
	}

	fn discard_older(&self, doc_id: &str, space_id: u64) -> bool {
		let mut entries = self.write();
		match entries.get(doc_id) {
			Some(current) if current.space.id() < space_id => entries.remove(doc_id).is_some(),
			_ => false,
		}
	}

	/// Returns whether an entry was removed.
	pub fn clear(&self, doc_id: &str) -> bool {
		let removed = self.write().remove(doc_id).is_some();
		debug!(doc_id, removed, "cleared document");
		removed
	}

	pub fn clear_all(&self) {
		self.write().clear();
		debug!("cleared all documents");
	}

	pub fn get(&self, doc_id: &str) -> Option<Arc<IndexedDocument>> {
		self.read().get(doc_id).cloned()
	}

	pub fn contains(&self, doc_id: &str) -> bool {
		self.read().contains_key(doc_id)
	}

	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn doc_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.read().keys().cloned().collect();
		ids.sort();
		ids
	}

	fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<IndexedDocument>>> {
		self.entries.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<IndexedDocument>>> {
		self.entries.write().unwrap_or_else(PoisonError::into_inner)
	}
}
