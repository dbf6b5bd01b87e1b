//! Deterministic in-process model doubles.
//!
//! Every double derives its output from the lexical tokenizer, so results depend only on the
//! input text and never on network state.

use std::{
	collections::{BTreeSet, HashSet},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;

use scout_service::{BoxFuture, EmbeddingProvider, ModelContext, RerankProvider};

pub const DEFAULT_HASH_DIM: usize = 256;

/// Offline context used by the eval harness and HTTP tests.
pub fn offline_models() -> ModelContext {
	ModelContext::new(
		Arc::new(HashingEncoder::new(DEFAULT_HASH_DIM)),
		Arc::new(OverlapCrossEncoder),
	)
}

/// Bag-of-words encoder hashing each token into one of `dim` buckets.
#[derive(Clone, Debug)]
pub struct HashingEncoder {
	dim: usize,
}
impl HashingEncoder {
	pub fn new(dim: usize) -> Self {
		Self { dim: dim.max(1) }
	}

	pub fn encode(&self, text: &str) -> Vec<f32> {
		let mut vector = vec![0.0; self.dim];

		for token in scout_domain::tokenize(text) {
			let hash = blake3::hash(token.as_bytes());
			let mut bytes = [0_u8; 8];

			bytes.copy_from_slice(&hash.as_bytes()[..8]);

			vector[(u64::from_le_bytes(bytes) % self.dim as u64) as usize] += 1.0;
		}

		vector
	}
}
impl Default for HashingEncoder {
	fn default() -> Self {
		Self::new(DEFAULT_HASH_DIM)
	}
}
impl EmbeddingProvider for HashingEncoder {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|text| self.encode(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Collision-free bag-of-words encoder: one dimension per vocabulary lemma.
///
/// Tokens outside the vocabulary are ignored, so a text sharing no vocabulary term encodes to
/// the zero vector.
#[derive(Clone, Debug)]
pub struct VocabularyEncoder {
	vocabulary: Vec<String>,
}
impl VocabularyEncoder {
	pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
		let vocabulary: BTreeSet<String> =
			texts.iter().flat_map(|text| scout_domain::tokenize(text.as_ref())).collect();

		Self { vocabulary: vocabulary.into_iter().collect() }
	}

	pub fn dimensions(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn encode(&self, text: &str) -> Vec<f32> {
		let mut vector = vec![0.0; self.vocabulary.len()];

		for token in scout_domain::tokenize(text) {
			if let Ok(idx) = self.vocabulary.binary_search(&token) {
				vector[idx] += 1.0;
			}
		}

		vector
	}
}
impl EmbeddingProvider for VocabularyEncoder {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|text| self.encode(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Scores a pair by the number of distinct query lemmas present in the document.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlapCrossEncoder;
impl OverlapCrossEncoder {
	pub fn score(query: &str, doc: &str) -> f32 {
		let query: HashSet<String> = scout_domain::tokenize(query).into_iter().collect();
		let doc: HashSet<String> = scout_domain::tokenize(doc).into_iter().collect();

		query.intersection(&doc).count() as f32
	}
}
impl RerankProvider for OverlapCrossEncoder {
	fn rerank<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		let scores = docs.iter().map(|doc| Self::score(query, doc)).collect();

		Box::pin(async move { Ok(scores) })
	}
}

/// Returns one preset score per document position.
#[derive(Clone, Debug)]
pub struct FixedScores(pub Vec<f32>);
impl RerankProvider for FixedScores {
	fn rerank<'a>(
		&'a self,
		_query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		let scores = self.0.iter().copied().take(docs.len()).collect();

		Box::pin(async move { Ok(scores) })
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(eyre::eyre!("Embedding model is offline.")) })
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FailingRerank;
impl RerankProvider for FailingRerank {
	fn rerank<'a>(
		&'a self,
		_query: &'a str,
		_docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move { Err(eyre::eyre!("Rerank model is offline.")) })
	}
}

/// Wraps a provider and counts how many batches reach it.
pub struct Counting<P> {
	pub inner: P,
	pub calls: Arc<AtomicUsize>,
}
impl<P> Counting<P> {
	pub fn new(inner: P) -> Self {
		Self { inner, calls: Arc::new(AtomicUsize::new(0)) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl<P> EmbeddingProvider for Counting<P>
where
	P: EmbeddingProvider,
{
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		self.inner.embed(texts)
	}
}
impl<P> RerankProvider for Counting<P>
where
	P: RerankProvider,
{
	fn rerank<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		self.inner.rerank(query, docs)
	}
}
