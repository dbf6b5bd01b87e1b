//! Stage 2: embedding-only re-ranking.

use std::sync::Arc;

use scout_domain::Document;

use crate::{
	EmbeddingProvider, Result, Selection, encode_with_query,
	scoring::{cosine_similarities, ensure_top_k},
};

#[derive(Clone)]
pub struct DenseRetriever {
	embedding: Arc<dyn EmbeddingProvider>,
}
impl DenseRetriever {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	pub async fn run(&self, query: &str, texts: &[String], top_k: usize) -> Result<Selection> {
		ensure_top_k(top_k, "top_k")?;

		if texts.len() <= top_k {
			tracing::debug!(count = texts.len(), top_k, "Dense stage passes input through.");

			return Ok(Selection::pass_through(texts.len()));
		}

		let scores = self.similarities(query, texts).await?;

		Ok(Selection::top_k(&scores, top_k))
	}

	/// Cosine similarity of the query against every text, in input order.
	pub async fn similarities(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
		let (query_vec, text_vecs) =
			encode_with_query(self.embedding.as_ref(), query, texts).await?;

		cosine_similarities(&query_vec, &text_vecs)
	}

	pub async fn retrieve_by_title<'a>(
		&self,
		query: &str,
		documents: &[&'a Document],
		cutoff: usize,
	) -> Result<Vec<&'a Document>> {
		let texts: Vec<String> = documents.iter().map(|doc| doc.title.clone()).collect();

		self.retrieve_texts(query, documents, &texts, cutoff).await
	}

	pub async fn retrieve_by_title_and_abstract<'a>(
		&self,
		query: &str,
		documents: &[&'a Document],
		top_k: usize,
	) -> Result<Vec<&'a Document>> {
		let texts: Vec<String> = documents.iter().map(|doc| doc.title_and_abstract()).collect();

		self.retrieve_texts(query, documents, &texts, top_k).await
	}

	async fn retrieve_texts<'a>(
		&self,
		query: &str,
		documents: &[&'a Document],
		texts: &[String],
		top_k: usize,
	) -> Result<Vec<&'a Document>> {
		let selection = self.run(query, texts, top_k).await?;

		Ok(selection.pick(documents))
	}
}
