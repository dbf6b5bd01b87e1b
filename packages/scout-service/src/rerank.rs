//! Stage 3: pairwise relevance ordering.
//!
//! Always re-scores its input, even when it is already within `top_k`, so the final order
//! reflects the cross-encoder rather than upstream order.

use std::sync::Arc;

use scout_domain::Document;

use crate::{Error, RerankProvider, Result, Selection, scoring::ensure_top_k};

#[derive(Clone)]
pub struct Reranker {
	rerank: Arc<dyn RerankProvider>,
}
impl Reranker {
	pub fn new(rerank: Arc<dyn RerankProvider>) -> Self {
		Self { rerank }
	}

	pub async fn run(&self, query: &str, texts: &[String], top_k: usize) -> Result<Selection> {
		ensure_top_k(top_k, "top_k")?;

		if texts.is_empty() {
			return Ok(Selection::top_k(&[], top_k));
		}

		let scores = self.rerank.rerank(query, texts).await?;

		if scores.len() != texts.len() {
			return Err(Error::model(format!(
				"Rerank provider returned {} scores for {} documents.",
				scores.len(),
				texts.len()
			)));
		}

		Ok(Selection::top_k(&scores, top_k))
	}

	pub async fn rerank_documents<'a>(
		&self,
		query: &str,
		documents: &[&'a Document],
		top_k: usize,
	) -> Result<Vec<&'a Document>> {
		let texts: Vec<String> = documents.iter().map(|doc| doc.title_and_abstract()).collect();
		let selection = self.run(query, &texts, top_k).await?;

		Ok(selection.pick(documents))
	}
}
