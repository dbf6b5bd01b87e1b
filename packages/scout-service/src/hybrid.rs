//! Stage 1: lexical and semantic fusion.
//!
//! The lexical leg indexes `title + "\n" + abstract` while the semantic leg embeds titles only.

use std::sync::Arc;

use scout_domain::Document;

use crate::{
	EmbeddingProvider, Error, Result, Selection, encode_with_query,
	lexical::Bm25Index,
	scoring::{self, cosine_similarities, ensure_alpha, ensure_top_k, min_max_normalize},
};

/// Raw and fused score vectors of one hybrid pass, all parallel to the input documents.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridScores {
	pub lexical: Vec<f32>,
	pub semantic: Vec<f32>,
	pub fused: Vec<f32>,
}

#[derive(Clone)]
pub struct HybridRetriever {
	embedding: Arc<dyn EmbeddingProvider>,
}
impl HybridRetriever {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	/// Selects the `top_k` best documents by fused score. Inputs already within `top_k` pass
	/// through without indexing or encoding.
	pub async fn run(
		&self,
		query: &str,
		titles: &[String],
		abstracts: &[String],
		alpha: f32,
		top_k: usize,
	) -> Result<Selection> {
		ensure_alpha(alpha)?;
		ensure_top_k(top_k, "top_k")?;

		ensure_columns(titles, abstracts)?;

		if titles.len() <= top_k {
			tracing::debug!(count = titles.len(), top_k, "Hybrid stage passes input through.");

			return Ok(Selection::pass_through(titles.len()));
		}

		let scores = self.score(query, titles, abstracts, alpha).await?;

		Ok(Selection::top_k(&scores.fused, top_k))
	}

	/// Computes every leg for the whole batch without selecting.
	pub async fn score(
		&self,
		query: &str,
		titles: &[String],
		abstracts: &[String],
		alpha: f32,
	) -> Result<HybridScores> {
		ensure_alpha(alpha)?;
		ensure_columns(titles, abstracts)?;

		let texts: Vec<String> = titles
			.iter()
			.zip(abstracts)
			.map(|(title, abstract_text)| format!("{title}\n{abstract_text}"))
			.collect();
		let index = Bm25Index::from_texts(&texts);
		let lexical = index.score_query(query);
		let (query_vec, title_vecs) =
			encode_with_query(self.embedding.as_ref(), query, titles).await?;
		let semantic = cosine_similarities(&query_vec, &title_vecs)?;
		let fused =
			scoring::fuse(alpha, &min_max_normalize(&lexical), &min_max_normalize(&semantic))?;

		Ok(HybridScores { lexical, semantic, fused })
	}

	pub async fn retrieve<'a>(
		&self,
		query: &str,
		documents: &[&'a Document],
		alpha: f32,
		top_k: usize,
	) -> Result<Vec<&'a Document>> {
		ensure_alpha(alpha)?;
		ensure_top_k(top_k, "top_k")?;

		if documents.len() <= top_k {
			return Ok(documents.to_vec());
		}

		let titles: Vec<String> = documents.iter().map(|doc| doc.title.clone()).collect();
		let abstracts: Vec<String> =
			documents.iter().map(|doc| doc.abstract_text.clone()).collect();
		let selection = self.run(query, &titles, &abstracts, alpha, top_k).await?;

		Ok(selection.pick(documents))
	}
}

fn ensure_columns(titles: &[String], abstracts: &[String]) -> Result<()> {
	if titles.len() != abstracts.len() {
		return Err(Error::invalid(format!(
			"Got {} titles but {} abstracts.",
			titles.len(),
			abstracts.len()
		)));
	}

	Ok(())
}
