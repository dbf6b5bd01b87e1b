pub mod dense;
pub mod funnel;
pub mod hybrid;
pub mod lexical;
pub mod rerank;
pub mod scoring;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;

pub use dense::DenseRetriever;
pub use error::{Error, Result};
pub use funnel::{Funnel, SearchOutcome, SearchParams, SearchTrace, Stage, StageReport};
pub use hybrid::{HybridRetriever, HybridScores};
pub use lexical::{Bm25Index, Bm25Params};
pub use rerank::Reranker;
pub use scoring::Selection;
use scout_config::{EmbeddingProviderConfig, ProviderConfig};
use scout_domain::Document;
use scout_providers::{embedding, rerank as rerank_provider};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sentence encoder mapping texts to fixed-width vectors, one vector per input, in order.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(&'a self, texts: &'a [String])
	-> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Cross-encoder scoring `(query, doc)` pairs jointly, one score per doc, in order.
pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

/// Loaded models shared by every funnel invocation. Build once at startup and clone freely.
#[derive(Clone)]
pub struct ModelContext {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}
impl ModelContext {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>) -> Self {
		Self { embedding, rerank }
	}

	pub fn from_config(cfg: &scout_config::Providers) -> color_eyre::Result<Self> {
		let embedding = HttpEmbedding::new(cfg.embedding.clone())?;
		let rerank = HttpRerank::new(cfg.rerank.clone())?;

		tracing::info!(
			encoder = scout_providers::EncoderModel::from_name(&cfg.embedding.model).repo_id(),
			cross_encoder =
				scout_providers::CrossEncoderModel::from_name(&cfg.rerank.model).repo_id(),
			"Model context ready."
		);

		Ok(Self::new(Arc::new(embedding), Arc::new(rerank)))
	}
}

pub struct HttpEmbedding {
	client: Client,
	cfg: EmbeddingProviderConfig,
}
impl HttpEmbedding {
	pub fn new(cfg: EmbeddingProviderConfig) -> color_eyre::Result<Self> {
		Ok(Self { client: scout_providers::build_client(cfg.timeout_ms)?, cfg })
	}
}
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(&self.client, &self.cfg, texts))
	}
}

pub struct HttpRerank {
	client: Client,
	cfg: ProviderConfig,
}
impl HttpRerank {
	pub fn new(cfg: ProviderConfig) -> color_eyre::Result<Self> {
		Ok(Self { client: scout_providers::build_client(cfg.timeout_ms)?, cfg })
	}
}
impl RerankProvider for HttpRerank {
	fn rerank<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(rerank_provider::rerank(&self.client, &self.cfg, query, docs))
	}
}

/// Runs the full funnel with explicit cutoffs and returns documents best-first.
pub async fn search(
	models: &ModelContext,
	query: &str,
	documents: &[Document],
	alpha: f32,
	top_k: usize,
	stage1_cutoff: usize,
	stage2_cutoff: usize,
) -> Result<Vec<Document>> {
	let params = SearchParams { alpha, top_k, stage1_cutoff, stage2_cutoff, title_cutoff: None };

	Funnel::new(models).search_documents(query, documents, &params).await
}

/// Encodes the query together with `texts` in a single batch.
pub(crate) async fn encode_with_query(
	provider: &dyn EmbeddingProvider,
	query: &str,
	texts: &[String],
) -> Result<(Vec<f32>, Vec<Vec<f32>>)> {
	let mut batch = Vec::with_capacity(texts.len() + 1);

	batch.push(query.to_string());
	batch.extend(texts.iter().cloned());

	let mut vectors = provider.embed(&batch).await?;

	if vectors.len() != batch.len() {
		return Err(Error::model(format!(
			"Embedding provider returned {} vectors for {} texts.",
			vectors.len(),
			batch.len()
		)));
	}

	let refs = vectors.split_off(1);
	let Some(query_vec) = vectors.pop() else {
		return Err(Error::model("Embedding provider returned no query vector."));
	};

	Ok((query_vec, refs))
}
