//! Funnel orchestration: hybrid, then dense, then rerank.

use std::time::Instant;

use serde::Serialize;

use scout_domain::Document;

use crate::{
	DenseRetriever, HybridRetriever, ModelContext, Reranker, Result,
	scoring::{ensure_alpha, ensure_top_k},
};

/// Per-invocation knobs. Cutoffs are independent of `top_k` and of each other.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
	pub alpha: f32,
	pub top_k: usize,
	pub stage1_cutoff: usize,
	pub stage2_cutoff: usize,
	/// Inserts a title-only dense pass between stage 1 and stage 2 when set.
	pub title_cutoff: Option<usize>,
}
impl SearchParams {
	pub fn from_config(cfg: &scout_config::Funnel) -> Self {
		Self {
			alpha: cfg.alpha,
			top_k: cfg.top_k as usize,
			stage1_cutoff: cfg.stage1_cutoff as usize,
			stage2_cutoff: cfg.stage2_cutoff as usize,
			title_cutoff: cfg.title_cutoff.map(|cutoff| cutoff as usize),
		}
	}

	pub fn validate(&self) -> Result<()> {
		ensure_alpha(self.alpha)?;
		ensure_top_k(self.top_k, "top_k")?;
		ensure_top_k(self.stage1_cutoff, "stage1_cutoff")?;
		ensure_top_k(self.stage2_cutoff, "stage2_cutoff")?;

		if let Some(cutoff) = self.title_cutoff {
			ensure_top_k(cutoff, "title_cutoff")?;
		}

		Ok(())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	Hybrid,
	DenseTitle,
	Dense,
	Rerank,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hybrid => "hybrid",
			Self::DenseTitle => "dense_title",
			Self::Dense => "dense",
			Self::Rerank => "rerank",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageReport {
	pub stage: Stage,
	pub input_count: usize,
	pub output_count: usize,
	pub pass_through: bool,
	pub elapsed_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchTrace {
	pub stages: Vec<StageReport>,
}
impl SearchTrace {
	pub fn output_count(&self, stage: Stage) -> Option<usize> {
		self.stages.iter().find(|report| report.stage == stage).map(|report| report.output_count)
	}

	fn record(
		&mut self,
		stage: Stage,
		input_count: usize,
		output_count: usize,
		pass_through: bool,
		started: Instant,
	) {
		let elapsed_ms = started.elapsed().as_millis() as u64;

		tracing::info!(
			stage = stage.as_str(),
			input_count,
			output_count,
			pass_through,
			elapsed_ms,
			"Funnel stage finished."
		);

		self.stages.push(StageReport {
			stage,
			input_count,
			output_count,
			pass_through,
			elapsed_ms,
		});
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchOutcome {
	pub documents: Vec<Document>,
	pub trace: SearchTrace,
}

/// The three-stage retrieval funnel over one shared [`ModelContext`].
#[derive(Clone)]
pub struct Funnel {
	hybrid: HybridRetriever,
	dense: DenseRetriever,
	reranker: Reranker,
}
impl Funnel {
	pub fn new(models: &ModelContext) -> Self {
		Self {
			hybrid: HybridRetriever::new(models.embedding.clone()),
			dense: DenseRetriever::new(models.embedding.clone()),
			reranker: Reranker::new(models.rerank.clone()),
		}
	}

	pub fn hybrid(&self) -> &HybridRetriever {
		&self.hybrid
	}

	pub fn dense(&self) -> &DenseRetriever {
		&self.dense
	}

	pub fn reranker(&self) -> &Reranker {
		&self.reranker
	}

	/// Ranks `documents` for `query`, best-first, at most `params.top_k` long.
	///
	/// Parameters are checked before anything else. An empty batch returns immediately without
	/// touching any model. A failing stage aborts the whole call.
	pub async fn search(
		&self,
		query: &str,
		documents: &[Document],
		params: &SearchParams,
	) -> Result<SearchOutcome> {
		params.validate()?;

		let mut trace = SearchTrace::default();

		if documents.is_empty() {
			tracing::debug!("Funnel received no documents.");

			return Ok(SearchOutcome { documents: Vec::new(), trace });
		}

		let candidates: Vec<&Document> = documents.iter().collect();
		let started = Instant::now();
		let candidates =
			self.hybrid.retrieve(query, &candidates, params.alpha, params.stage1_cutoff).await?;

		trace.record(
			Stage::Hybrid,
			documents.len(),
			candidates.len(),
			documents.len() <= params.stage1_cutoff,
			started,
		);

		let candidates = match params.title_cutoff {
			Some(cutoff) => {
				let input_count = candidates.len();
				let started = Instant::now();
				let narrowed = self.dense.retrieve_by_title(query, &candidates, cutoff).await?;

				trace.record(
					Stage::DenseTitle,
					input_count,
					narrowed.len(),
					input_count <= cutoff,
					started,
				);

				narrowed
			},
			None => candidates,
		};
		let input_count = candidates.len();
		let started = Instant::now();
		let candidates = self
			.dense
			.retrieve_by_title_and_abstract(query, &candidates, params.stage2_cutoff)
			.await?;

		trace.record(
			Stage::Dense,
			input_count,
			candidates.len(),
			input_count <= params.stage2_cutoff,
			started,
		);

		let input_count = candidates.len();
		let started = Instant::now();
		let ranked = self.reranker.rerank_documents(query, &candidates, params.top_k).await?;

		trace.record(Stage::Rerank, input_count, ranked.len(), false, started);

		Ok(SearchOutcome { documents: ranked.into_iter().cloned().collect(), trace })
	}

	pub async fn search_documents(
		&self,
		query: &str,
		documents: &[Document],
		params: &SearchParams,
	) -> Result<Vec<Document>> {
		Ok(self.search(query, documents, params).await?.documents)
	}
}
