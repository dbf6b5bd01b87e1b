use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};

use scout_domain::Document;
use scout_service::{Funnel, ModelContext, SearchParams};

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", required_unless_present = "offline")]
	pub config: Option<PathBuf>,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, value_name = "N")]
	pub top_k: Option<usize>,
	/// Score with deterministic in-process models instead of the configured endpoints.
	#[arg(long)]
	pub offline: bool,
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub documents: Vec<Document>,
	pub queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
pub struct EvalQuery {
	pub id: Option<String>,
	pub query: String,
	pub expected_urls: Vec<String>,
	pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub query_count: usize,
	pub document_count: usize,
	pub dropped_documents: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config_path: Option<String>,
	pub offline: bool,
	pub alpha: f32,
	pub stage1_cutoff: usize,
	pub stage2_cutoff: usize,
	pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub avg_recall_at_k: f64,
	pub avg_precision_at_k: f64,
	pub mean_rr: f64,
	pub mean_ndcg: f64,
	pub latency_ms_p50: f64,
	pub latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
	pub id: String,
	pub query: String,
	pub expected_count: usize,
	pub retrieved_count: usize,
	pub relevant_count: usize,
	pub recall_at_k: f64,
	pub precision_at_k: f64,
	pub rr: f64,
	pub ndcg: f64,
	pub latency_ms: f64,
	pub expected_urls: Vec<String>,
	pub retrieved_urls: Vec<String>,
}

struct Metrics {
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	relevant_count: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = args.config.as_deref().map(scout_config::load).transpose()?;
	let log_level = config.as_ref().map(|cfg| cfg.service.log_level.as_str()).unwrap_or("info");

	scout_cli::init_tracing(log_level);

	let funnel_cfg = config.as_ref().map(|cfg| cfg.funnel.clone()).unwrap_or_default();
	let models = match (&config, args.offline) {
		(_, true) => scout_testkit::offline_models(),
		(Some(cfg), false) => ModelContext::from_config(&cfg.providers)?,
		(None, false) => return Err(eyre::eyre!("--config is required unless --offline is set.")),
	};
	let mut params = SearchParams::from_config(&funnel_cfg);

	if let Some(top_k) = args.top_k {
		params.top_k = top_k;
	}

	let dataset = load_dataset(&args.dataset)?;
	let mut output = evaluate(&Funnel::new(&models), dataset, &params).await?;

	output.settings.config_path = args.config.as_ref().map(|path| path.display().to_string());
	output.settings.offline = args.offline;

	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

/// Runs every dataset query through `funnel` and scores the results against expected urls.
pub async fn evaluate(
	funnel: &Funnel,
	dataset: EvalDataset,
	params: &SearchParams,
) -> color_eyre::Result<EvalOutput> {
	let (documents, dropped) = scout_domain::retain_usable(dataset.documents);

	if dropped > 0 {
		tracing::warn!(
			dropped,
			kept = documents.len(),
			"Dropped documents with placeholder fields."
		);
	}

	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (index, query) in dataset.queries.iter().enumerate() {
		let mut query_params = params.clone();

		if let Some(top_k) = query.top_k {
			query_params.top_k = top_k;
		}

		let start = Instant::now();
		let ranked = funnel.search_documents(&query.query, &documents, &query_params).await?;
		let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
		let retrieved = unique_urls(&ranked);
		let expected: HashSet<&str> = query.expected_urls.iter().map(String::as_str).collect();
		let metrics = compute_metrics(&retrieved, &expected);

		tracing::debug!(index, recall = metrics.recall_at_k, "Query evaluated.");

		reports.push(QueryReport {
			id: query.id.clone().unwrap_or_else(|| format!("q{index}")),
			query: query.query.clone(),
			expected_count: expected.len(),
			retrieved_count: retrieved.len(),
			relevant_count: metrics.relevant_count,
			recall_at_k: metrics.recall_at_k,
			precision_at_k: metrics.precision_at_k,
			rr: metrics.rr,
			ndcg: metrics.ndcg,
			latency_ms,
			expected_urls: query.expected_urls.clone(),
			retrieved_urls: retrieved,
		});
		latencies_ms.push(latency_ms);
	}

	let summary = summarize(&reports, &latencies_ms);

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
			document_count: documents.len(),
			dropped_documents: dropped,
		},
		settings: EvalSettings {
			config_path: None,
			offline: false,
			alpha: params.alpha,
			stage1_cutoff: params.stage1_cutoff,
			stage2_cutoff: params.stage2_cutoff,
			top_k: params.top_k,
		},
		summary,
		queries: reports,
	})
}

fn unique_urls(documents: &[Document]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for doc in documents {
		if seen.insert(doc.url.as_str()) {
			out.push(doc.url.clone());
		}
	}

	out
}

fn compute_metrics(retrieved: &[String], expected: &HashSet<&str>) -> Metrics {
	let mut relevant_count = 0_usize;
	let mut dcg = 0.0_f64;
	let mut first_hit: Option<usize> = None;

	for (idx, url) in retrieved.iter().enumerate() {
		if !expected.contains(url.as_str()) {
			continue;
		}

		let rank = idx + 1;

		relevant_count += 1;
		dcg += 1.0 / (rank as f64 + 1.0).log2();

		if first_hit.is_none() {
			first_hit = Some(rank);
		}
	}

	let rr = first_hit.map(|rank| 1.0 / rank as f64).unwrap_or(0.0);
	let idcg: f64 = (1..=expected.len().min(retrieved.len()))
		.map(|rank| 1.0 / (rank as f64 + 1.0).log2())
		.sum();
	let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };
	let precision_at_k =
		if retrieved.is_empty() { 0.0 } else { relevant_count as f64 / retrieved.len() as f64 };
	let recall_at_k =
		if expected.is_empty() { 0.0 } else { relevant_count as f64 / expected.len() as f64 };

	Metrics { recall_at_k, precision_at_k, rr, ndcg, relevant_count }
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	EvalSummary {
		avg_recall_at_k: reports.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		avg_precision_at_k: reports.iter().map(|r| r.precision_at_k).sum::<f64>() / count,
		mean_rr: reports.iter().map(|r| r.rr).sum::<f64>() / count,
		mean_ndcg: reports.iter().map(|r| r.ndcg).sum::<f64>() / count,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

/// Linear interpolation over an ascending slice.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let pos = percentile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}
