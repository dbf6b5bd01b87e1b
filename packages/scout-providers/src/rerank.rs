// crates.io
use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::CrossEncoderModel;

/// Scores every `(query, doc)` pair in one request. Scores come back aligned with `docs`.
pub async fn rerank(
	client: &Client,
	cfg: &scout_config::ProviderConfig,
	query: &str,
	docs: &[String],
) -> Result<Vec<f32>> {
	let model = CrossEncoderModel::from_name(&cfg.model);
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": model.repo_id(),
		"query": query,
		"documents": docs,
		"texts": docs,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	parse_rerank_response(json, docs.len())
}

fn parse_rerank_response(json: Value, doc_count: usize) -> Result<Vec<f32>> {
	let mut scores: Vec<Option<f32>> = vec![None; doc_count];
	let results = json
		.as_array()
		.or_else(|| json.get("results").and_then(|v| v.as_array()))
		.or_else(|| json.get("data").and_then(|v| v.as_array()))
		.ok_or_else(|| eyre::eyre!("Rerank response is missing results array."))?;

	for item in results {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.ok_or_else(|| eyre::eyre!("Rerank result missing index."))? as usize;
		let score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| eyre::eyre!("Rerank result missing score."))? as f32;
		let Some(slot) = scores.get_mut(index) else {
			return Err(eyre::eyre!("Rerank result index {index} is out of range."));
		};
		*slot = Some(score);
	}

	scores
		.into_iter()
		.enumerate()
		.map(|(index, score)| {
			score.ok_or_else(|| eyre::eyre!("Rerank response has no score for document {index}."))
		})
		.collect()
}
