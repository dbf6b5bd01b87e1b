use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::EncoderModel;

pub async fn embed(
	client: &Client,
	cfg: &scout_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let model = EncoderModel::from_name(&cfg.model);
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"model": model.repo_id(),
		"input": texts,
	});

	if let Some(dimensions) = cfg.dimensions {
		body["dimensions"] = Value::from(dimensions);
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json, texts.len())
}

fn parse_embedding_response(json: Value, text_count: usize) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing data array."))?;
	let mut vectors: Vec<Option<Vec<f32>>> = vec![None; text_count];

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| eyre::eyre!("Embedding item missing embedding array."))?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number =
				value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;

			vec.push(number as f32);
		}

		let Some(slot) = vectors.get_mut(index) else {
			return Err(eyre::eyre!("Embedding index {index} is out of range."));
		};

		if slot.is_some() {
			return Err(eyre::eyre!("Embedding index {index} appears more than once."));
		}

		*slot = Some(vec);
	}

	vectors
		.into_iter()
		.enumerate()
		.map(|(index, vec)| {
			vec.ok_or_else(|| eyre::eyre!("Embedding response has no vector for text {index}."))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json, 2).expect("parse failed");
		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": ["x"] }] });

		assert!(parse_embedding_response(json, 1).is_err());
	}

	#[test]
	fn rejects_duplicate_gapped_and_missing_indices() {
		let duplicate = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 0, "embedding": [2.0] }
			]
		});
		let gapped = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 5, "embedding": [2.0] }
			]
		});
		let short = serde_json::json!({ "data": [{ "index": 1, "embedding": [1.0] }] });

		assert!(parse_embedding_response(duplicate, 2).is_err());
		assert!(parse_embedding_response(gapped, 2).is_err());
		assert!(parse_embedding_response(short, 2).is_err());
	}
}
