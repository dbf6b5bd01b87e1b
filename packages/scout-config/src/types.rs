use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub funnel: Funnel,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: ProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Registry name or hub id of the sentence encoder. Unknown names select the default encoder.
	pub model: String,
	/// Optional. Forwarded to the endpoint when the model supports truncated outputs.
	pub dimensions: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Registry name or hub id of the cross-encoder.
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Cutoffs are applied in order: `stage1_cutoff` >= `title_cutoff` >= `stage2_cutoff` >= `top_k`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Funnel {
	/// Lexical weight of the hybrid stage. The semantic leg receives `1 - alpha`.
	pub alpha: f32,
	pub stage1_cutoff: u32,
	pub stage2_cutoff: u32,
	pub top_k: u32,
	/// Optional. Enables the title-only dense pass ahead of the title plus abstract pass.
	pub title_cutoff: Option<u32>,
}
impl Default for Funnel {
	fn default() -> Self {
		Self { alpha: 0.7, stage1_cutoff: 1_000, stage2_cutoff: 100, top_k: 10, title_cutoff: None }
	}
}
