mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Funnel, ProviderConfig, Providers, Service};

use std::{fs, path::Path};

use serde_json::{Map, Value};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	validate_funnel(&cfg.funnel)?;

	if let Some(dimensions) = cfg.providers.embedding.dimensions
		&& dimensions == 0
	{
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, api_base, api_key, model, timeout_ms, headers) in [
		(
			"embedding",
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.api_key,
			&cfg.providers.embedding.model,
			cfg.providers.embedding.timeout_ms,
			&cfg.providers.embedding.default_headers,
		),
		(
			"rerank",
			&cfg.providers.rerank.api_base,
			&cfg.providers.rerank.api_key,
			&cfg.providers.rerank.model,
			cfg.providers.rerank.timeout_ms,
			&cfg.providers.rerank.default_headers,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}

		validate_headers(label, headers)?;
	}

	Ok(())
}

pub fn validate_funnel(funnel: &Funnel) -> Result<()> {
	if !funnel.alpha.is_finite() {
		return Err(Error::Validation {
			message: "funnel.alpha must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&funnel.alpha) {
		return Err(Error::Validation {
			message: "funnel.alpha must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (label, value) in [
		("funnel.stage1_cutoff", funnel.stage1_cutoff),
		("funnel.stage2_cutoff", funnel.stage2_cutoff),
		("funnel.top_k", funnel.top_k),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if funnel.stage1_cutoff < funnel.stage2_cutoff {
		return Err(Error::Validation {
			message: "funnel.stage1_cutoff must be greater than or equal to funnel.stage2_cutoff."
				.to_string(),
		});
	}
	if funnel.stage2_cutoff < funnel.top_k {
		return Err(Error::Validation {
			message: "funnel.stage2_cutoff must be greater than or equal to funnel.top_k."
				.to_string(),
		});
	}

	if let Some(title_cutoff) = funnel.title_cutoff {
		if title_cutoff > funnel.stage1_cutoff {
			return Err(Error::Validation {
				message: "funnel.title_cutoff must be less than or equal to funnel.stage1_cutoff."
					.to_string(),
			});
		}
		if title_cutoff < funnel.stage2_cutoff {
			return Err(Error::Validation {
				message:
					"funnel.title_cutoff must be greater than or equal to funnel.stage2_cutoff."
						.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("Provider {label} default_headers.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	for api_base in [&mut cfg.providers.embedding.api_base, &mut cfg.providers.rerank.api_base] {
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
