use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use serde::Deserialize;

use scout_domain::Document;
use scout_service::{Funnel, ModelContext, SearchParams};

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of documents, or an object with a `documents` array.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub documents: PathBuf,
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	#[arg(long, value_name = "N")]
	pub top_k: Option<usize>,
	#[arg(long, value_name = "A")]
	pub alpha: Option<f32>,
	#[arg(long, value_name = "N")]
	pub stage1_cutoff: Option<usize>,
	#[arg(long, value_name = "N")]
	pub stage2_cutoff: Option<usize>,
	/// Print the per-stage trace alongside the documents.
	#[arg(long)]
	pub trace: bool,
}
impl Args {
	pub fn params(&self, funnel: &scout_config::Funnel) -> SearchParams {
		let mut params = SearchParams::from_config(funnel);

		if let Some(top_k) = self.top_k {
			params.top_k = top_k;
		}
		if let Some(alpha) = self.alpha {
			params.alpha = alpha;
		}
		if let Some(cutoff) = self.stage1_cutoff {
			params.stage1_cutoff = cutoff;
		}
		if let Some(cutoff) = self.stage2_cutoff {
			params.stage2_cutoff = cutoff;
		}

		params
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
	Bare(Vec<Document>),
	Wrapped { documents: Vec<Document> },
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scout_config::load(&args.config)?;

	scout_cli::init_tracing(&config.service.log_level);

	let documents = load_documents(&args.documents)?;
	let params = args.params(&config.funnel);
	let models = ModelContext::from_config(&config.providers)?;
	let outcome = Funnel::new(&models).search(&args.query, &documents, &params).await?;
	let json = if args.trace {
		serde_json::to_string_pretty(&outcome)?
	} else {
		serde_json::to_string_pretty(&outcome.documents)?
	};

	println!("{json}");

	Ok(())
}

/// Reads a document file and drops records with blank or placeholder fields.
pub fn load_documents(path: &Path) -> color_eyre::Result<Vec<Document>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read documents at {}: {err}.", path.display()))?;

	parse_documents(&raw)
}

pub fn parse_documents(raw: &str) -> color_eyre::Result<Vec<Document>> {
	let documents = match serde_json::from_str(raw)? {
		DocumentFile::Bare(documents) => documents,
		DocumentFile::Wrapped { documents } => documents,
	};
	let (kept, dropped) = scout_domain::retain_usable(documents);

	if dropped > 0 {
		tracing::warn!(dropped, kept = kept.len(), "Dropped documents with placeholder fields.");
	}

	Ok(kept)
}
