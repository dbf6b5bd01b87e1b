//! Closed registries of the pretrained models the funnel can address.
//!
//! Names resolve by short name or by hub id. Anything else resolves to the registry default.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EncoderModel {
	#[default]
	AllMpnetBaseV2,
	AllMiniLmL6V2,
	MsmarcoDistilbertBaseV3,
	MsmarcoMiniLmL6V3,
	KoSrobertaMultitask,
	KoSimCseRobertaMultitask,
}
impl EncoderModel {
	pub const ALL: [Self; 6] = [
		Self::AllMpnetBaseV2,
		Self::AllMiniLmL6V2,
		Self::MsmarcoDistilbertBaseV3,
		Self::MsmarcoMiniLmL6V3,
		Self::KoSrobertaMultitask,
		Self::KoSimCseRobertaMultitask,
	];

	pub fn from_name(name: &str) -> Self {
		let name = name.trim();

		match Self::ALL.into_iter().find(|model| model.name() == name || model.repo_id() == name) {
			Some(model) => model,
			None => {
				tracing::warn!(
					model = name,
					default = Self::default().name(),
					"Unknown encoder model."
				);

				Self::default()
			},
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::AllMpnetBaseV2 => "all-mpnet-base-v2",
			Self::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
			Self::MsmarcoDistilbertBaseV3 => "msmarco-distilbert-base-v3",
			Self::MsmarcoMiniLmL6V3 => "msmarco-MiniLM-L-6-v3",
			Self::KoSrobertaMultitask => "ko-sroberta-multitask",
			Self::KoSimCseRobertaMultitask => "KoSimCSE-roberta-multitask",
		}
	}

	pub fn repo_id(self) -> &'static str {
		match self {
			Self::AllMpnetBaseV2 => "sentence-transformers/all-mpnet-base-v2",
			Self::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
			Self::MsmarcoDistilbertBaseV3 => "sentence-transformers/msmarco-distilbert-base-v3",
			Self::MsmarcoMiniLmL6V3 => "sentence-transformers/msmarco-MiniLM-L-6-v3",
			Self::KoSrobertaMultitask => "jhgan/ko-sroberta-multitask",
			Self::KoSimCseRobertaMultitask => "BM-K/KoSimCSE-roberta-multitask",
		}
	}

	pub fn dimensions(self) -> u32 {
		match self {
			Self::AllMiniLmL6V2 | Self::MsmarcoMiniLmL6V3 => 384,
			Self::AllMpnetBaseV2
			| Self::MsmarcoDistilbertBaseV3
			| Self::KoSrobertaMultitask
			| Self::KoSimCseRobertaMultitask => 768,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CrossEncoderModel {
	#[default]
	MsMarcoMiniLmL6V2,
	MsMarcoMiniLmL12V2,
	MsMarcoTinyBertL2V2,
}
impl CrossEncoderModel {
	pub const ALL: [Self; 3] =
		[Self::MsMarcoMiniLmL6V2, Self::MsMarcoMiniLmL12V2, Self::MsMarcoTinyBertL2V2];

	pub fn from_name(name: &str) -> Self {
		let name = name.trim();

		match Self::ALL.into_iter().find(|model| model.name() == name || model.repo_id() == name) {
			Some(model) => model,
			None => {
				tracing::warn!(
					model = name,
					default = Self::default().name(),
					"Unknown cross-encoder model."
				);

				Self::default()
			},
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::MsMarcoMiniLmL6V2 => "ms-marco-MiniLM-L-6-v2",
			Self::MsMarcoMiniLmL12V2 => "ms-marco-MiniLM-L-12-v2",
			Self::MsMarcoTinyBertL2V2 => "ms-marco-TinyBERT-L-2-v2",
		}
	}

	pub fn repo_id(self) -> &'static str {
		match self {
			Self::MsMarcoMiniLmL6V2 => "cross-encoder/ms-marco-MiniLM-L-6-v2",
			Self::MsMarcoMiniLmL12V2 => "cross-encoder/ms-marco-MiniLM-L-12-v2",
			Self::MsMarcoTinyBertL2V2 => "cross-encoder/ms-marco-TinyBERT-L-2-v2",
		}
	}
}
