use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const PLACEHOLDER: &str = "N/A";

/// A short scholarly record. Fields other than `title`, `abstract` and `url` are carried in
/// `metadata` and serialized back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub title: String,
	#[serde(rename = "abstract")]
	pub abstract_text: String,
	pub url: String,
	#[serde(flatten)]
	pub metadata: Map<String, Value>,
}
impl Document {
	pub fn new(
		title: impl Into<String>,
		abstract_text: impl Into<String>,
		url: impl Into<String>,
	) -> Self {
		Self {
			title: title.into(),
			abstract_text: abstract_text.into(),
			url: url.into(),
			metadata: Map::new(),
		}
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
		self.metadata.insert(key.into(), value);

		self
	}

	/// Text used by the lexical leg and by the dense and pairwise stages.
	pub fn title_and_abstract(&self) -> String {
		format!("{}\n{}", self.title, self.abstract_text)
	}

	/// False when any required field is blank or the `N/A` placeholder, or when the url is not
	/// an http(s) link.
	pub fn is_usable(&self) -> bool {
		let url = self.url.trim();

		is_present(&self.title)
			&& is_present(&self.abstract_text)
			&& is_present(url)
			&& (url.starts_with("http://") || url.starts_with("https://"))
	}
}

/// Keeps usable documents in their original order and returns how many were dropped.
pub fn retain_usable(documents: Vec<Document>) -> (Vec<Document>, usize) {
	let total = documents.len();
	let kept: Vec<Document> = documents.into_iter().filter(Document::is_usable).collect();
	let dropped = total - kept.len();

	(kept, dropped)
}

fn is_present(value: &str) -> bool {
	let trimmed = value.trim();

	!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(PLACEHOLDER)
}
