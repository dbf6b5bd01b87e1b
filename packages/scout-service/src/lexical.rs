//! BM25 Okapi index built per call over one batch of documents.
//!
//! Terms whose IDF comes out negative (present in more than half the batch) are floored to
//! `epsilon * average_idf` so that very common terms contribute little but are not ignored.

use std::collections::HashMap;

use scout_domain::tokenize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bm25Params {
	pub k1: f64,
	pub b: f64,
	pub epsilon: f64,
}
impl Default for Bm25Params {
	fn default() -> Self {
		Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
	}
}

#[derive(Clone, Debug)]
pub struct Bm25Index {
	params: Bm25Params,
	term_freqs: Vec<HashMap<String, u32>>,
	doc_lens: Vec<usize>,
	avg_doc_len: f64,
	idf: HashMap<String, f64>,
}
impl Bm25Index {
	pub fn new(docs: &[Vec<String>]) -> Self {
		Self::with_params(docs, Bm25Params::default())
	}

	/// Tokenizes every text with the shared lexical tokenizer before indexing.
	pub fn from_texts<S>(texts: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		let docs: Vec<Vec<String>> = texts.iter().map(|text| tokenize(text.as_ref())).collect();

		Self::new(&docs)
	}

	pub fn with_params(docs: &[Vec<String>], params: Bm25Params) -> Self {
		let mut term_freqs = Vec::with_capacity(docs.len());
		let mut doc_lens = Vec::with_capacity(docs.len());
		let mut doc_freqs: HashMap<String, u32> = HashMap::new();

		for doc in docs {
			let mut freqs: HashMap<String, u32> = HashMap::new();

			for term in doc {
				*freqs.entry(term.clone()).or_insert(0) += 1;
			}
			for term in freqs.keys() {
				*doc_freqs.entry(term.clone()).or_insert(0) += 1;
			}

			doc_lens.push(doc.len());
			term_freqs.push(freqs);
		}

		let total_len: usize = doc_lens.iter().sum();
		let avg_doc_len =
			if docs.is_empty() { 0.0 } else { total_len as f64 / docs.len() as f64 };
		let idf = compute_idf(&doc_freqs, docs.len(), params.epsilon);

		Self { params, term_freqs, doc_lens, avg_doc_len, idf }
	}

	pub fn len(&self) -> usize {
		self.doc_lens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.doc_lens.is_empty()
	}

	pub fn idf(&self, term: &str) -> Option<f64> {
		self.idf.get(term).copied()
	}

	/// One score per indexed document. Repeated query terms count once per occurrence.
	pub fn scores(&self, query_terms: &[String]) -> Vec<f32> {
		let mut scores = vec![0.0_f64; self.len()];

		if query_terms.is_empty() {
			return vec![0.0; self.len()];
		}

		let Bm25Params { k1, b, .. } = self.params;

		for term in query_terms {
			let Some(idf) = self.idf.get(term.as_str()).copied() else { continue };

			for (doc_idx, freqs) in self.term_freqs.iter().enumerate() {
				let Some(&tf) = freqs.get(term.as_str()) else { continue };
				let tf = tf as f64;
				let len_ratio = if self.avg_doc_len > 0.0 {
					self.doc_lens[doc_idx] as f64 / self.avg_doc_len
				} else {
					1.0
				};

				scores[doc_idx] += idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * len_ratio));
			}
		}

		scores.into_iter().map(|score| score as f32).collect()
	}

	/// Tokenizes `query` the same way documents were tokenized and scores it.
	pub fn score_query(&self, query: &str) -> Vec<f32> {
		self.scores(&tokenize(query))
	}
}

fn compute_idf(
	doc_freqs: &HashMap<String, u32>,
	doc_count: usize,
	epsilon: f64,
) -> HashMap<String, f64> {
	let n = doc_count as f64;
	let mut idf = HashMap::with_capacity(doc_freqs.len());
	let mut negative = Vec::new();
	let mut idf_sum = 0.0_f64;

	for (term, &df) in doc_freqs {
		let df = df as f64;
		let value = (n - df + 0.5).ln() - (df + 0.5).ln();

		idf_sum += value;

		if value < 0.0 {
			negative.push(term);
		}

		idf.insert(term.clone(), value);
	}

	if idf.is_empty() {
		return idf;
	}

	let floor = epsilon * (idf_sum / idf.len() as f64);

	for term in negative {
		idf.insert(term.clone(), floor);
	}

	idf
}
