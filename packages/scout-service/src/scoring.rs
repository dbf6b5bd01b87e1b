//! Score vector utilities shared by every stage.
//!
//! All vectors are plain slices with explicit length checks; nothing broadcasts.

use std::cmp::Ordering;

use crate::{Error, Result};

/// Indices chosen by a stage, best-first, with the score each index was ranked by.
///
/// A pass-through selection keeps every input in its original order and carries no scores.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
	pub indices: Vec<usize>,
	pub scores: Option<Vec<f32>>,
}
impl Selection {
	pub fn pass_through(len: usize) -> Self {
		Self { indices: (0..len).collect(), scores: None }
	}

	pub fn top_k(scores: &[f32], k: usize) -> Self {
		let indices = top_k_indices(scores, k);
		let picked = indices.iter().map(|&idx| scores[idx]).collect();

		Self { indices, scores: Some(picked) }
	}

	pub fn is_pass_through(&self) -> bool {
		self.scores.is_none()
	}

	pub fn len(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	pub fn pick<'a, T>(&self, items: &[&'a T]) -> Vec<&'a T> {
		self.indices.iter().map(|&idx| items[idx]).collect()
	}
}

pub fn ensure_alpha(alpha: f32) -> Result<()> {
	if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
		return Err(Error::invalid(format!("alpha must be in [0, 1], got {alpha}.")));
	}

	Ok(())
}

pub fn ensure_top_k(top_k: usize, label: &str) -> Result<()> {
	if top_k == 0 {
		return Err(Error::invalid(format!("{label} must be greater than zero.")));
	}

	Ok(())
}

/// Min-max scales `scores` into [0, 1].
///
/// Vectors whose maximum is not positive are degenerate and returned unchanged. A constant
/// positive vector has no spread and maps to zeros.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
	let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

	if scores.is_empty() || max <= 0.0 {
		return scores.to_vec();
	}

	let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
	let range = max - min;

	if range <= 0.0 {
		return vec![0.0; scores.len()];
	}

	scores.iter().map(|score| ((score - min) / range).clamp(0.0, 1.0)).collect()
}

/// `alpha * lexical + (1 - alpha) * semantic`, element-wise.
pub fn fuse(alpha: f32, lexical: &[f32], semantic: &[f32]) -> Result<Vec<f32>> {
	ensure_alpha(alpha)?;

	if lexical.len() != semantic.len() {
		return Err(Error::invalid(format!(
			"Cannot fuse {} lexical scores with {} semantic scores.",
			lexical.len(),
			semantic.len()
		)));
	}

	Ok(lexical.iter().zip(semantic).map(|(l, s)| alpha * l + (1.0 - alpha) * s).collect())
}

/// Cosine similarity of `query` against every row of `refs`. Zero-norm rows score 0.
pub fn cosine_similarities(query: &[f32], refs: &[Vec<f32>]) -> Result<Vec<f32>> {
	if query.is_empty() {
		return Err(Error::model("Query embedding is empty."));
	}

	let query_norm = norm(query);
	let mut out = Vec::with_capacity(refs.len());

	for (idx, row) in refs.iter().enumerate() {
		if row.len() != query.len() {
			return Err(Error::model(format!(
				"Embedding {idx} has dimension {}, expected {}.",
				row.len(),
				query.len()
			)));
		}

		let row_norm = norm(row);

		if query_norm == 0.0 || row_norm == 0.0 {
			out.push(0.0);

			continue;
		}

		let dot: f32 = query.iter().zip(row).map(|(a, b)| a * b).sum();

		out.push((dot / query_norm / row_norm).clamp(-1.0, 1.0));
	}

	Ok(out)
}

/// Indices of the `k` highest scores. Ties keep ascending index order; NaN ranks last.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
	let mut indices: Vec<usize> = (0..scores.len()).collect();

	indices.sort_by(|&left, &right| {
		cmp_f32_desc(scores[left], scores[right]).then_with(|| left.cmp(&right))
	});
	indices.truncate(k);

	indices
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn norm(vec: &[f32]) -> f32 {
	vec.iter().map(|value| value * value).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_to_unit_range() {
		let normalized = min_max_normalize(&[2.0, 4.0, 3.0]);

		assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
	}

	#[test]
	fn normalizes_negative_minimum() {
		let normalized = min_max_normalize(&[-1.0, 1.0, 0.0]);

		assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
	}

	#[test]
	fn skips_degenerate_vectors() {
		assert_eq!(min_max_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
		assert_eq!(min_max_normalize(&[-0.5, 0.0]), vec![-0.5, 0.0]);
		assert!(min_max_normalize(&[]).is_empty());
	}

	#[test]
	fn constant_positive_vector_maps_to_zeros() {
		assert_eq!(min_max_normalize(&[0.3, 0.3, 0.3]), vec![0.0, 0.0, 0.0]);
	}

	#[test]
	fn fuse_weights_lexical_by_alpha() {
		let fused = fuse(0.25, &[1.0, 0.0], &[0.0, 1.0]).expect("fuse failed");

		assert_eq!(fused, vec![0.25, 0.75]);
	}

	#[test]
	fn fuse_rejects_mismatched_lengths_and_bad_alpha() {
		assert!(matches!(fuse(0.5, &[1.0], &[]), Err(Error::InvalidParameter { .. })));
		assert!(matches!(fuse(1.5, &[1.0], &[1.0]), Err(Error::InvalidParameter { .. })));
		assert!(matches!(fuse(f32::NAN, &[1.0], &[1.0]), Err(Error::InvalidParameter { .. })));
	}

	#[test]
	fn cosine_handles_parallel_orthogonal_and_zero_rows() {
		let scores = cosine_similarities(&[1.0, 0.0], &[
			vec![2.0, 0.0],
			vec![0.0, 3.0],
			vec![-1.0, 0.0],
			vec![0.0, 0.0],
		])
		.expect("cosine failed");

		assert_eq!(scores, vec![1.0, 0.0, -1.0, 0.0]);
	}

	#[test]
	fn cosine_scores_small_magnitude_vectors() {
		let scores = cosine_similarities(&[1e-4, 0.0], &[vec![2e-4, 0.0], vec![0.0, 1e-4]])
			.expect("cosine failed");

		assert!((scores[0] - 1.0).abs() < 1e-6, "{scores:?}");
		assert_eq!(scores[1], 0.0);
	}

	#[test]
	fn cosine_rejects_dimension_mismatch() {
		let err = cosine_similarities(&[1.0, 0.0], &[vec![1.0]]).expect_err("Expected error.");

		assert!(matches!(err, Error::ModelUnavailable { .. }));
	}

	#[test]
	fn top_k_breaks_ties_by_index() {
		assert_eq!(top_k_indices(&[0.5, 0.9, 0.5, 0.9], 3), vec![1, 3, 0]);
		assert_eq!(top_k_indices(&[f32::NAN, 0.1], 2), vec![1, 0]);
		assert_eq!(top_k_indices(&[0.1], 5), vec![0]);
	}

	#[test]
	fn selection_carries_picked_scores() {
		let selection = Selection::top_k(&[0.1, 0.7, 0.4], 2);

		assert_eq!(selection.indices, vec![1, 2]);
		assert_eq!(selection.scores, Some(vec![0.7, 0.4]));
		assert!(!selection.is_pass_through());
		assert!(Selection::pass_through(3).is_pass_through());
	}
}
