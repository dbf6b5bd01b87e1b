use std::{collections::HashSet, sync::Arc};

use scout_domain::Document;
use scout_service::{
	BoxFuture, DenseRetriever, EmbeddingProvider, Error, Funnel, HybridRetriever, ModelContext,
	Reranker, SearchParams, Stage,
};
use scout_testkit::{
	Counting, FailingEmbedding, FailingRerank, FixedScores, HashingEncoder, OverlapCrossEncoder,
	VocabularyEncoder,
};

struct ShortEmbedding;
impl EmbeddingProvider for ShortEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

fn doc(title: &str, abstract_text: &str) -> Document {
	let slug: String = title
		.chars()
		.map(|ch| if ch.is_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
		.collect();

	Document::new(title, abstract_text, format!("https://papers.example.org/{slug}"))
}

fn example_corpus() -> Vec<Document> {
	vec![
		doc("Transformer Basics", "intro to attention"),
		doc("Unrelated Topic", "gardening tips"),
	]
}

// The first document wins lexically, the second wins on its title.
fn disagreeing_corpus() -> Vec<Document> {
	vec![
		doc("Gardening Notes", "neural retrieval neural retrieval neural retrieval"),
		doc("Neural Retrieval", "cooking"),
		doc("Soil Care", "compost mulch seed"),
		doc("Bread Baking", "flour yeast oven"),
		doc("Sea Birds", "gull tern puffin"),
	]
}

fn wide_corpus(count: usize) -> Vec<Document> {
	let words = ["graph", "vision", "speech", "retrieval", "robotics", "protein", "privacy"];

	(0..count)
		.map(|idx| {
			let first = words[idx % words.len()];
			let second = words[(idx / words.len()) % words.len()];

			doc(&format!("Study {idx} {first}"), &format!("{first} methods for {second} tasks"))
		})
		.collect()
}

fn titles(docs: &[Document]) -> Vec<String> {
	docs.iter().map(|doc| doc.title.clone()).collect()
}

fn abstracts(docs: &[Document]) -> Vec<String> {
	docs.iter().map(|doc| doc.abstract_text.clone()).collect()
}

fn vocabulary_for(query: &str, docs: &[Document]) -> VocabularyEncoder {
	let mut texts = titles(docs);

	texts.push(query.to_string());

	VocabularyEncoder::from_texts(&texts)
}

fn params(top_k: usize, stage1_cutoff: usize, stage2_cutoff: usize) -> SearchParams {
	SearchParams { alpha: 0.7, top_k, stage1_cutoff, stage2_cutoff, title_cutoff: None }
}

#[tokio::test]
async fn example_query_prefers_the_matching_document() {
	let docs = example_corpus();
	let query = "transformer attention";
	let hybrid = HybridRetriever::new(Arc::new(vocabulary_for(query, &docs)));
	let selection = hybrid
		.run(query, &titles(&docs), &abstracts(&docs), 0.7, 1)
		.await
		.expect("Hybrid stage failed.");

	assert_eq!(selection.indices, vec![0]);

	let models =
		ModelContext::new(Arc::new(vocabulary_for(query, &docs)), Arc::new(OverlapCrossEncoder));
	let ranked = scout_service::search(&models, query, &docs, 0.7, 1, 1_000, 100)
		.await
		.expect("Search failed.");

	assert_eq!(ranked, vec![docs[0].clone()]);
}

#[tokio::test]
async fn hybrid_returns_min_top_k_without_duplicates() {
	let docs = disagreeing_corpus();
	let hybrid = HybridRetriever::new(Arc::new(HashingEncoder::new(32)));

	for alpha in [0.0, 0.25, 0.5, 0.7, 1.0] {
		for top_k in 1..=7 {
			let selection = hybrid
				.run("neural retrieval", &titles(&docs), &abstracts(&docs), alpha, top_k)
				.await
				.expect("Hybrid stage failed.");
			let unique: HashSet<usize> = selection.indices.iter().copied().collect();

			assert_eq!(selection.len(), top_k.min(docs.len()));
			assert_eq!(unique.len(), selection.len());
			assert!(selection.indices.iter().all(|&idx| idx < docs.len()));
		}
	}
}

#[tokio::test]
async fn alpha_one_is_lexical_and_alpha_zero_is_semantic() {
	let docs = disagreeing_corpus();
	let query = "neural retrieval";
	let hybrid = HybridRetriever::new(Arc::new(vocabulary_for(query, &docs)));
	let lexical = hybrid
		.run(query, &titles(&docs), &abstracts(&docs), 1.0, 1)
		.await
		.expect("Hybrid stage failed.");
	let semantic = hybrid
		.run(query, &titles(&docs), &abstracts(&docs), 0.0, 1)
		.await
		.expect("Hybrid stage failed.");

	assert_eq!(lexical.indices, vec![0]);
	assert_eq!(semantic.indices, vec![1]);

	let scores = hybrid
		.score(query, &titles(&docs), &abstracts(&docs), 1.0)
		.await
		.expect("Hybrid scoring failed.");

	assert!(scores.lexical[0] > scores.lexical[1]);
	assert_eq!(scores.semantic[0], 0.0);
	assert_eq!(scores.fused[0], 1.0);
}

#[tokio::test]
async fn hybrid_and_dense_pass_small_inputs_through_untouched() {
	let docs = disagreeing_corpus();
	let embedding = Arc::new(Counting::new(FailingEmbedding));
	let hybrid = HybridRetriever::new(embedding.clone());
	let dense = DenseRetriever::new(embedding.clone());
	let selection = hybrid
		.run("anything", &titles(&docs), &abstracts(&docs), 0.5, docs.len())
		.await
		.expect("Pass-through must not encode.");

	assert!(selection.is_pass_through());
	assert_eq!(selection.indices, vec![0, 1, 2, 3, 4]);

	let refs: Vec<&Document> = docs.iter().collect();
	let kept = dense
		.retrieve_by_title_and_abstract("anything", &refs, 10)
		.await
		.expect("Pass-through must not encode.");

	assert_eq!(kept, refs);
	assert_eq!(embedding.calls(), 0);
}

#[tokio::test]
async fn hybrid_rejects_mismatched_columns() {
	let hybrid = HybridRetriever::new(Arc::new(HashingEncoder::default()));
	let err = hybrid
		.run("query", &["a".to_string(), "b".to_string()], &["a".to_string()], 0.5, 1)
		.await
		.expect_err("Expected a length mismatch.");

	assert!(matches!(err, Error::InvalidParameter { .. }));
}

#[tokio::test]
async fn dense_breaks_ties_by_ascending_index() {
	let dense = DenseRetriever::new(Arc::new(HashingEncoder::new(16)));
	let texts = vec!["same words".to_string(); 4];
	let selection = dense.run("same words", &texts, 2).await.expect("Dense stage failed.");

	assert_eq!(selection.indices, vec![0, 1]);
}

#[tokio::test]
async fn reranker_always_rescores() {
	let reranker = Reranker::new(Arc::new(OverlapCrossEncoder));
	let texts = vec!["gardening tips".to_string(), "transformer attention".to_string()];
	let selection =
		reranker.run("transformer attention", &texts, 5).await.expect("Rerank failed.");

	assert!(!selection.is_pass_through());
	assert_eq!(selection.indices, vec![1, 0]);
	assert_eq!(selection.scores, Some(vec![2.0, 0.0]));
}

#[tokio::test]
async fn reranker_rejects_short_score_vectors() {
	let reranker = Reranker::new(Arc::new(FixedScores(vec![1.0])));
	let texts = vec!["a".to_string(), "b".to_string()];
	let err = reranker.run("query", &texts, 1).await.expect_err("Expected a score mismatch.");

	assert!(matches!(err, Error::ModelUnavailable { .. }));
}

#[tokio::test]
async fn invalid_parameters_fail_before_any_model_call() {
	let embedding = Arc::new(Counting::new(HashingEncoder::default()));
	let rerank = Arc::new(Counting::new(OverlapCrossEncoder));
	let funnel = Funnel::new(&ModelContext::new(embedding.clone(), rerank.clone()));
	let docs = example_corpus();
	let mut bad_alpha = params(1, 1_000, 100);

	bad_alpha.alpha = 1.5;

	let err = funnel.search("query", &docs, &bad_alpha).await.expect_err("Expected alpha error.");

	assert!(matches!(err, Error::InvalidParameter { .. }));

	let err = funnel
		.search("query", &docs, &params(0, 1_000, 100))
		.await
		.expect_err("Expected top_k error.");

	assert!(matches!(err, Error::InvalidParameter { .. }));

	let err = funnel.search("query", &[], &bad_alpha).await.expect_err("Expected alpha error.");

	assert!(matches!(err, Error::InvalidParameter { .. }));
	assert_eq!(embedding.calls(), 0);
	assert_eq!(rerank.calls(), 0);
}

#[tokio::test]
async fn empty_input_returns_empty_without_model_calls() {
	let embedding = Arc::new(Counting::new(FailingEmbedding));
	let rerank = Arc::new(Counting::new(FailingRerank));
	let funnel = Funnel::new(&ModelContext::new(embedding.clone(), rerank.clone()));
	let outcome =
		funnel.search("query", &[], &params(3, 10, 5)).await.expect("Empty search failed.");

	assert!(outcome.documents.is_empty());
	assert!(outcome.trace.stages.is_empty());
	assert_eq!(embedding.calls(), 0);
	assert_eq!(rerank.calls(), 0);
}

#[tokio::test]
async fn model_failures_propagate() {
	let docs = wide_corpus(12);
	let failing_embedding =
		Funnel::new(&ModelContext::new(Arc::new(FailingEmbedding), Arc::new(OverlapCrossEncoder)));
	let err = failing_embedding
		.search("graph", &docs, &params(2, 5, 3))
		.await
		.expect_err("Expected embedding failure.");

	assert!(matches!(err, Error::ModelUnavailable { .. }));

	let failing_rerank = Funnel::new(&ModelContext::new(
		Arc::new(HashingEncoder::default()),
		Arc::new(FailingRerank),
	));
	let err = failing_rerank
		.search("graph", &example_corpus(), &params(1, 1_000, 100))
		.await
		.expect_err("Expected rerank failure.");

	assert!(matches!(err, Error::ModelUnavailable { .. }));

	let short =
		Funnel::new(&ModelContext::new(Arc::new(ShortEmbedding), Arc::new(OverlapCrossEncoder)));
	let err = short
		.search("graph", &docs, &params(2, 5, 3))
		.await
		.expect_err("Expected vector count mismatch.");

	assert!(matches!(err, Error::ModelUnavailable { .. }));
}

#[tokio::test]
async fn funnel_narrows_monotonically() {
	let docs = wide_corpus(30);
	let funnel = Funnel::new(&ModelContext::new(
		Arc::new(HashingEncoder::default()),
		Arc::new(OverlapCrossEncoder),
	));
	let search = SearchParams {
		alpha: 0.7,
		top_k: 3,
		stage1_cutoff: 20,
		stage2_cutoff: 10,
		title_cutoff: Some(15),
	};
	let outcome = funnel.search("graph retrieval", &docs, &search).await.expect("Search failed.");
	let stages: Vec<Stage> = outcome.trace.stages.iter().map(|report| report.stage).collect();

	assert_eq!(stages, vec![Stage::Hybrid, Stage::DenseTitle, Stage::Dense, Stage::Rerank]);
	assert_eq!(outcome.trace.output_count(Stage::Hybrid), Some(20));
	assert_eq!(outcome.trace.output_count(Stage::DenseTitle), Some(15));
	assert_eq!(outcome.trace.output_count(Stage::Dense), Some(10));
	assert_eq!(outcome.trace.output_count(Stage::Rerank), Some(3));
	assert_eq!(outcome.documents.len(), 3);

	for pair in outcome.trace.stages.windows(2) {
		assert_eq!(pair[0].output_count, pair[1].input_count);
		assert!(pair[0].output_count >= pair[1].output_count);
	}

	let unique: HashSet<&str> = outcome.documents.iter().map(|doc| doc.url.as_str()).collect();

	assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn small_batches_skip_to_rerank_and_keep_metadata() {
	let docs = vec![
		doc("Unrelated Topic", "gardening tips").with_metadata("year", serde_json::json!(2019)),
		doc("Transformer Basics", "intro to attention")
			.with_metadata("year", serde_json::json!(2017)),
	];
	let funnel = Funnel::new(&ModelContext::new(
		Arc::new(HashingEncoder::default()),
		Arc::new(OverlapCrossEncoder),
	));
	let outcome = funnel
		.search("transformer attention", &docs, &params(5, 1_000, 100))
		.await
		.expect("Search failed.");
	let pass_through: Vec<bool> =
		outcome.trace.stages.iter().map(|report| report.pass_through).collect();

	assert_eq!(pass_through, vec![true, true, false]);
	assert_eq!(outcome.documents, vec![docs[1].clone(), docs[0].clone()]);
	assert_eq!(outcome.documents[0].metadata["year"], serde_json::json!(2017));
}

#[tokio::test]
async fn repeated_searches_are_identical() {
	let docs = wide_corpus(25);
	let funnel = Funnel::new(&ModelContext::new(
		Arc::new(HashingEncoder::default()),
		Arc::new(OverlapCrossEncoder),
	));
	let search = params(5, 15, 8);
	let first =
		funnel.search_documents("privacy graph", &docs, &search).await.expect("Search failed.");
	let second =
		funnel.search_documents("privacy graph", &docs, &search).await.expect("Search failed.");

	assert_eq!(first, second);
}
