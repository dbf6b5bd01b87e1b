//! Dictionary-free English lemmatizer.
//!
//! Folds irregular forms through a small table and reduces regular plural nouns to their
//! singular form. Verb inflections are left intact so that nominal uses such as "learning" or
//! "embedding" stay distinct from their verbs. Input is expected to be lowercase.

use std::{collections::HashMap, sync::LazyLock};

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
	[
		("analyses", "analysis"),
		("axes", "axis"),
		("bases", "basis"),
		("children", "child"),
		("criteria", "criterion"),
		("feet", "foot"),
		("geese", "goose"),
		("hypotheses", "hypothesis"),
		("indices", "index"),
		("matrices", "matrix"),
		("men", "man"),
		("mice", "mouse"),
		("people", "person"),
		("phenomena", "phenomenon"),
		("syntheses", "synthesis"),
		("teeth", "tooth"),
		("theses", "thesis"),
		("vertices", "vertex"),
		("women", "woman"),
		("built", "build"),
		("found", "find"),
		("given", "give"),
		("learnt", "learn"),
		("ran", "run"),
		("shown", "show"),
		("taught", "teach"),
		("written", "write"),
	]
	.into_iter()
	.collect()
});

/// Singular nouns ending in "ie", whose plurals would otherwise take the "-ies" to "-y" rule.
const IE_NOUNS: [&str; 16] = [
	"brownie", "calorie", "cookie", "freebie", "genie", "goalie", "hippie", "movie", "prairie",
	"rookie", "selfie", "smoothie", "sortie", "talkie", "yuppie", "zombie",
];
/// Singular nouns ending in "che", whose plurals drop only the final "s".
const CHE_NOUNS: [&str; 14] = [
	"ache", "avalanche", "cache", "cliche", "creche", "earache", "headache", "microfiche",
	"moustache", "mustache", "niche", "psyche", "quiche", "toothache",
];

/// Words ending in "s" that are already in base form.
const INVARIANT_SUFFIXES: [&str; 5] = ["ss", "us", "is", "as", "ics"];
const INVARIANT_WORDS: [&str; 5] = ["lens", "news", "series", "species", "bias"];

pub fn lemmatize(word: &str) -> String {
	if let Some(lemma) = IRREGULAR.get(word) {
		return (*lemma).to_string();
	}
	if word.chars().count() <= 3 || INVARIANT_WORDS.contains(&word) {
		return word.to_string();
	}

	if let Some(singular) = word.strip_suffix('s')
		&& (IE_NOUNS.contains(&singular) || CHE_NOUNS.contains(&singular))
	{
		return singular.to_string();
	}
	if let Some(stem) = word.strip_suffix("ies")
		&& stem.chars().count() >= 2
	{
		return format!("{stem}y");
	}

	for suffix in ["sses", "xes", "zzes", "ches", "shes"] {
		if word.ends_with(suffix) {
			return word[..word.len() - 2].to_string();
		}
	}

	if let Some(stem) = word.strip_suffix('s')
		&& !INVARIANT_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
	{
		return stem.to_string();
	}

	word.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reduces_regular_plurals() {
		assert_eq!(lemmatize("transformers"), "transformer");
		assert_eq!(lemmatize("studies"), "study");
		assert_eq!(lemmatize("classes"), "class");
		assert_eq!(lemmatize("approaches"), "approach");
		assert_eq!(lemmatize("boxes"), "box");
	}

	#[test]
	fn restores_ie_and_che_singulars() {
		assert_eq!(lemmatize("movies"), "movie");
		assert_eq!(lemmatize("cookies"), "cookie");
		assert_eq!(lemmatize("ties"), "tie");
		assert_eq!(lemmatize("caches"), "cache");
		assert_eq!(lemmatize("niches"), "niche");
		assert_eq!(lemmatize("headaches"), "headache");
		assert_eq!(lemmatize("searches"), "search");
		assert_eq!(lemmatize("branches"), "branch");
	}

	#[test]
	fn singular_and_plural_share_a_lemma() {
		for (plural, singular) in [("caches", "cache"), ("movies", "movie"), ("niches", "niche")] {
			assert_eq!(lemmatize(plural), lemmatize(singular));
		}
	}

	#[test]
	fn keeps_base_forms() {
		for word in ["attention", "analysis", "corpus", "robotics", "class", "series", "gas"] {
			assert_eq!(lemmatize(word), word);
		}
	}

	#[test]
	fn folds_irregular_forms() {
		assert_eq!(lemmatize("children"), "child");
		assert_eq!(lemmatize("matrices"), "matrix");
		assert_eq!(lemmatize("hypotheses"), "hypothesis");
	}
}
