//! Tag normalization.
//!
//! Two spellings of the same idea collapse to one tag: `"Cats in Space!"`, `"space cats"` and
//! `"cat-space"` all normalize to `cat-space`. Normalization is idempotent.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

const STOPWORDS: &[&str] = &[
	"a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
	"as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
	"by", "can", "could", "d", "did", "do", "does", "doing", "down", "during", "each", "few",
	"for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
	"herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
	"itself", "just", "ll", "m", "me", "more", "most", "my", "myself", "no", "nor", "not", "now",
	"of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
	"own", "re", "s", "same", "she", "should", "so", "some", "such", "t", "than", "that", "the",
	"their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
	"through", "to", "too", "under", "until", "up", "ve", "very", "was", "we", "were", "what",
	"when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
	"your", "yours", "yourself", "yourselves",
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
	("children", "child"),
	("feet", "foot"),
	("geese", "goose"),
	("men", "man"),
	("mice", "mouse"),
	("people", "person"),
	("teeth", "tooth"),
	("women", "woman"),
];

const UNCOUNTABLE: &[&str] =
	&["news", "series", "species", "physics", "mathematics", "athletics", "diabetes", "means"];

pub fn is_stopword(word: &str) -> bool {
	STOPWORDS.binary_search(&word).is_ok()
}

/// Returns the canonical form of a tag, or an empty string when nothing alphanumeric survives.
pub fn normalize_tag(raw: &str) -> String {
	let folded: String = raw.nfkc().collect::<String>().to_lowercase().nfkc().collect();
	let spaced: String =
		folded.chars().map(|c| if matches!(c, '\'' | '\u{2019}') { ' ' } else { c }).collect();
	// (surface form, singular form)
	let tokens: Vec<(String, String)> = spaced
		.unicode_words()
		.map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
		.filter(|word| !word.is_empty())
		.map(|word| {
			let singular = singularize(&word);

			(word, singular)
		})
		.collect();

	if tokens.is_empty() {
		return String::new();
	}

	let significant: BTreeSet<&str> = tokens
		.iter()
		.filter(|(word, singular)| !is_stopword(word) && !is_stopword(singular))
		.map(|(_, singular)| singular.as_str())
		.collect();
	let kept = if significant.is_empty() {
		tokens.iter().map(|(_, singular)| singular.as_str()).collect::<BTreeSet<_>>()
	} else {
		significant
	};

	kept.into_iter().collect::<Vec<_>>().join("-")
}

/// Normalizes every tag, drops empties, and returns a sorted, de-duplicated set.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	raw.into_iter()
		.map(|tag| normalize_tag(tag.as_ref()))
		.filter(|tag| !tag.is_empty())
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

/// Rule-based singular form, applied until it stops changing.
pub fn singularize(word: &str) -> String {
	let mut current = word.to_string();

	loop {
		let next = singularize_once(&current);

		if next == current {
			return current;
		}

		current = next;
	}
}

fn singularize_once(word: &str) -> String {
	if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == word) {
		return (*singular).to_string();
	}
	if word.chars().count() <= 3 || UNCOUNTABLE.contains(&word) {
		return word.to_string();
	}
	if ["ss", "us", "is", "ous"].iter().any(|suffix| word.ends_with(suffix)) {
		return word.to_string();
	}
	if let Some(stem) = word.strip_suffix("ies") {
		return format!("{stem}y");
	}
	if let Some(stem) = word.strip_suffix("sses") {
		return format!("{stem}ss");
	}
	if ["xes", "ches", "shes", "zzes"].iter().any(|suffix| word.ends_with(suffix)) {
		return word[..word.len() - 2].to_string();
	}
	if let Some(stem) = word.strip_suffix('s') {
		return stem.to_string();
	}

	word.to_string()
}
