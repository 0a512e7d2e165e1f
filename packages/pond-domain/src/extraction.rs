use serde::{Deserialize, Serialize};

use crate::tag;

pub const MAX_ENTITY_TAGS: usize = 3;
pub const MAX_AUTO_TAGS: usize = 5;
/// Nouns are only consulted while fewer than this many auto-tags exist.
pub const MIN_AUTO_TAGS: usize = 3;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Entity {
	pub text: String,
	#[serde(rename = "type")]
	pub entity_type: String,
}
impl Entity {
	pub fn new(text: impl Into<String>, entity_type: impl Into<String>) -> Self {
		Self { text: text.into(), entity_type: entity_type.into() }
	}
}

/// Advisory linguistic findings for one memory. Empty findings are valid.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Extraction {
	pub entities: Vec<Entity>,
	/// Lemmatized verbs in order of appearance.
	pub actions: Vec<String>,
	pub noun_phrases: Vec<String>,
	pub nouns: Vec<String>,
}

/// Picks raw auto-tag candidates: entity texts first, then noun phrases, then significant nouns.
///
/// Candidates that match an existing user tag or an earlier candidate are skipped. The caller
/// normalizes the result together with the user tags.
pub fn derive_auto_tags(extraction: &Extraction, user_tags: &[String]) -> Vec<String> {
	let mut auto_tags: Vec<String> = Vec::new();
	let is_new = |candidate: &str, picked: &[String]| {
		!picked.iter().any(|tag| tag == candidate) && !user_tags.iter().any(|tag| tag == candidate)
	};

	for entity in extraction.entities.iter().take(MAX_ENTITY_TAGS) {
		let text = entity.text.trim();

		if !text.is_empty() && is_new(text, &auto_tags) {
			auto_tags.push(text.to_string());
		}
	}

	for phrase in &extraction.noun_phrases {
		if auto_tags.len() >= MAX_AUTO_TAGS {
			break;
		}

		let phrase = phrase.trim();
		let single_stopword =
			!phrase.contains(char::is_whitespace) && tag::is_stopword(&phrase.to_lowercase());

		if phrase.chars().count() < 3 || single_stopword {
			continue;
		}
		if is_new(phrase, &auto_tags) {
			auto_tags.push(phrase.to_string());
		}
	}

	if auto_tags.len() < MIN_AUTO_TAGS {
		for noun in &extraction.nouns {
			if auto_tags.len() >= MAX_AUTO_TAGS {
				break;
			}

			let noun = noun.trim();

			if noun.chars().count() > 2
				&& !tag::is_stopword(&noun.to_lowercase())
				&& is_new(noun, &auto_tags)
			{
				auto_tags.push(noun.to_string());
			}
		}
	}

	auto_tags
}

/// Merges user tags with auto-tags derived from `extraction` into one normalized, sorted set.
pub fn merge_tags(user_tags: &[String], extraction: &Extraction) -> Vec<String> {
	let auto_tags = derive_auto_tags(extraction, user_tags);

	tag::normalize_tags(user_tags.iter().chain(auto_tags.iter()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entity_serializes_with_type_key() {
		let entity = Entity::new("Sparkle", "PERSON");
		let value = serde_json::to_value(&entity).expect("Entity must serialize.");

		assert_eq!(value, serde_json::json!({ "text": "Sparkle", "type": "PERSON" }));
	}

	#[test]
	fn only_three_entities_become_tags() {
		let extraction = Extraction {
			entities: ["Alpha", "Bravo", "Charlie", "Delta"]
				.into_iter()
				.map(|text| Entity::new(text, "ORG"))
				.collect(),
			..Default::default()
		};

		assert_eq!(derive_auto_tags(&extraction, &[]), vec!["Alpha", "Bravo", "Charlie"]);
	}
}
