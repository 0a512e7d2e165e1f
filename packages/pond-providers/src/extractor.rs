use unicode_segmentation::UnicodeSegmentation;

use crate::Result;
use pond_domain::{
	extraction::{Entity, Extraction},
	tag,
};

/// Synchronous text analysis run on the blocking worker lane.
pub trait Extractor
where
	Self: Send + Sync,
{
	fn extract(&self, text: &str) -> Result<Extraction>;
}

const IRREGULAR_VERBS: &[(&str, &str)] = &[
	("am", "be"),
	("are", "be"),
	("ate", "eat"),
	("been", "be"),
	("bought", "buy"),
	("broke", "break"),
	("brought", "bring"),
	("built", "build"),
	("came", "come"),
	("caught", "catch"),
	("chose", "choose"),
	("did", "do"),
	("does", "do"),
	("drove", "drive"),
	("fell", "fall"),
	("felt", "feel"),
	("flew", "fly"),
	("forgot", "forget"),
	("fought", "fight"),
	("found", "find"),
	("gave", "give"),
	("got", "get"),
	("had", "have"),
	("has", "have"),
	("heard", "hear"),
	("held", "hold"),
	("is", "be"),
	("kept", "keep"),
	("knew", "know"),
	("left", "leave"),
	("lost", "lose"),
	("made", "make"),
	("meant", "mean"),
	("met", "meet"),
	("paid", "pay"),
	("ran", "run"),
	("said", "say"),
	("sat", "sit"),
	("saw", "see"),
	("sent", "send"),
	("slept", "sleep"),
	("spent", "spend"),
	("spoke", "speak"),
	("stole", "steal"),
	("stood", "stand"),
	("swam", "swim"),
	("taught", "teach"),
	("thought", "think"),
	("told", "tell"),
	("took", "take"),
	("understood", "understand"),
	("was", "be"),
	("went", "go"),
	("were", "be"),
	("woke", "wake"),
	("won", "win"),
	("wrote", "write"),
];

/// Words ending in `-ing` or `-ed` that are not verb forms.
const NOT_VERBS: &[&str] = &[
	"bed", "ceiling", "during", "evening", "feed", "hundred", "king", "morning", "need", "nothing",
	"red", "ring", "seed", "shed", "sing", "something", "speed", "spring", "string", "thing",
	"wedding", "wing",
];

/// Stems that regain a silent `e` once `-ed` or `-ing` is removed.
const SILENT_E_STEMS: &[&str] = &["at", "bl", "c", "dl", "g", "iz", "tl", "ur", "us", "v"];

const DATE_WORDS: &[&str] = &[
	"april", "august", "december", "february", "friday", "january", "july", "june", "march",
	"monday", "november", "october", "saturday", "september", "sunday", "thursday", "today",
	"tomorrow", "tonight", "tuesday", "wednesday", "yesterday",
];

const ORG_SUFFIXES: &[&str] = &["co", "corp", "corporation", "inc", "llc", "ltd", "university"];

/// Heuristic extractor with no model dependencies.
///
/// Entities are runs of capitalized words, actions are verb lemmas from an irregular table plus
/// `-ed`/`-ing` suffix rules, and noun phrases are runs of words delimited by stopwords, verbs,
/// and punctuation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleExtractor;
impl Extractor for RuleExtractor {
	fn extract(&self, text: &str) -> Result<Extraction> {
		let words = scan_words(text);
		let mut extraction = Extraction::default();
		let mut entity_run: Vec<&Word> = Vec::new();
		let mut phrase_run: Vec<&Word> = Vec::new();

		for word in &words {
			if word.clause_break_before {
				flush_entity(&mut entity_run, &mut extraction.entities);
				flush_phrase(&mut phrase_run, &mut extraction);
			}

			let lower = word.bare.to_lowercase();
			let lemma = verb_lemma(&lower);
			let stop = tag::is_stopword(&lower);

			if word.capitalized && !stop && lemma.is_none() {
				entity_run.push(word);
			} else {
				flush_entity(&mut entity_run, &mut extraction.entities);
			}

			if let Some(lemma) = lemma {
				extraction.actions.push(lemma);
				flush_phrase(&mut phrase_run, &mut extraction);
			} else if stop || word.bare.chars().all(|c| c.is_numeric()) {
				flush_phrase(&mut phrase_run, &mut extraction);
			} else {
				phrase_run.push(word);
			}
		}

		flush_entity(&mut entity_run, &mut extraction.entities);
		flush_phrase(&mut phrase_run, &mut extraction);

		Ok(extraction)
	}
}

#[derive(Debug)]
struct Word<'a> {
	/// Surface form, including a possessive suffix.
	text: &'a str,
	/// Surface form without a possessive suffix.
	bare: &'a str,
	capitalized: bool,
	clause_break_before: bool,
}

fn scan_words(text: &str) -> Vec<Word<'_>> {
	let mut words = Vec::new();
	let mut last_end = 0;

	for (start, word) in text.unicode_word_indices() {
		let gap = &text[last_end..start];
		let clause_break_before =
			gap.chars().any(|c| matches!(c, '.' | '!' | '?' | ',' | ';' | ':'));
		let bare = word
			.strip_suffix("'s")
			.or_else(|| word.strip_suffix("\u{2019}s"))
			.unwrap_or(word);

		words.push(Word {
			text: word,
			bare,
			capitalized: bare.chars().next().is_some_and(char::is_uppercase),
			clause_break_before,
		});

		last_end = start + word.len();
	}

	words
}

fn flush_entity(run: &mut Vec<&Word<'_>>, entities: &mut Vec<Entity>) {
	if run.is_empty() {
		return;
	}

	let text = run.iter().map(|word| word.bare).collect::<Vec<_>>().join(" ");
	let entity_type = entity_type(run);

	entities.push(Entity::new(text, entity_type));
	run.clear();
}

fn flush_phrase(run: &mut Vec<&Word<'_>>, extraction: &mut Extraction) {
	let Some(head) = run.last() else {
		return;
	};

	extraction.nouns.push(head.bare.to_string());

	let phrase = run.iter().map(|word| word.text).collect::<Vec<_>>().join(" ");

	extraction.noun_phrases.push(phrase);
	run.clear();
}

fn entity_type(run: &[&Word<'_>]) -> &'static str {
	let lowered: Vec<String> = run.iter().map(|word| word.bare.to_lowercase()).collect();

	if lowered.iter().all(|word| DATE_WORDS.contains(&word.as_str())) {
		return "DATE";
	}
	if lowered.last().is_some_and(|word| ORG_SUFFIXES.contains(&word.as_str())) {
		return "ORG";
	}

	"PROPN"
}

fn verb_lemma(lower: &str) -> Option<String> {
	if let Some((_, lemma)) = IRREGULAR_VERBS.iter().find(|(form, _)| *form == lower) {
		return Some((*lemma).to_string());
	}
	if NOT_VERBS.contains(&lower) || tag::is_stopword(lower) {
		return None;
	}
	if let Some(stem) = lower.strip_suffix("ied")
		&& stem.chars().count() >= 2
	{
		return Some(format!("{stem}y"));
	}

	let stem = lower
		.strip_suffix("ed")
		.filter(|stem| stem.chars().count() >= 3)
		.or_else(|| lower.strip_suffix("ing").filter(|stem| stem.chars().count() >= 3))?;

	Some(restore_stem(stem))
}

fn restore_stem(stem: &str) -> String {
	let chars: Vec<char> = stem.chars().collect();

	if let [.., a, b] = chars.as_slice()
		&& a == b
		&& !matches!(a, 'l' | 's' | 'z' | 'e' | 'o')
	{
		return chars[..chars.len() - 1].iter().collect();
	}
	if SILENT_E_STEMS.iter().any(|suffix| stem.ends_with(suffix)) {
		return format!("{stem}e");
	}

	stem.to_string()
}
