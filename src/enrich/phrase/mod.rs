//! Keyword phrase extraction from noisy subtitle and overlay text.

pub mod lexicon;
pub mod tagger;

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

pub use tagger::{PartOfSpeech, PosTagger};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("token regex");
}

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy)]
pub struct PhraseOptions {
    pub max_tokens: usize,
    /// `0` disables truncation.
    pub max_chars: usize,
}

impl Default for PhraseOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2,
            max_chars: 28,
        }
    }
}

impl PhraseOptions {
    pub fn with_max_tokens(self, max_tokens: usize) -> Self {
        Self { max_tokens, ..self }
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whole-word lookup of keywords in a piece of text.
///
/// Single-word terms match a token exactly; multi-word terms match a run of
/// consecutive tokens. Case-insensitive.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    tokens: Vec<String>,
    joined: String,
}

impl TermMatcher {
    pub fn new(text: &str) -> Self {
        let tokens: Vec<String> = tokenize(text)
            .into_iter()
            .map(|token| token.to_lowercase())
            .collect();
        let joined = format!(" {} ", tokens.join(" "));
        Self { tokens, joined }
    }

    pub fn matches(&self, term: &str) -> bool {
        let term_tokens: Vec<String> = tokenize(term)
            .into_iter()
            .map(|token| token.to_lowercase())
            .collect();
        match term_tokens.as_slice() {
            [] => false,
            [single] => self.tokens.contains(single),
            many => self.joined.contains(&format!(" {} ", many.join(" "))),
        }
    }

    /// First of `terms` present in the text.
    pub fn first_match<'t, I>(&self, terms: I) -> Option<&'t str>
    where
        I: IntoIterator<Item = &'t str>,
    {
        terms.into_iter().find(|term| self.matches(term))
    }

    pub fn has_digit(&self) -> bool {
        self.tokens
            .iter()
            .any(|token| token.chars().any(|c| c.is_ascii_digit()))
    }
}

#[derive(Clone, Copy, Default)]
pub struct PhraseExtractor<'a> {
    tagger: Option<&'a dyn PosTagger>,
}

impl<'a> PhraseExtractor<'a> {
    pub fn new() -> Self {
        Self { tagger: None }
    }

    pub fn with_tagger(tagger: &'a dyn PosTagger) -> Self {
        Self {
            tagger: Some(tagger),
        }
    }

    /// Content tokens of `text` in order, before the token budget applies.
    pub fn candidate_tokens(&self, text: &str) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tokens: Vec<String> = Vec::new();

        for token in tokenize(text) {
            let lower = token.to_lowercase();
            let allowed = lexicon::is_allowed_short(&lower);
            if !allowed && (lexicon::is_filler(&lower) || lexicon::is_stop_word(&lower)) {
                continue;
            }
            let numeric = lower.chars().all(|c| c.is_numeric());
            if !allowed && !numeric && lower.chars().count() < lexicon::MIN_TOKEN_CHARS {
                continue;
            }
            if seen.insert(lower) {
                tokens.push(token);
            }
        }

        if tokens.is_empty() {
            return tokens;
        }
        trim_connectors(tagger::grammatical_filter(&tokens, self.tagger))
    }

    /// Upper-cased keyword phrase, or `None` when nothing meaningful survives.
    pub fn extract(&self, text: &str, options: PhraseOptions) -> Option<String> {
        let candidates = self.candidate_tokens(text);
        let limited = candidates
            .into_iter()
            .take(options.max_tokens.max(1))
            .collect();
        let tokens = trim_connectors(limited);

        if !is_meaningful(&tokens) {
            return None;
        }

        let phrase = tokens.join(" ").to_uppercase();
        Some(truncate_chars(&phrase, options.max_chars))
    }
}

/// Heuristic-only extraction.
pub fn extract_phrase(text: &str, options: PhraseOptions) -> Option<String> {
    PhraseExtractor::new().extract(text, options)
}

fn trim_connectors(mut tokens: Vec<String>) -> Vec<String> {
    while tokens
        .last()
        .is_some_and(|token| lexicon::is_connector(&token.to_lowercase()))
    {
        tokens.pop();
    }
    let leading = tokens
        .iter()
        .take_while(|token| lexicon::is_connector(&token.to_lowercase()))
        .count();
    tokens.drain(..leading);
    tokens
}

/// False for empty input, all-generic tokens and the "first one" degenerate.
pub fn is_meaningful(tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let lowered: Vec<String> = tokens.iter().map(|token| token.to_lowercase()).collect();
    if lowered.len() == 2 && lowered[0] == "first" && lowered[1] == "one" {
        return false;
    }
    !lowered.iter().all(|token| lexicon::is_generic(token))
}

/// Same check for an already-joined phrase.
pub fn is_meaningful_phrase(phrase: &str) -> bool {
    is_meaningful(&tokenize(phrase))
}

fn truncate_chars(phrase: &str, max_chars: usize) -> String {
    if max_chars == 0 || phrase.chars().count() <= max_chars {
        return phrase.to_string();
    }
    let kept: String = phrase.chars().take(max_chars.saturating_sub(1)).collect();
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_filler_has_no_phrase() {
        assert_eq!(extract_phrase("um, yeah, okay", PhraseOptions::default()), None);
    }

    #[test]
    fn drops_articles_and_keeps_content() {
        let phrase =
            extract_phrase("the epstein barr virus infection", PhraseOptions::default()).unwrap();
        assert!(phrase.contains("EPSTEIN"));
        assert!(!phrase.split(' ').any(|word| word == "THE"));

        let longer = extract_phrase(
            "the epstein barr virus infection",
            PhraseOptions::default().with_max_tokens(3),
        )
        .unwrap();
        assert_eq!(longer, "EPSTEIN BARR VIRUS");
    }

    #[test]
    fn first_one_is_degenerate() {
        assert_eq!(
            extract_phrase("the first one", PhraseOptions::default()),
            None
        );
        assert!(!is_meaningful_phrase("FIRST ONE"));
    }

    #[test]
    fn allow_listed_short_forms_survive() {
        assert_eq!(
            extract_phrase("so the AI is in the UI", PhraseOptions::default()).as_deref(),
            Some("AI UI")
        );
    }

    #[test]
    fn numbers_are_kept_and_verbs_dropped() {
        assert_eq!(
            extract_phrase("we want 30 percent growth", PhraseOptions::default()).as_deref(),
            Some("30 PERCENT")
        );
    }

    #[test]
    fn duplicates_collapse_case_insensitively() {
        assert_eq!(
            extract_phrase("Budget budget BUDGET plan", PhraseOptions::default()).as_deref(),
            Some("BUDGET PLAN")
        );
    }

    #[test]
    fn long_phrases_are_truncated_with_ellipsis() {
        let options = PhraseOptions {
            max_tokens: 2,
            max_chars: 10,
        };
        let phrase = extract_phrase("cardiovascular rehabilitation", options).unwrap();
        assert_eq!(phrase.chars().count(), 10);
        assert!(phrase.ends_with('…'));
    }

    #[test]
    fn edge_connectors_are_trimmed() {
        let tokens = trim_connectors(vec!["vs".into(), "pricing".into(), "vs".into()]);
        assert_eq!(tokens, vec!["pricing".to_string()]);
    }

    #[test]
    fn term_matcher_respects_word_boundaries() {
        let matcher = TermMatcher::new("He said Doanh thu grew 30%");
        assert!(!matcher.matches("ai"));
        assert!(matcher.matches("doanh thu"));
        assert!(matcher.matches("GREW"));
        assert!(matcher.has_digit());
        assert_eq!(matcher.first_match(["ai", "said"]), Some("said"));
    }

    #[test]
    fn generic_only_phrase_is_not_meaningful() {
        assert!(!is_meaningful(&["things".to_string(), "people".to_string()]));
        assert!(is_meaningful(&["people".to_string(), "vaccine".to_string()]));
    }
}
