//! Grammatical filtering of candidate tokens.
//!
//! A [`PosTagger`] can be wired in when a linguistic model is available. When
//! none is present, or it declines to tag a sequence, the verb deny-list
//! heuristic runs instead. Both paths return the surviving tokens in their
//! original order.

use super::lexicon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Adjective,
    Number,
    Verb,
    Adverb,
    Pronoun,
    Determiner,
    Adposition,
    Conjunction,
    Interjection,
    Other,
}

impl PartOfSpeech {
    fn is_nominal(self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Number
        )
    }
}

pub trait PosTagger {
    /// One tag per token, or `None` when the tagger cannot handle the input.
    fn tag(&self, tokens: &[String]) -> Option<Vec<PartOfSpeech>>;
}

/// Keep nouns, numbers and adjectives that modify a following nominal.
pub fn filter_with_tags(tokens: &[String], tags: &[PartOfSpeech]) -> Vec<String> {
    tokens
        .iter()
        .enumerate()
        .filter(|(idx, _)| match tags[*idx] {
            tag if tag.is_nominal() => true,
            PartOfSpeech::Adjective => tags
                .get(idx + 1)
                .is_some_and(|next| next.is_nominal()),
            _ => false,
        })
        .map(|(_, token)| token.clone())
        .collect()
}

/// Drop tokens on the verb deny-list.
pub fn filter_heuristic(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|token| !lexicon::is_denied_verb(&token.to_lowercase()))
        .cloned()
        .collect()
}

/// Tagger when it produces a usable tagging, heuristic otherwise.
///
/// An empty result falls back to the unfiltered tokens; the filter only
/// narrows a phrase, it never erases one.
pub fn grammatical_filter(tokens: &[String], tagger: Option<&dyn PosTagger>) -> Vec<String> {
    let tagged = tagger
        .and_then(|tagger| tagger.tag(tokens))
        .filter(|tags| tags.len() == tokens.len());

    let filtered = match tagged {
        Some(tags) => filter_with_tags(tokens, &tags),
        None => filter_heuristic(tokens),
    };

    if filtered.is_empty() {
        tokens.to_vec()
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SuffixTagger;

    impl PosTagger for SuffixTagger {
        fn tag(&self, tokens: &[String]) -> Option<Vec<PartOfSpeech>> {
            Some(
                tokens
                    .iter()
                    .map(|token| match token.as_str() {
                        t if t.chars().all(|c| c.is_ascii_digit()) => PartOfSpeech::Number,
                        t if t.ends_with("ful") || t.ends_with("ive") => PartOfSpeech::Adjective,
                        t if t.ends_with("ly") => PartOfSpeech::Adverb,
                        "grows" | "runs" => PartOfSpeech::Verb,
                        _ => PartOfSpeech::Noun,
                    })
                    .collect(),
            )
        }
    }

    struct DecliningTagger;

    impl PosTagger for DecliningTagger {
        fn tag(&self, _tokens: &[String]) -> Option<Vec<PartOfSpeech>> {
            None
        }
    }

    fn words(input: &str) -> Vec<String> {
        input.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn tagger_keeps_nouns_and_modifying_adjectives() {
        let tokens = words("powerful revenue grows quickly massive");
        let kept = grammatical_filter(&tokens, Some(&SuffixTagger));
        // trailing adjective has nothing to modify
        assert_eq!(kept, words("powerful revenue"));
    }

    #[test]
    fn declining_tagger_falls_back_to_heuristic() {
        let tokens = words("revenue going growth");
        let kept = grammatical_filter(&tokens, Some(&DecliningTagger));
        assert_eq!(kept, words("revenue growth"));
    }

    #[test]
    fn heuristic_drops_deny_listed_verbs() {
        let kept = filter_heuristic(&words("think pricing strategy"));
        assert_eq!(kept, words("pricing strategy"));
    }

    #[test]
    fn filter_never_empties_the_phrase() {
        let tokens = words("going make");
        assert_eq!(grammatical_filter(&tokens, None), tokens);
    }
}
