//! Highlights from subtitle entries.
//!
//! Each accepted entry becomes one highlight placed slightly after the
//! subtitle starts. Placement never overlaps or crowds a highlight that is
//! already on the plan.

use serde_json::json;

use crate::enrich::coerce::round_to;
use crate::enrich::config::EnrichConfig;
use crate::enrich::model::{Highlight, HighlightKind, Plan, SubtitleEntry};
use crate::enrich::phrase::{PhraseExtractor, lexicon, tokenize};

use super::layout::{self, Placement};
use super::overrides::{TextOverride, find_override};
use super::{HighlightDraft, SynthesisState, normalize_text};

/// Closing remarks that never deserve a highlight.
const BLACKLIST: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "see you next time",
    "see you in the next video",
    "like and subscribe",
    "don t forget to subscribe",
    "hit the bell",
    "cảm ơn các bạn đã xem",
    "cảm ơn các bạn đã theo dõi",
    "hẹn gặp lại",
    "đăng ký kênh",
];

/// Shorter entries get a primary phrase only.
const SUPPORTING_MIN_WORDS: usize = 6;
/// Fraction of the subtitle window to wait before showing the highlight.
const LEAD_IN_RATIO: f64 = 0.15;
const MAX_LEAD_IN: f64 = 0.35;

fn is_blacklisted(normalized: &str) -> bool {
    BLACKLIST.iter().any(|phrase| normalized.contains(phrase))
}

/// Explicit duration or a reading-time estimate, whichever is longer.
fn entry_duration(entry: &SubtitleEntry, word_count: usize, config: &EnrichConfig) -> f64 {
    let estimated =
        config.clamp_highlight_duration(config.seconds_per_word * word_count as f64);
    entry
        .duration
        .filter(|duration| *duration > 0.0)
        .map_or(estimated, |explicit| explicit.max(estimated))
}

/// Split at the first transition word past the start, else at the midpoint.
/// The transition word itself belongs to neither half.
fn split_words(words: &[String]) -> (&[String], &[String]) {
    let split_at = words
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, word)| lexicon::is_split_word(&word.to_lowercase()))
        .map(|(idx, _)| idx);

    match split_at {
        Some(idx) => (&words[..idx], &words[idx + 1..]),
        None => words.split_at(words.len() / 2),
    }
}

fn override_placement(entry: &TextOverride) -> Placement {
    match (&entry.left, &entry.right) {
        (Some(left), Some(right)) => Placement::dual(left.clone(), right.clone()),
        _ => Placement::bottom(),
    }
}

/// Start inside `[entry.start, entry.end]` that clears every placed highlight.
fn place(
    highlights: &[Highlight],
    entry: &SubtitleEntry,
    duration: f64,
    min_gap: f64,
) -> Option<f64> {
    let window = (entry.end - entry.start).max(0.0);
    let first = round_to(
        entry.start + (window * LEAD_IN_RATIO).clamp(0.0, MAX_LEAD_IN),
        2,
    );
    let conflicts = |start: f64| {
        highlights
            .iter()
            .filter(|highlight| highlight.conflicts_with(start, duration, min_gap))
            .map(Highlight::end)
            .fold(None, |latest: Option<f64>, end| {
                Some(latest.map_or(end, |current| current.max(end)))
            })
    };

    let Some(latest_end) = conflicts(first) else {
        return Some(first);
    };
    let retry = round_to(latest_end + min_gap, 2);
    if retry > entry.end || conflicts(retry).is_some() {
        return None;
    }
    Some(retry)
}

/// Append highlights for subtitle entries, in time order.
///
/// Returns how many highlights were added.
pub fn synthesize_from_subtitles(
    plan: &mut Plan,
    entries: &[SubtitleEntry],
    extractor: &PhraseExtractor<'_>,
    config: &EnrichConfig,
    state: &mut SynthesisState,
) -> usize {
    let options = config.phrase_options();
    let mut ordered: Vec<&SubtitleEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut added = 0;
    for entry in ordered {
        let normalized = normalize_text(&entry.text);
        if normalized.is_empty()
            || is_blacklisted(&normalized)
            || entry.start < config.subtitle_min_offset
            || state.text_used(&normalized)
        {
            continue;
        }

        let words = tokenize(&entry.text);
        let duration = round_to(entry_duration(entry, words.len(), config), 2);

        let (phrase, placement) =
            if let Some(literal) = find_override(&config.subtitle_overrides, &normalized) {
                (literal.text.clone(), Some(override_placement(literal)))
            } else {
                let Some(primary) = extractor.extract(&entry.text, options) else {
                    continue;
                };
                (primary, None)
            };

        if state.recently_used(&phrase) {
            continue;
        }
        let Some(start) = place(&plan.highlights, entry, duration, config.highlight_min_gap)
        else {
            continue;
        };

        let placement = placement.unwrap_or_else(|| {
            let (left, right) = if words.len() >= SUPPORTING_MIN_WORDS {
                let (head, tail) = split_words(&words);
                let side = |half: &[String]| {
                    extractor
                        .extract(&half.join(" "), options)
                        .filter(|candidate| *candidate != phrase)
                };
                (side(head), side(tail))
            } else {
                (None, None)
            };
            layout::resolve(left, right, state)
        });

        let highlight = HighlightDraft {
            id: format!("srt-{}", entry.index),
            kind: HighlightKind::NoteBox,
            start,
            duration,
            text: phrase.clone(),
            placement,
            source: "subtitle",
            source_ref: json!(entry.index),
        }
        .build();

        state.mark_text(&normalized);
        state.remember_phrase(&phrase);
        plan.highlights.push(highlight);
        added += 1;
    }

    plan.sort_highlights();
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::model::{Layout, Side};

    fn entry(index: usize, start: f64, end: f64, text: &str) -> SubtitleEntry {
        SubtitleEntry {
            index,
            start,
            end,
            text: text.to_string(),
            duration: None,
        }
    }

    fn run(plan: &mut Plan, entries: &[SubtitleEntry]) -> usize {
        run_with(plan, entries, &EnrichConfig::default())
    }

    fn run_with(plan: &mut Plan, entries: &[SubtitleEntry], config: &EnrichConfig) -> usize {
        let mut state = SynthesisState::default();
        synthesize_from_subtitles(plan, entries, &PhraseExtractor::new(), config, &mut state)
    }

    #[test]
    fn early_blacklisted_and_duplicate_entries_are_skipped() {
        let entries = vec![
            entry(1, 0.2, 2.0, "pricing strategy matters"),
            entry(2, 3.0, 5.0, "Pricing strategy matters!"),
            entry(3, 10.0, 12.0, "pricing strategy matters"),
            entry(4, 20.0, 22.0, "Thanks for watching, see you soon"),
        ];
        let mut plan = Plan::default();

        assert_eq!(run(&mut plan, &entries), 1);
        assert_eq!(plan.highlights[0].id, "srt-2");
    }

    #[test]
    fn duration_follows_word_count_with_bounds() {
        let config = EnrichConfig::default();
        let short = entry(1, 0.0, 1.0, "budget");
        assert_eq!(entry_duration(&short, 1, &config), 1.5);
        assert_eq!(entry_duration(&short, 7, &config), 3.5);
        assert_eq!(entry_duration(&short, 20, &config), 5.0);

        let mut explicit = short.clone();
        explicit.duration = Some(4.2);
        assert_eq!(entry_duration(&explicit, 2, &config), 4.2);
    }

    #[test]
    fn long_entries_split_at_transition_words() {
        let words = tokenize("revenue grew quickly but margins collapsed overnight");
        let (head, tail) = split_words(&words);
        assert_eq!(head.join(" "), "revenue grew quickly");
        assert_eq!(tail.join(" "), "margins collapsed overnight");

        let words = tokenize("alpha beta gamma delta");
        let (head, tail) = split_words(&words);
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 2);
    }

    #[test]
    fn literal_overrides_bypass_extraction() {
        let config = EnrichConfig {
            subtitle_overrides: vec![TextOverride {
                needle: "quarterly revenue".into(),
                text: "Q3 REVENUE".into(),
                left: Some("SALES".into()),
                right: Some("GROWTH".into()),
            }],
            ..EnrichConfig::default()
        };
        let entries = vec![entry(
            5,
            8.0,
            11.0,
            "our Quarterly Revenue beat every forecast this year",
        )];
        let mut plan = Plan::default();

        run_with(&mut plan, &entries, &config);
        let highlight = &plan.highlights[0];
        assert_eq!(highlight.text.as_deref(), Some("Q3 REVENUE"));
        assert_eq!(highlight.layout, Some(Layout::Dual));
        assert_eq!(highlight.supporting_texts.as_ref().unwrap()[&Side::Left], "SALES");
    }

    #[test]
    fn every_spaced_entry_gets_a_highlight() {
        let topics = [
            "vaccine", "hospital", "clinic", "pharmacy", "nursing", "surgery", "therapy",
            "diagnosis", "screening", "recovery", "nutrition", "research",
        ];
        let entries: Vec<SubtitleEntry> = topics
            .iter()
            .enumerate()
            .map(|(idx, topic)| {
                let start = 1.0 + idx as f64 * 10.0;
                entry(idx + 1, start, start + 3.0, &format!("{topic} outcomes"))
            })
            .collect();
        let mut plan = Plan::default();

        assert_eq!(run(&mut plan, &entries), entries.len());
        assert_eq!(plan.highlights.len(), entries.len());
    }

    #[test]
    fn rejected_entry_does_not_consume_its_text() {
        let mut plan = Plan::default();
        plan.highlights.push(Highlight {
            id: "existing".into(),
            start: 10.0,
            duration: 5.0,
            ..Highlight::default()
        });
        let entries = vec![
            entry(1, 10.5, 11.0, "vaccine trials"),
            entry(2, 20.0, 22.0, "vaccine trials"),
        ];

        assert_eq!(run(&mut plan, &entries), 1);
        assert!(plan.highlights.iter().any(|h| h.id == "srt-2"));
        assert!(!plan.highlights.iter().any(|h| h.id == "srt-1"));
    }

    #[test]
    fn placement_shifts_past_existing_highlights() {
        let mut plan = Plan::default();
        plan.highlights.push(Highlight {
            id: "existing".into(),
            start: 10.0,
            duration: 2.0,
            ..Highlight::default()
        });
        let entries = vec![entry(1, 10.5, 16.0, "vaccine trials")];

        run(&mut plan, &entries);
        let placed = plan.highlights.iter().find(|h| h.id == "srt-1").unwrap();
        assert_eq!(placed.start, 12.4);
    }

    #[test]
    fn placed_highlights_never_overlap_or_crowd() {
        let entries: Vec<SubtitleEntry> = [
            "vaccine trials expanded",
            "clinical outcomes improved",
            "hospital capacity doubled",
            "funding gaps remain",
            "regulators approved boosters",
            "rural clinics struggled",
        ]
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            let start = 1.0 + idx as f64 * 1.2;
            entry(idx + 1, start, start + 2.5, text)
        })
        .collect();
        let mut plan = Plan::default();

        run(&mut plan, &entries);
        let placed = &plan.highlights;
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(a.start <= b.start);
                assert!(a.end() <= b.start + 1e-9, "{} overlaps {}", a.id, b.id);
                assert!(b.start - a.start >= 0.4 - 1e-9);
            }
        }
    }
}
