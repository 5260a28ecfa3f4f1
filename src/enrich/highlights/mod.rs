//! On-screen highlight synthesis.
//!
//! Catalog and subtitle producers append to the plan's highlight list and
//! re-sort it after each pass. Side alternation and recent-phrase memory live
//! in one [`SynthesisState`] threaded through both producers.

pub mod catalog;
pub mod layout;
pub mod overrides;
pub mod subtitles;

use std::collections::{HashSet, VecDeque};

use serde_json::{Value, json};

use super::coerce::round_to;
use super::model::{Highlight, HighlightKind, Plan, Side};
use layout::{Placement, position_for};

/// Highlights shorter than this after trimming are dropped.
pub const MIN_VISIBLE_DURATION: f64 = 0.5;

const RECENT_PHRASE_WINDOW: usize = 6;

#[derive(Debug, Clone)]
pub struct SynthesisState {
    pub side: Side,
    recent_phrases: VecDeque<String>,
    used_texts: HashSet<String>,
}

impl Default for SynthesisState {
    fn default() -> Self {
        Self {
            side: Side::Left,
            recent_phrases: VecDeque::with_capacity(RECENT_PHRASE_WINDOW),
            used_texts: HashSet::new(),
        }
    }
}

impl SynthesisState {
    /// Current side; the toggle flips for the next single-sided highlight.
    pub fn take_side(&mut self) -> Side {
        let side = self.side;
        self.side = side.flipped();
        side
    }

    pub fn recently_used(&self, phrase: &str) -> bool {
        self.recent_phrases.iter().any(|recent| recent == phrase)
    }

    pub fn remember_phrase(&mut self, phrase: &str) {
        if self.recent_phrases.len() == RECENT_PHRASE_WINDOW {
            self.recent_phrases.pop_front();
        }
        self.recent_phrases.push_back(phrase.to_string());
    }

    /// True once a highlight for this normalized text was placed.
    pub fn text_used(&self, normalized: &str) -> bool {
        self.used_texts.contains(normalized)
    }

    pub fn mark_text(&mut self, normalized: &str) {
        self.used_texts.insert(normalized.to_string());
    }
}

/// Lower-cased words joined by single spaces.
pub fn normalize_text(text: &str) -> String {
    super::phrase::tokenize(text)
        .into_iter()
        .map(|token| token.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct HighlightDraft<'a> {
    pub id: String,
    pub kind: HighlightKind,
    pub start: f64,
    pub duration: f64,
    pub text: String,
    pub placement: Placement,
    pub source: &'a str,
    pub source_ref: Value,
}

impl HighlightDraft<'_> {
    pub fn build(self) -> Highlight {
        let Placement {
            layout,
            importance,
            side,
            supporting_texts,
            stagger_offsets,
        } = self.placement;

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".to_string(), json!(self.source));
        if !self.source_ref.is_null() {
            metadata.insert("sourceRef".to_string(), self.source_ref);
        }

        Highlight {
            id: self.id,
            kind: self.kind,
            start: round_to(self.start, 2),
            duration: round_to(self.duration, 2),
            position: Some(position_for(layout).to_string()),
            layout: Some(layout),
            importance: Some(importance),
            keyword: Some(self.text.clone()),
            text: Some(self.text),
            supporting_texts,
            side,
            stagger_offsets,
            metadata,
            ..Highlight::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimOutcome {
    pub clamped: usize,
    pub dropped: usize,
}

/// Clamp every highlight into the plan's source span.
///
/// Highlights left shorter than [`MIN_VISIBLE_DURATION`] are removed. A plan
/// without valid segments is left untouched.
pub fn trim_to_plan_bounds(plan: &mut Plan) -> TrimOutcome {
    let Some((lo, hi)) = plan.bounds() else {
        return TrimOutcome::default();
    };
    let mut outcome = TrimOutcome::default();

    plan.highlights.retain_mut(|highlight| {
        let start = highlight.start.max(lo);
        let end = highlight.end().min(hi);
        if end - start < MIN_VISIBLE_DURATION {
            outcome.dropped += 1;
            return false;
        }
        if start != highlight.start || end != highlight.end() {
            highlight.start = round_to(start, 2);
            highlight.duration = round_to(end - start, 2);
            outcome.clamped += 1;
        }
        true
    });

    plan.sort_highlights();
    outcome
}
