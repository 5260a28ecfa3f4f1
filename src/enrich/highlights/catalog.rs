//! Highlights from the structured overlay catalog.

use serde_json::{Value, json};

use crate::enrich::coerce;
use crate::enrich::config::EnrichConfig;
use crate::enrich::model::{HighlightKind, OverlayElement, Plan};
use crate::enrich::phrase::PhraseExtractor;
use crate::enrich::sfx::KEEP_SFX_KEY;

use super::{HighlightDraft, SynthesisState, layout};

const PRIMARY_KEYS: &[&str] = &["text", "main", "title", "headline", "primary"];
const LEFT_KEYS: &[&str] = &["topLeft", "left", "leftText"];
const RIGHT_KEYS: &[&str] = &["topRight", "right", "rightText"];
const CENTER_KEY: &str = "topCenter";

/// Raw texts pulled out of an overlay's `content`.
#[derive(Debug, Default, PartialEq)]
struct OverlayText {
    primary: Option<String>,
    left: Option<String>,
    right: Option<String>,
}

fn first_string(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(coerce::as_string))
}

fn overlay_text(content: &Value) -> OverlayText {
    match content {
        Value::Object(map) => {
            let mut text = OverlayText {
                primary: first_string(map, PRIMARY_KEYS),
                left: first_string(map, LEFT_KEYS),
                right: first_string(map, RIGHT_KEYS),
            };
            if let Some(center) = map.get(CENTER_KEY).and_then(coerce::as_string) {
                if text.left.is_none() {
                    text.left = Some(center);
                } else if text.right.is_none() {
                    text.right = Some(center);
                }
            }
            text
        }
        other => OverlayText {
            primary: coerce::as_string(other),
            ..OverlayText::default()
        },
    }
}

fn is_text_overlay(kind: &str) -> bool {
    let key: String = kind
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    key == "textoverlay"
}

/// Append a highlight for every usable `text_overlay` element.
///
/// Returns how many highlights were added.
pub fn synthesize_from_catalog(
    plan: &mut Plan,
    overlays: &[OverlayElement],
    extractor: &PhraseExtractor<'_>,
    config: &EnrichConfig,
    state: &mut SynthesisState,
) -> usize {
    let options = config.phrase_options();
    let mut added = 0;

    for (position, element) in overlays.iter().enumerate() {
        if !is_text_overlay(&element.kind) || element.timestamp < 0.0 {
            continue;
        }

        let texts = overlay_text(&element.content);
        let Some(primary) = texts
            .primary
            .as_deref()
            .and_then(|text| extractor.extract(text, options))
        else {
            continue;
        };

        let start = element.timestamp;
        let duration = config.clamp_highlight_duration(
            element
                .duration
                .unwrap_or(config.default_highlight_duration),
        );
        let crowded = plan
            .highlights
            .iter()
            .any(|highlight| highlight.conflicts_with(start, duration, config.highlight_min_gap));
        if crowded || state.recently_used(&primary) {
            continue;
        }

        let side_phrase = |raw: Option<&str>| {
            raw.and_then(|text| extractor.extract(text, options))
                .filter(|phrase| *phrase != primary)
        };
        let left = side_phrase(texts.left.as_deref());
        let right = side_phrase(texts.right.as_deref());
        let placement = layout::resolve(left, right, state);

        let id = element
            .id
            .clone()
            .unwrap_or_else(|| format!("overlay-{:02}", position + 1));

        let mut highlight = HighlightDraft {
            id,
            kind: HighlightKind::NoteBox,
            start,
            duration,
            text: primary.clone(),
            placement,
            source: "overlay",
            source_ref: json!(position),
        }
        .build();

        highlight.variant = element.style.clone();
        if let Some(sound) = &element.sound {
            highlight.sfx = Some(sound.clone());
            highlight
                .metadata
                .insert(KEEP_SFX_KEY.to_string(), Value::Bool(true));
        }

        state.remember_phrase(&primary);
        plan.highlights.push(highlight);
        added += 1;
    }

    plan.sort_highlights();
    added
}
