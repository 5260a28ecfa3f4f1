use super::coerce::round_to;
use super::config::EnrichConfig;
use super::model::{Highlight, HighlightKind, Plan, SfxCatalog};
use super::sfx;

pub const CTA_ID: &str = "cta_subscribe";

const MIN_CTA_DURATION: f64 = 2.5;
const MAX_CTA_DURATION: f64 = 5.0;
/// The CTA starts this long before its segment ends.
const OUTRO_LEAD: f64 = 3.0;
const CTA_VOLUME: f64 = 0.7;

/// Append a subscribe title near the last CTA-flagged segment.
///
/// `candidates` are indices of segments whose scene aggregate carried the
/// CTA flag, in plan order. Does nothing when the plan already has a CTA or no
/// candidate exists. Returns whether a highlight was appended.
pub fn ensure_cta(
    plan: &mut Plan,
    candidates: &[usize],
    sfx_catalog: Option<&SfxCatalog>,
    config: &EnrichConfig,
) -> bool {
    if plan.highlights.iter().any(Highlight::is_cta) {
        return false;
    }
    let Some(segment) = candidates.last().and_then(|idx| plan.segments.get(*idx)) else {
        return false;
    };

    let start = segment.source_start;
    let duration = segment.duration.clamp(MIN_CTA_DURATION, MAX_CTA_DURATION);
    let highlight_start = start.max(start + segment.duration - OUTRO_LEAD);

    let applause = sfx_catalog
        .and_then(sfx::find_applause)
        .unwrap_or_else(|| config.default_cta_sfx.clone());

    plan.highlights.push(Highlight {
        id: CTA_ID.to_string(),
        kind: HighlightKind::SectionTitle,
        text: Some(config.cta_text.clone()),
        start: round_to(highlight_start, 2),
        duration: round_to(duration, 2),
        position: Some("center".to_string()),
        animation: Some("float".to_string()),
        variant: Some("brand".to_string()),
        sfx: Some(applause),
        volume: Some(CTA_VOLUME),
        ..Highlight::default()
    });
    plan.sort_highlights();
    true
}
