//! One enrichment run over a plan.
//!
//! Pass order is fixed: scene pass (B-roll, motion, CTA candidates, SFX hints),
//! CTA, catalog highlights, subtitle highlights, trim to plan bounds, B-roll
//! and motion from highlights, SFX attach and strip, timing validation.
//! Later passes read the highlight list exactly as earlier passes left it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::ui::prelude::{Level, emit};

use super::aggregate::aggregate_scene;
use super::broll::{self, BrollUsage};
use super::config::EnrichConfig;
use super::cta::ensure_cta;
use super::highlights::{self, SynthesisState, catalog, subtitles};
use super::model::{
    BrollCatalog, MotionRules, OverlayElement, Plan, SceneRecord, SfxCatalog, SubtitleEntry,
};
use super::motion::{self, MotionState};
use super::phrase::PhraseExtractor;
use super::sfx::{self, SfxLookup};
use super::timing::timing_warnings;

pub const DEFAULT_SEGMENT_KIND: &str = "normal";

/// Everything besides the plan that a run may draw on.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichInputs<'a> {
    pub scene_records: &'a [SceneRecord],
    pub broll_catalog: Option<&'a BrollCatalog>,
    pub sfx_catalog: Option<&'a SfxCatalog>,
    pub motion_rules: Option<&'a MotionRules>,
    pub overlays: Option<&'a [OverlayElement]>,
    pub subtitles: Option<&'a [SubtitleEntry]>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichReport {
    pub segments_total: usize,
    pub segments_skipped: usize,
    pub broll_from_scenes: usize,
    pub broll_from_highlights: usize,
    pub motion_budget: usize,
    pub motion_from_scenes: usize,
    pub motion_from_highlights: usize,
    pub catalog_highlights: usize,
    pub subtitle_highlights: usize,
    pub cta_appended: bool,
    pub highlights_clamped: usize,
    pub highlights_dropped: usize,
    pub sfx_attached: usize,
    pub sfx_stripped: usize,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Run every pass over `plan` in place.
pub fn enrich_plan(
    plan: &mut Plan,
    inputs: &EnrichInputs<'_>,
    config: &EnrichConfig,
    extractor: &PhraseExtractor<'_>,
) -> EnrichReport {
    let mut report = EnrichReport {
        segments_total: plan.segments.len(),
        ..EnrichReport::default()
    };
    let mut motion_state = inputs
        .motion_rules
        .map(|rules| MotionState::new(plan.segments.len(), rules.motion_frequency));
    report.motion_budget = motion_state.as_ref().map_or(0, |state| state.budget);

    let cta_candidates = scene_pass(plan, inputs, config, motion_state.as_mut(), &mut report);

    report.cta_appended = ensure_cta(plan, &cta_candidates, inputs.sfx_catalog, config);

    plan.sort_highlights();
    let mut synthesis = SynthesisState::default();
    if let Some(overlays) = inputs.overlays {
        report.catalog_highlights =
            catalog::synthesize_from_catalog(plan, overlays, extractor, config, &mut synthesis);
    }
    if let Some(entries) = inputs.subtitles {
        report.subtitle_highlights =
            subtitles::synthesize_from_subtitles(plan, entries, extractor, config, &mut synthesis);
    }

    let trimmed = highlights::trim_to_plan_bounds(plan);
    report.highlights_clamped = trimmed.clamped;
    report.highlights_dropped = trimmed.dropped;

    if let Some(catalog) = inputs.broll_catalog {
        let mut usage = BrollUsage::from_plan(plan);
        report.broll_from_highlights = broll::assign_from_highlights(
            plan,
            catalog,
            &config.broll_routes,
            &mut usage,
            config.broll_reuse_cap,
        );
    }
    if let (Some(rules), Some(state)) = (inputs.motion_rules, motion_state.as_mut()) {
        report.motion_from_highlights = motion::assign_from_highlights(plan, rules, state);
    }

    let available = inputs.sfx_catalog.map(SfxLookup::from_catalog);
    report.sfx_attached = sfx::attach_sfx(plan, sfx::SFX_RULES, available.as_ref());
    report.sfx_stripped = sfx::strip_sfx(plan);

    report.warnings = timing_warnings(&plan.segments, config.timing_tolerance);
    plan.push_warnings(&report.warnings);

    record_enrichment(plan, &report, Utc::now());
    report
}

/// Per-segment aggregation, scene-driven B-roll and motion.
///
/// Returns indices of segments whose aggregate carried the CTA flag.
fn scene_pass(
    plan: &mut Plan,
    inputs: &EnrichInputs<'_>,
    config: &EnrichConfig,
    mut motion_state: Option<&mut MotionState>,
    report: &mut EnrichReport,
) -> Vec<usize> {
    let mut cta_candidates = Vec::new();

    for (idx, segment) in plan.segments.iter_mut().enumerate() {
        if segment.kind.is_none() {
            segment.kind = Some(DEFAULT_SEGMENT_KIND.to_string());
        }

        let Some(scene) = aggregate_scene(segment, inputs.scene_records) else {
            segment
                .notes
                .push("No matching scene metadata; skipped B-roll and motion cue.".to_string());
            report.segments_skipped += 1;
            emit(
                Level::Debug,
                "enrich.segment.skipped",
                &format!("Segment {} has no overlapping scene records", segment.id),
                None,
            );
            continue;
        };

        let mut notes = Vec::new();

        if let Some(catalog) = inputs.broll_catalog {
            match broll::select_broll(
                &scene,
                catalog,
                config.broll_threshold,
                config.broll_min_coverage,
            ) {
                Some(pick) => {
                    notes.push(format!(
                        "B-roll assigned: {} ({})",
                        pick.item.id,
                        pick.reasons.join(", ")
                    ));
                    segment.broll = Some(pick.assignment(&scene));
                    report.broll_from_scenes += 1;
                }
                None => notes.push("No B-roll match above threshold.".to_string()),
            }
        }

        if let (Some(rules), Some(state)) = (inputs.motion_rules, motion_state.as_deref_mut()) {
            if let Some(cue) = state.assign_scene(segment, &scene, rules) {
                notes.push(format!("Motion cue assigned: {cue}"));
                report.motion_from_scenes += 1;
            }
        }

        if scene.cta {
            cta_candidates.push(idx);
        }

        if segment.sfx_hints.is_empty() && !scene.sfx_hints.is_empty() {
            notes.push(format!(
                "SFX hints propagated: {}",
                scene.sfx_hints.join(", ")
            ));
            segment.sfx_hints = scene.sfx_hints.clone();
        }

        emit(
            Level::Debug,
            "enrich.segment.scene",
            &format!(
                "Segment {}: score {:.2}, {} topic(s)",
                segment.id,
                scene.highlight_score,
                scene.topics.len()
            ),
            None,
        );
        segment.notes.extend(notes);
    }

    cta_candidates
}

/// Stamp `meta.enrichment` with the run time and pass counters.
pub fn record_enrichment(plan: &mut Plan, report: &EnrichReport, at: DateTime<Utc>) {
    let mut entry = match serde_json::to_value(report) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    entry.insert("enrichedAt".to_string(), json!(at.to_rfc3339()));
    entry.insert("warningCount".to_string(), json!(report.warnings.len()));
    plan.meta
        .insert("enrichment".to_string(), Value::Object(entry));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::coerce::records_from_value;
    use crate::enrich::model::{Highlight, MotionCue};

    fn scene_records(value: Value) -> Vec<SceneRecord> {
        records_from_value(value, &["segments"])
    }

    fn draft(value: Value) -> Plan {
        Plan::from_value(value).unwrap()
    }

    #[test]
    fn skipped_segments_get_a_note() {
        let mut plan = draft(json!({
            "segments": [{"id": "a", "sourceStart": 100, "duration": 4}]
        }));
        let report = enrich_plan(
            &mut plan,
            &EnrichInputs::default(),
            &EnrichConfig::default(),
            &PhraseExtractor::new(),
        );

        assert_eq!(report.segments_skipped, 1);
        assert_eq!(plan.segments[0].kind.as_deref(), Some("normal"));
        assert_eq!(
            plan.segments[0].notes,
            vec!["No matching scene metadata; skipped B-roll and motion cue."]
        );
    }

    #[test]
    fn scene_motion_respects_the_budget() {
        let segments: Vec<Value> = (0..10)
            .map(|idx| json!({"id": format!("s{idx}"), "sourceStart": idx * 2, "duration": 2}))
            .collect();
        let mut plan = draft(json!({ "segments": segments }));
        let records = scene_records(json!({
            "segments": [{"start": 0, "end": 20, "highlightScore": 0.9}]
        }));
        let rules: MotionRules =
            serde_json::from_value(json!({"motion_frequency": 0.3, "highlight_rate": 0.5}))
                .unwrap();
        let inputs = EnrichInputs {
            scene_records: &records,
            motion_rules: Some(&rules),
            ..EnrichInputs::default()
        };

        let report = enrich_plan(
            &mut plan,
            &inputs,
            &EnrichConfig::default(),
            &PhraseExtractor::new(),
        );
        assert_eq!(report.motion_budget, 3);
        assert_eq!(report.motion_from_scenes, 3);
        let with_cue = plan
            .segments
            .iter()
            .filter(|segment| segment.motion_cue.is_some())
            .count();
        assert_eq!(with_cue, 3);
        assert_eq!(plan.segments[0].motion_cue, Some(MotionCue::ZoomIn));
    }

    #[test]
    fn full_run_fuses_every_source() {
        let mut plan = draft(json!({
            "segments": [
                {"id": "intro", "sourceStart": 0, "duration": 6},
                {"id": "body", "sourceStart": 6, "duration": 8},
                {"id": "outro", "sourceStart": 14.3, "duration": 6}
            ],
            "highlights": [
                {"id": "planner-1", "type": "noteBox", "start": 2, "duration": 2,
                 "text": "Pricing", "sfx": "assets/sfx/ui/pop.mp3"}
            ]
        }));
        let records = scene_records(json!([
            {"start": 0, "end": 6, "topics": ["finance"], "highlightScore": 0.9,
             "tokens": ["revenue"], "sfxHints": ["emphasis"]},
            {"start": 6, "end": 14, "topics": ["health"], "highlightScore": 0.3},
            {"start": 14, "end": 20.3, "highlightScore": 0.5, "cta": true}
        ]));
        let broll_catalog = BrollCatalog::from_value(json!({"items": [
            {"id": "broll_finance", "file": "broll/finance.mp4", "topics": ["finance"],
             "keywords": ["revenue"], "mediaType": "video"},
            {"id": "broll_medical", "file": "broll/medical.mp4", "topics": ["clinic"]}
        ]}));
        let rules: MotionRules =
            serde_json::from_value(json!({"motion_frequency": 0.5, "highlight_rate": 0.7}))
                .unwrap();
        let subtitles = vec![SubtitleEntry {
            index: 3,
            start: 8.0,
            end: 11.0,
            text: "the new vaccine trial results".into(),
            duration: None,
        }];
        let inputs = EnrichInputs {
            scene_records: &records,
            broll_catalog: Some(&broll_catalog),
            motion_rules: Some(&rules),
            subtitles: Some(&subtitles),
            ..EnrichInputs::default()
        };

        let report = enrich_plan(
            &mut plan,
            &inputs,
            &EnrichConfig::default(),
            &PhraseExtractor::new(),
        );

        let intro = &plan.segments[0];
        assert_eq!(intro.broll.as_ref().unwrap().id, "broll_finance");
        assert_eq!(intro.sfx_hints, vec!["emphasis"]);
        assert_eq!(report.broll_from_scenes, 1);

        // the subtitle highlight mentions a vaccine, routing B-roll to the body
        assert_eq!(report.subtitle_highlights, 1);
        let body = &plan.segments[1];
        assert_eq!(body.broll.as_ref().unwrap().id, "broll_medical");
        assert_eq!(report.broll_from_highlights, 1);

        assert!(report.cta_appended);
        assert!(plan.highlights.iter().any(Highlight::is_cta));
        let planner = plan.highlights.iter().find(|h| h.id == "planner-1").unwrap();
        assert!(planner.sfx.is_none());

        for pair in plan.highlights.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Gap of 0.30s between body and outro"));
        assert_eq!(plan.meta["warnings"].as_array().unwrap().len(), 1);
        assert!(plan.meta["enrichment"]["enrichedAt"].is_string());
    }

    #[test]
    fn enrichment_metadata_records_counters() {
        let mut plan = Plan::default();
        let report = EnrichReport {
            segments_total: 4,
            cta_appended: true,
            warnings: vec!["w".into()],
            ..EnrichReport::default()
        };
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        record_enrichment(&mut plan, &report, at);
        let entry = &plan.meta["enrichment"];
        assert_eq!(entry["segmentsTotal"], 4);
        assert_eq!(entry["ctaAppended"], true);
        assert_eq!(entry["warningCount"], 1);
        assert_eq!(entry["enrichedAt"], "2024-05-01T10:00:00+00:00");
    }
}
