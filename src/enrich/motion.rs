//! Camera-motion cues under a plan-wide budget.

use std::collections::HashSet;

use super::aggregate::AggregatedScene;
use super::model::{Highlight, MotionCue, MotionRules, Plan, Segment};
use super::phrase::TermMatcher;

const PAN_MIN_SCORE: f64 = 0.4;
const PAN_MIN_DURATION: f64 = 5.0;
const ZOOM_OUT_MIN_DURATION: f64 = 3.0;

/// Phrases that call for pulling back, on top of the rules' `zoom_out_keywords`.
const ZOOM_OUT_TRIGGERS: &[&str] = &[
    "overview",
    "big picture",
    "overall",
    "in total",
    "compared",
    "toàn cảnh",
    "tổng quan",
    "tổng cộng",
];

/// Highlight animation names that imply a camera move.
const ANIMATION_HINTS: &[(&str, MotionCue)] = &[
    ("zoom", MotionCue::ZoomIn),
    ("pop", MotionCue::ZoomIn),
    ("punch", MotionCue::ZoomIn),
    ("slide", MotionCue::Pan),
    ("pan", MotionCue::Pan),
    ("pulse", MotionCue::Shake),
    ("bounce", MotionCue::Shake),
    ("shake", MotionCue::Shake),
];

/// Keyword sets are consulted in this order.
const KEYWORD_ORDER: [MotionCue; 4] = [
    MotionCue::ZoomOut,
    MotionCue::Shake,
    MotionCue::Pan,
    MotionCue::ZoomIn,
];

/// Run state shared by the scene and highlight passes.
#[derive(Debug, Clone)]
pub struct MotionState {
    pub budget: usize,
    pub assigned: usize,
    pub last_motion: Option<MotionCue>,
    /// Segments whose cue came from a primary highlight.
    priority: HashSet<usize>,
}

impl MotionState {
    pub fn new(segment_count: usize, motion_frequency: f64) -> Self {
        let frequency = if motion_frequency.is_finite() {
            motion_frequency.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let budget = ((segment_count as f64) * frequency).ceil() as usize;
        Self {
            budget: budget.max(1),
            assigned: 0,
            last_motion: None,
            priority: HashSet::new(),
        }
    }

    pub fn has_budget(&self) -> bool {
        self.assigned < self.budget
    }

    /// Scene-driven cue for one segment, if the budget allows one.
    pub fn assign_scene(
        &mut self,
        segment: &mut Segment,
        scene: &AggregatedScene,
        rules: &MotionRules,
    ) -> Option<MotionCue> {
        if !self.has_budget() {
            return None;
        }
        let cue = scene_cue(scene, rules)?;
        segment.motion_cue = Some(cue);
        self.assigned += 1;
        self.last_motion = Some(cue);
        Some(cue)
    }
}

/// Explicit candidate first, then score/duration fallbacks.
pub fn scene_cue(scene: &AggregatedScene, rules: &MotionRules) -> Option<MotionCue> {
    if let Some(cue) = scene
        .motion_candidates
        .iter()
        .find_map(|candidate| MotionCue::from_name(candidate))
    {
        return Some(cue);
    }

    let score = scene.highlight_score;
    let duration = scene.duration();
    if score >= rules.highlight_rate {
        Some(MotionCue::ZoomIn)
    } else if score >= PAN_MIN_SCORE && duration > PAN_MIN_DURATION {
        Some(MotionCue::Pan)
    } else if score < PAN_MIN_SCORE && duration > ZOOM_OUT_MIN_DURATION {
        Some(MotionCue::ZoomOut)
    } else {
        None
    }
}

fn contains_keyword(text: &TermMatcher, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| text.matches(keyword))
}

/// What a highlight asks for, and whether it came from an explicit rule.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HighlightCue {
    cue: MotionCue,
    explicit: bool,
}

fn primary_cue(text: &TermMatcher, rules: &MotionRules, last: Option<MotionCue>) -> HighlightCue {
    let wants_zoom_out = text.has_digit()
        || text.first_match(ZOOM_OUT_TRIGGERS.iter().copied()).is_some()
        || contains_keyword(text, &rules.keywords_for(MotionCue::ZoomOut));

    let cue = if wants_zoom_out && last != Some(MotionCue::ZoomOut) {
        MotionCue::ZoomOut
    } else {
        last.map(MotionCue::opposite_zoom).unwrap_or(MotionCue::ZoomIn)
    };
    HighlightCue {
        cue,
        explicit: true,
    }
}

fn supporting_cue(
    text: &TermMatcher,
    highlight: &Highlight,
    rules: &MotionRules,
    last: Option<MotionCue>,
) -> HighlightCue {
    if let Some(cue) = KEYWORD_ORDER
        .into_iter()
        .find(|cue| contains_keyword(text, &rules.keywords_for(*cue)))
    {
        return HighlightCue {
            cue,
            explicit: true,
        };
    }

    if let Some(animation) = highlight.animation.as_deref().map(str::to_lowercase) {
        if let Some((_, cue)) = ANIMATION_HINTS
            .iter()
            .find(|(hint, _)| animation.contains(hint))
        {
            return HighlightCue {
                cue: *cue,
                explicit: true,
            };
        }
    }

    HighlightCue {
        cue: last.map(MotionCue::opposite_zoom).unwrap_or(MotionCue::ZoomIn),
        explicit: false,
    }
}

/// Re-derive motion from highlights, in time order.
///
/// Primary highlights may replace scene cues; other highlights fill empty
/// segments and only replace a scene cue on an explicit rule match. A cue set
/// by a primary highlight is never replaced. Filling an empty segment spends
/// budget; replacing an existing cue does not.
pub fn assign_from_highlights(plan: &mut Plan, rules: &MotionRules, state: &mut MotionState) -> usize {
    let mut changed = 0;

    for idx in 0..plan.highlights.len() {
        let highlight = &plan.highlights[idx];
        let Some(segment_idx) = plan.segment_index_at(highlight.start) else {
            continue;
        };
        if state.priority.contains(&segment_idx) {
            continue;
        }

        let text = TermMatcher::new(&highlight.combined_text());
        let primary = highlight.is_primary();
        let wanted = if primary {
            primary_cue(&text, rules, state.last_motion)
        } else {
            supporting_cue(&text, highlight, rules, state.last_motion)
        };
        let highlight_id = highlight.id.clone();

        let segment = &mut plan.segments[segment_idx];
        match segment.motion_cue {
            Some(existing) if existing == wanted.cue => {}
            Some(_) if !(primary || wanted.explicit) => continue,
            Some(_) => {
                segment.motion_cue = Some(wanted.cue);
                segment.notes.push(format!(
                    "Motion cue replaced from highlight {highlight_id}: {}",
                    wanted.cue
                ));
                changed += 1;
            }
            None => {
                if !state.has_budget() {
                    continue;
                }
                state.assigned += 1;
                segment.motion_cue = Some(wanted.cue);
                segment.notes.push(format!(
                    "Motion cue assigned from highlight {highlight_id}: {}",
                    wanted.cue
                ));
                changed += 1;
            }
        }

        state.last_motion = Some(wanted.cue);
        if primary {
            state.priority.insert(segment_idx);
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::model::Importance;
    use serde_json::json;

    fn rules(value: serde_json::Value) -> MotionRules {
        serde_json::from_value(value).unwrap()
    }

    fn scene(score: f64, duration: f64, candidates: &[&str]) -> AggregatedScene {
        AggregatedScene {
            start: 0.0,
            end: duration,
            highlight_score: score,
            motion_candidates: candidates.iter().map(|s| s.to_string()).collect(),
            ..AggregatedScene::default()
        }
    }

    fn highlight(id: &str, start: f64, text: &str, importance: Importance) -> Highlight {
        Highlight {
            id: id.into(),
            start,
            duration: 1.5,
            text: Some(text.into()),
            importance: Some(importance),
            ..Highlight::default()
        }
    }

    #[test]
    fn budget_rounds_up_with_a_floor_of_one() {
        assert_eq!(MotionState::new(10, 0.3).budget, 3);
        assert_eq!(MotionState::new(10, 0.0).budget, 1);
        assert_eq!(MotionState::new(7, 0.5).budget, 4);
    }

    #[test]
    fn scene_budget_caps_assignments() {
        let rules = rules(json!({"motion_frequency": 0.3, "highlight_rate": 0.5}));
        let mut state = MotionState::new(10, rules.motion_frequency);
        let mut assigned = 0;
        for idx in 0..10 {
            let mut segment = Segment::new(format!("s{idx}"), idx as f64, 1.0);
            if state
                .assign_scene(&mut segment, &scene(0.9, 1.0, &[]), &rules)
                .is_some()
            {
                assigned += 1;
            }
        }
        assert_eq!(assigned, 3);
    }

    #[test]
    fn scene_cue_prefers_candidates_then_falls_back() {
        let rules = rules(json!({"highlight_rate": 0.7}));
        assert_eq!(
            scene_cue(&scene(0.1, 1.0, &["wobble", "pan"]), &rules),
            Some(MotionCue::Pan)
        );
        assert_eq!(scene_cue(&scene(0.8, 1.0, &[]), &rules), Some(MotionCue::ZoomIn));
        assert_eq!(scene_cue(&scene(0.5, 6.0, &[]), &rules), Some(MotionCue::Pan));
        assert_eq!(scene_cue(&scene(0.2, 4.0, &[]), &rules), Some(MotionCue::ZoomOut));
        assert_eq!(scene_cue(&scene(0.5, 4.0, &[]), &rules), None);
    }

    fn plan_with(segments: usize) -> Plan {
        let mut plan = Plan::default();
        for idx in 0..segments {
            plan.segments
                .push(Segment::new(format!("s{idx}"), idx as f64 * 5.0, 5.0));
        }
        plan
    }

    #[test]
    fn primary_highlights_alternate_zoom() {
        let mut plan = plan_with(3);
        plan.highlights = vec![
            highlight("a", 1.0, "PRICING", Importance::Primary),
            highlight("b", 6.0, "STRATEGY", Importance::Primary),
            highlight("c", 11.0, "30 PERCENT", Importance::Primary),
        ];
        let rules = rules(json!({"motion_frequency": 1.0}));
        let mut state = MotionState::new(3, 1.0);

        assign_from_highlights(&mut plan, &rules, &mut state);
        let cues: Vec<_> = plan.segments.iter().map(|s| s.motion_cue).collect();
        assert_eq!(
            cues,
            vec![
                Some(MotionCue::ZoomIn),
                Some(MotionCue::ZoomOut),
                Some(MotionCue::ZoomIn)
            ]
        );
    }

    #[test]
    fn digits_pull_back_unless_just_pulled_back() {
        let rules = rules(json!({}));
        let first = primary_cue(&TermMatcher::new("30 percent"), &rules, None);
        assert_eq!(first.cue, MotionCue::ZoomOut);
        let repeat = primary_cue(
            &TermMatcher::new("40 percent"),
            &rules,
            Some(MotionCue::ZoomOut),
        );
        assert_eq!(repeat.cue, MotionCue::ZoomIn);
    }

    #[test]
    fn supporting_highlights_respect_scene_cues() {
        let mut plan = plan_with(2);
        plan.segments[0].motion_cue = Some(MotionCue::Pan);
        plan.highlights = vec![
            highlight("a", 1.0, "PRICING", Importance::Supporting),
            highlight("b", 6.0, "BOOM", Importance::Supporting),
        ];
        let rules = rules(json!({"motion_frequency": 0.5, "shake_keywords": ["boom"]}));
        let mut state = MotionState::new(2, 0.5);
        state.assigned = 1;

        assign_from_highlights(&mut plan, &rules, &mut state);
        assert_eq!(plan.segments[0].motion_cue, Some(MotionCue::Pan));
        // budget of 1 is already spent by the scene cue
        assert_eq!(plan.segments[1].motion_cue, None);

        plan.highlights[0].text = Some("BOOM".into());
        assign_from_highlights(&mut plan, &rules, &mut state);
        assert_eq!(plan.segments[0].motion_cue, Some(MotionCue::Shake));
    }

    #[test]
    fn primary_cues_are_never_replaced() {
        let mut plan = plan_with(1);
        plan.highlights = vec![
            highlight("a", 1.0, "PRICING", Importance::Primary),
            highlight("b", 3.0, "BOOM", Importance::Supporting),
        ];
        let rules = rules(json!({"motion_frequency": 1.0, "shake_keywords": ["boom"]}));
        let mut state = MotionState::new(1, 1.0);

        assign_from_highlights(&mut plan, &rules, &mut state);
        assert_eq!(plan.segments[0].motion_cue, Some(MotionCue::ZoomIn));
        assert_eq!(state.assigned, 1);
    }

    #[test]
    fn animation_hints_pick_a_cue() {
        let rules = rules(json!({}));
        let mut slide = highlight("a", 0.0, "PRICING", Importance::Supporting);
        slide.animation = Some("slideUp".into());
        let wanted = supporting_cue(&TermMatcher::new("pricing"), &slide, &rules, None);
        assert_eq!(wanted.cue, MotionCue::Pan);
        assert!(wanted.explicit);
    }
}
