//! Cutaway footage selection.
//!
//! Scene-driven selection scores every catalog item against a segment's
//! aggregate. Highlight-driven selection walks an ordered keyword route table
//! and takes the first route whose catalog item is still under its reuse cap.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::aggregate::AggregatedScene;
use super::coerce::round_to;
use super::model::{
    AssignmentSource, BrollAssignment, BrollCatalog, BrollCatalogItem, BrollMode, Plan,
};
use super::phrase::TermMatcher;

/// Scenes below this score never get scene-driven B-roll.
pub const HIGH_IMPACT_SCORE: f64 = 0.6;
/// Scenes at or above this score cut to full-frame B-roll.
pub const FULL_FRAME_SCORE: f64 = 0.85;

const TOPIC_WEIGHT: f64 = 2.5;
const KEYWORD_WEIGHT: f64 = 1.0;
const MOOD_BONUS: f64 = 0.4;
const MOOD_MIN_SCORE: f64 = 0.7;
const VIDEO_BONUS: f64 = 0.3;
const LANDSCAPE_BONUS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct BrollPick<'a> {
    pub item: &'a BrollCatalogItem,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl BrollPick<'_> {
    pub fn assignment(&self, scene: &AggregatedScene) -> BrollAssignment {
        BrollAssignment {
            id: self.item.id.clone(),
            file: self.item.file.clone(),
            mode: if scene.highlight_score < FULL_FRAME_SCORE {
                BrollMode::Overlay
            } else {
                BrollMode::Full
            },
            confidence: Some(round_to(self.score, 2)),
            reasons: self.reasons.clone(),
            source: Some(AssignmentSource::Scene),
            highlight_id: None,
            extra: Default::default(),
        }
    }
}

fn lowered_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

fn format_set(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Score of one catalog item against a scene, with the reasons behind it.
pub fn score_item(item: &BrollCatalogItem, scene: &AggregatedScene) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    let topic_overlap: BTreeSet<String> = lowered_set(&item.topics)
        .intersection(&lowered_set(&scene.topics))
        .cloned()
        .collect();
    if !topic_overlap.is_empty() {
        score += TOPIC_WEIGHT * topic_overlap.len() as f64;
        reasons.push(format!("topics match [{}]", format_set(&topic_overlap)));
    }

    let token_hits: BTreeSet<String> = lowered_set(&item.keywords)
        .intersection(&lowered_set(&scene.tokens))
        .cloned()
        .collect();
    if !token_hits.is_empty() {
        score += KEYWORD_WEIGHT * token_hits.len() as f64;
        reasons.push(format!("keywords hit [{}]", format_set(&token_hits)));
    }

    if scene.highlight_score >= MOOD_MIN_SCORE && !item.mood.is_empty() {
        score += MOOD_BONUS;
        reasons.push("highlight scene prefers mood assets".to_string());
    }

    if item.media_type.as_deref() == Some("video") {
        score += VIDEO_BONUS;
    }
    if item.orientation.as_deref() == Some("landscape") {
        score += LANDSCAPE_BONUS;
    }

    if reasons.is_empty() {
        reasons.push("fallback".to_string());
    }
    (score, reasons)
}

/// Clips without a known duration are assumed long enough.
fn covers_scene(item: &BrollCatalogItem, scene: &AggregatedScene, min_coverage: f64) -> bool {
    match item.duration {
        Some(duration) => duration >= scene.duration() * min_coverage,
        None => true,
    }
}

/// Best-scoring catalog item for a high-impact scene, if it clears `threshold`.
pub fn select_broll<'a>(
    scene: &AggregatedScene,
    catalog: &'a BrollCatalog,
    threshold: f64,
    min_coverage: f64,
) -> Option<BrollPick<'a>> {
    let mut best: Option<BrollPick<'a>> = None;
    let mut best_score = 0.0;

    for item in &catalog.items {
        if !covers_scene(item, scene, min_coverage) {
            continue;
        }
        let (score, reasons) = score_item(item, scene);
        // strict: earlier items win ties
        if score > best_score {
            best_score = score;
            best = Some(BrollPick {
                item,
                score,
                reasons,
            });
        }
    }

    if best_score < threshold || scene.highlight_score < HIGH_IMPACT_SCORE {
        return None;
    }
    best
}

/// Keywords that send a highlight to one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRoute {
    pub keywords: Vec<String>,
    pub broll_id: String,
}

impl KeywordRoute {
    fn new(keywords: &[&str], broll_id: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
            broll_id: broll_id.to_string(),
        }
    }

    /// First keyword found in `text`, matched on whole words.
    pub fn matched_keyword(&self, text: &str) -> Option<&str> {
        TermMatcher::new(text).first_match(self.keywords.iter().map(String::as_str))
    }
}

pub fn default_routes() -> Vec<KeywordRoute> {
    vec![
        KeywordRoute::new(
            &["revenue", "profit", "budget", "money", "finance", "investment", "doanh thu", "tiền"],
            "broll_finance",
        ),
        KeywordRoute::new(
            &["virus", "vaccine", "doctor", "hospital", "health", "patient", "bệnh", "sức khỏe"],
            "broll_medical",
        ),
        KeywordRoute::new(
            &["percent", "chart", "data", "statistics", "growth", "số liệu", "tăng trưởng"],
            "broll_data",
        ),
        KeywordRoute::new(
            &["ai", "software", "technology", "computer", "code", "app", "công nghệ"],
            "broll_tech",
        ),
        KeywordRoute::new(
            &["team", "meeting", "office", "company", "business", "doanh nghiệp"],
            "broll_office",
        ),
        KeywordRoute::new(
            &["city", "travel", "world", "country", "thế giới"],
            "broll_city",
        ),
    ]
}

/// Per-run count of segments using each catalog item.
#[derive(Debug, Default)]
pub struct BrollUsage {
    counts: HashMap<String, usize>,
}

impl BrollUsage {
    /// Seed with assignments already on the plan.
    pub fn from_plan(plan: &Plan) -> Self {
        let mut usage = Self::default();
        for broll in plan.segments.iter().filter_map(|segment| segment.broll.as_ref()) {
            usage.record(&broll.id);
        }
        usage
    }

    pub fn record(&mut self, id: &str) {
        *self.counts.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub route: &'a KeywordRoute,
    pub keyword: &'a str,
}

/// First route matching `text` whose item exists and is under `reuse_cap`.
///
/// A matching route whose item is missing from the catalog or already used
/// `reuse_cap` times does not end the search; the next matching route is
/// tried instead.
pub fn match_by_keyword<'a>(
    text: &str,
    routes: &'a [KeywordRoute],
    catalog: &BrollCatalog,
    usage: &BrollUsage,
    reuse_cap: usize,
) -> Option<RouteMatch<'a>> {
    routes.iter().find_map(|route| {
        let keyword = route.matched_keyword(text)?;
        if catalog.get(&route.broll_id).is_none() || usage.count(&route.broll_id) >= reuse_cap {
            return None;
        }
        Some(RouteMatch { route, keyword })
    })
}

/// Give B-roll to segments that lack it, driven by highlight text.
///
/// Returns the number of segments that received an assignment.
pub fn assign_from_highlights(
    plan: &mut Plan,
    catalog: &BrollCatalog,
    routes: &[KeywordRoute],
    usage: &mut BrollUsage,
    reuse_cap: usize,
) -> usize {
    let mut assigned = 0;

    for idx in 0..plan.highlights.len() {
        let highlight = &plan.highlights[idx];
        let Some(segment_idx) = plan.segment_index_at(highlight.start) else {
            continue;
        };
        if plan.segments[segment_idx].broll.is_some() {
            continue;
        }

        let text = highlight.combined_text();
        let Some(found) = match_by_keyword(&text, routes, catalog, usage, reuse_cap) else {
            continue;
        };
        let file = catalog
            .get(&found.route.broll_id)
            .and_then(|item| item.file.clone());

        let assignment = BrollAssignment {
            id: found.route.broll_id.clone(),
            file,
            mode: BrollMode::Overlay,
            confidence: None,
            reasons: vec![format!("highlight keyword '{}'", found.keyword)],
            source: Some(AssignmentSource::Highlight),
            highlight_id: Some(highlight.id.clone()),
            extra: Default::default(),
        };
        let note = format!(
            "B-roll assigned from highlight {}: {}",
            highlight.id, assignment.id
        );

        usage.record(&assignment.id);
        let segment = &mut plan.segments[segment_idx];
        segment.broll = Some(assignment);
        segment.notes.push(note);
        assigned += 1;
    }

    assigned
}
