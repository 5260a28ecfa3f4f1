use std::collections::HashMap;

use super::model::{SceneRecord, Segment};

const TOP_TOPICS: usize = 6;
const TOP_TOKENS: usize = 24;
const TOP_SFX_HINTS: usize = 8;

/// Scene metadata fused over one segment's source window.
#[derive(Debug, Clone, Default)]
pub struct AggregatedScene {
    pub start: f64,
    pub end: f64,
    pub topics: Vec<String>,
    pub highlight_score: f64,
    pub motion_candidates: Vec<String>,
    pub tokens: Vec<String>,
    pub sfx_hints: Vec<String>,
    pub cta: bool,
    pub text: String,
}

impl AggregatedScene {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Insertion-ordered counter; ties keep first-seen order.
#[derive(Debug, Default)]
struct Histogram {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Histogram {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    fn most_common(mut self, limit: usize) -> Vec<String> {
        // sort_by is stable, so equal counts stay in first-seen order
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
            .into_iter()
            .take(limit)
            .map(|(key, _)| key)
            .collect()
    }
}

pub fn overlap_seconds(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// `zoom-in` → `zoomIn`, `slide up` → `slideUp`.
pub fn camel_case_motion(name: &str) -> String {
    let normalized = name.trim().replace(['-', ' '], "_").to_lowercase();
    let mut parts = normalized.split('_').filter(|part| !part.is_empty());
    let Some(first) = parts.next() else {
        return String::new();
    };

    let mut out = first.to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Fuse every scene record overlapping `segment`, weighted by overlap seconds.
///
/// Returns `None` for invalid segments and for segments no record touches.
pub fn aggregate_scene(segment: &Segment, records: &[SceneRecord]) -> Option<AggregatedScene> {
    if !segment.is_valid() {
        return None;
    }
    let start = segment.source_start;
    let end = segment.end();

    let mut topics = Histogram::default();
    let mut tokens = Histogram::default();
    let mut sfx_hints = Histogram::default();
    let mut motion_candidates: Vec<String> = Vec::new();
    let mut texts: Vec<&str> = Vec::new();
    let mut weighted_score = 0.0;
    let mut total_weight = 0.0;
    let mut cta = false;

    for record in records {
        let weight = overlap_seconds(start, end, record.start, record.end());
        if weight <= 0.0 {
            continue;
        }

        record.topics.iter().for_each(|topic| topics.add(topic));
        record
            .tokens
            .iter()
            .for_each(|token| tokens.add(&token.to_lowercase()));
        record.sfx_hints.iter().for_each(|hint| sfx_hints.add(hint));

        for candidate in &record.motion_candidates {
            let name = camel_case_motion(candidate);
            if !name.is_empty() && !motion_candidates.contains(&name) {
                motion_candidates.push(name);
            }
        }

        weighted_score += record.highlight_score * weight;
        total_weight += weight;

        if !record.text_one_line.is_empty() {
            texts.push(&record.text_one_line);
        }
        cta |= record.cta;
    }

    if total_weight <= 0.0 {
        return None;
    }

    Some(AggregatedScene {
        start,
        end,
        topics: topics.most_common(TOP_TOPICS),
        highlight_score: weighted_score / total_weight,
        motion_candidates,
        tokens: tokens.most_common(TOP_TOKENS),
        sfx_hints: sfx_hints.most_common(TOP_SFX_HINTS),
        cta,
        text: texts.join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: f64, end: f64, score: f64) -> SceneRecord {
        SceneRecord {
            start,
            end: Some(end),
            highlight_score: score,
            ..SceneRecord::default()
        }
    }

    #[test]
    fn highlight_score_is_overlap_weighted() {
        let segment = Segment::new("s1", 10.0, 10.0);
        let records = vec![
            record(12.0, 16.0, 0.8),
            record(18.0, 25.0, 0.2),
            record(30.0, 31.0, 1.0),
        ];

        let scene = aggregate_scene(&segment, &records).unwrap();
        assert!((scene.highlight_score - 0.6).abs() < 1e-9);
        assert_eq!(scene.duration(), 10.0);
    }

    #[test]
    fn no_overlap_means_no_aggregate() {
        let segment = Segment::new("s1", 100.0, 5.0);
        assert!(aggregate_scene(&segment, &[record(0.0, 10.0, 0.9)]).is_none());
    }

    #[test]
    fn invalid_segment_is_skipped() {
        let segment = Segment::new("s1", 0.0, 0.0);
        assert!(aggregate_scene(&segment, &[record(0.0, 10.0, 0.9)]).is_none());
    }

    #[test]
    fn histograms_rank_by_count_then_first_seen() {
        let segment = Segment::new("s1", 0.0, 10.0);
        let mut first = record(0.0, 5.0, 0.5);
        first.topics = vec!["health".into(), "finance".into()];
        first.motion_candidates = vec!["zoom-in".into()];
        first.text_one_line = "first line".into();
        let mut second = record(5.0, 10.0, 0.5);
        second.topics = vec!["finance".into(), "travel".into()];
        second.motion_candidates = vec!["zoom_in".into(), "pan".into()];
        second.cta = true;
        second.text_one_line = "second line".into();

        let scene = aggregate_scene(&segment, &[first, second]).unwrap();
        assert_eq!(scene.topics, vec!["finance", "health", "travel"]);
        assert_eq!(scene.motion_candidates, vec!["zoomIn", "pan"]);
        assert!(scene.cta);
        assert_eq!(scene.text, "first line second line");
    }

    #[test]
    fn camel_case_handles_separators() {
        assert_eq!(camel_case_motion("zoom-in"), "zoomIn");
        assert_eq!(camel_case_motion("Slide Up"), "slideUp");
        assert_eq!(camel_case_motion("  "), "");
    }
}
