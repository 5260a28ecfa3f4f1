//! Plan, catalog and scene-map records.
//!
//! Fields the engine does not understand are kept in flattened `extra` maps
//! so a plan survives the round trip with transitions, labels and other
//! planner output untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::coerce;
use super::error::EnrichError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Plan {
    /// Validate the top-level shape, then decode records one by one.
    ///
    /// Only a structurally wrong document is an error; individual segments or
    /// highlights that cannot be decoded are dropped.
    pub fn from_value(value: Value) -> Result<Self, EnrichError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(EnrichError::InvalidPlan(EnrichError::kind_name(&other))),
        };

        let segments = match map.remove("segments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => decode_records(items),
            Some(other) => {
                return Err(EnrichError::InvalidSegments(EnrichError::kind_name(&other)));
            }
        };

        let highlights = match map.remove("highlights") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => decode_records(items),
            Some(other) => {
                return Err(EnrichError::InvalidHighlights(EnrichError::kind_name(
                    &other,
                )));
            }
        };

        let meta = match map.remove("meta") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(meta)) => meta,
            Some(other) => return Err(EnrichError::InvalidMeta(EnrichError::kind_name(&other))),
        };

        Ok(Self {
            segments,
            highlights,
            meta,
            extra: map,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, EnrichError> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_value(value)
    }

    /// Source-timeline span covered by valid segments.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.segments
            .iter()
            .filter(|segment| segment.is_valid())
            .fold(None, |acc, segment| {
                let (lo, hi) = acc.unwrap_or((segment.source_start, segment.end()));
                Some((lo.min(segment.source_start), hi.max(segment.end())))
            })
    }

    /// Index of the valid segment whose `[sourceStart, end)` contains `time`.
    pub fn segment_index_at(&self, time: f64) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| segment.is_valid() && segment.contains(time))
    }

    pub fn push_warnings(&mut self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let entry = self
            .meta
            .entry("warnings")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(existing) = entry {
            existing.extend(warnings.iter().cloned().map(Value::String));
        }
    }

    pub fn sort_highlights(&mut self) {
        self.highlights
            .sort_by(|a, b| a.start.total_cmp(&b.start));
    }
}

fn decode_records<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub source_start: f64,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub duration: f64,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub broll: Option<BrollAssignment>,
    #[serde(default, deserialize_with = "MotionCue::lenient", skip_serializing_if = "Option::is_none")]
    pub motion_cue: Option<MotionCue>,
    #[serde(default, deserialize_with = "coerce::string_list", skip_serializing_if = "Vec::is_empty")]
    pub sfx_hints: Vec<String>,
    #[serde(default, deserialize_with = "coerce::string_list", skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    pub fn new(id: impl Into<String>, source_start: f64, duration: f64) -> Self {
        Self {
            id: id.into(),
            source_start,
            duration,
            kind: None,
            broll: None,
            motion_cue: None,
            sfx_hints: Vec::new(),
            notes: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn end(&self) -> f64 {
        self.source_start + self.duration
    }

    pub fn is_valid(&self) -> bool {
        self.duration.is_finite() && self.source_start.is_finite() && self.duration > 0.0
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.source_start && time < self.end()
    }
}

/// Camera movement attached to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotionCue {
    ZoomIn,
    ZoomOut,
    Pan,
    Shake,
}

impl MotionCue {
    pub const ALL: [MotionCue; 4] = [
        MotionCue::ZoomIn,
        MotionCue::ZoomOut,
        MotionCue::Pan,
        MotionCue::Shake,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MotionCue::ZoomIn => "zoomIn",
            MotionCue::ZoomOut => "zoomOut",
            MotionCue::Pan => "pan",
            MotionCue::Shake => "shake",
        }
    }

    /// Accepts planner spellings such as `zoom-in`, `push in` or `pullBack`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "zoomin" | "pushin" | "push" | "punchin" => Some(MotionCue::ZoomIn),
            "zoomout" | "pullback" | "pull" | "pullout" => Some(MotionCue::ZoomOut),
            "pan" | "panleft" | "panright" | "parallax" => Some(MotionCue::Pan),
            "shake" | "camerashake" | "jolt" => Some(MotionCue::Shake),
            _ => None,
        }
    }

    pub fn opposite_zoom(self) -> Self {
        match self {
            MotionCue::ZoomIn => MotionCue::ZoomOut,
            _ => MotionCue::ZoomIn,
        }
    }

    /// Unknown spellings decode as absent.
    fn lenient<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(Self::from_name))
    }
}

impl fmt::Display for MotionCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrollMode {
    #[default]
    Overlay,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Scene,
    Highlight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrollAssignment {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub mode: BrollMode,
    #[serde(default, deserialize_with = "coerce::opt_f64", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "coerce::string_list", skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub source: Option<AssignmentSource>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub highlight_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Visual treatment of a highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HighlightKind {
    #[default]
    NoteBox,
    SectionTitle,
    Icon,
    Typewriter,
    Cta,
    Other(String),
}

impl HighlightKind {
    pub fn as_str(&self) -> &str {
        match self {
            HighlightKind::NoteBox => "noteBox",
            HighlightKind::SectionTitle => "sectionTitle",
            HighlightKind::Icon => "icon",
            HighlightKind::Typewriter => "typewriter",
            HighlightKind::Cta => "cta",
            HighlightKind::Other(raw) => raw,
        }
    }

    pub fn from_name(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "" | "highlight" | "caption" | "callout" | "notebox" | "notecard" | "quote" => {
                HighlightKind::NoteBox
            }
            "typewriter" => HighlightKind::Typewriter,
            "section" | "sectiontitle" | "titlecard" | "chapter" => HighlightKind::SectionTitle,
            "icon" | "iconhighlight" => HighlightKind::Icon,
            "cta" | "calltoaction" => HighlightKind::Cta,
            _ => HighlightKind::Other(raw.trim().to_string()),
        }
    }
}

impl Serialize for HighlightKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HighlightKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(HighlightKind::from_name)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Bottom,
    Left,
    Right,
    Dual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Primary,
    Supporting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn flipped(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            Side::Left => Layout::Left,
            Side::Right => Layout::Right,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: HighlightKind,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub start: f64,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub duration: f64,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub supporting_texts: Option<BTreeMap<Side, String>>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub stagger_offsets: Option<BTreeMap<Side, f64>>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub sfx: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64", skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_f64", skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_record", skip_serializing_if = "Option::is_none")]
    pub ducking: Option<Value>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string", skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, deserialize_with = "coerce::object_or_empty", skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Highlight {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.importance, Some(Importance::Primary))
    }

    pub fn is_cta(&self) -> bool {
        self.kind == HighlightKind::Cta || self.id.to_lowercase().contains("cta")
    }

    /// Main text, keyword and supporting texts joined for keyword matching.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(text) = &self.text {
            parts.push(text);
        }
        if let Some(keyword) = &self.keyword {
            parts.push(keyword);
        }
        if let Some(supporting) = &self.supporting_texts {
            parts.extend(supporting.values().map(String::as_str));
        }
        parts.join(" ")
    }

    /// Half-open window overlap, or starts closer than `min_gap`.
    pub fn conflicts_with(&self, start: f64, duration: f64, min_gap: f64) -> bool {
        let overlaps = start < self.end() && self.start < start + duration;
        overlaps || (self.start - start).abs() < min_gap
    }
}

/// One transcript-derived window from the scene map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub start: f64,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub end: Option<f64>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub highlight_score: f64,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub motion_candidates: Vec<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub tokens: Vec<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub sfx_hints: Vec<String>,
    #[serde(default, deserialize_with = "coerce::bool_or_false")]
    pub cta: bool,
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub text_one_line: String,
}

impl SceneRecord {
    /// A record without an end collapses to its start.
    pub fn end(&self) -> f64 {
        self.end.unwrap_or(self.start)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrollCatalogItem {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub mood: Vec<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub orientation: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct BrollCatalog {
    pub items: Vec<BrollCatalogItem>,
}

impl BrollCatalog {
    pub fn from_value(value: Value) -> Self {
        Self {
            items: coerce::records_from_value(value, &["items", "broll"]),
        }
    }

    pub fn get(&self, id: &str) -> Option<&BrollCatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SfxItem {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SfxCategory {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_record")]
    pub items: Option<Vec<SfxItem>>,
}

/// Sound-effect catalog, either grouped by category or a flat item list.
#[derive(Debug, Clone, Default)]
pub struct SfxCatalog {
    pub categories: Vec<SfxCategory>,
    pub items: Vec<SfxItem>,
}

impl SfxCatalog {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self {
                categories: coerce::records_from_value(value.clone(), &["categories"]),
                items: coerce::records_from_value(value, &["items"]),
            },
            other => Self {
                categories: Vec::new(),
                items: coerce::records_from_value(other, &[]),
            },
        }
    }

    /// `(path, item)` for every entry; items without `file` resolve to
    /// `assets/sfx/<category>/<id>`.
    pub fn entries(&self) -> Vec<(String, &SfxItem)> {
        let mut entries = Vec::new();
        for category in &self.categories {
            for item in category.items.iter().flatten() {
                let path = item
                    .file
                    .clone()
                    .unwrap_or_else(|| format!("assets/sfx/{}/{}", category.id, item.id));
                entries.push((path, item));
            }
        }
        for item in &self.items {
            let path = item
                .file
                .clone()
                .unwrap_or_else(|| format!("assets/sfx/{}", item.id));
            entries.push((path, item));
        }
        entries
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotionRules {
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub motion_frequency: f64,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub highlight_rate: f64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl MotionRules {
    /// `<name>_keywords` lists in key order, lower-cased.
    pub fn keyword_sets(&self) -> Vec<(String, Vec<String>)> {
        self.rest
            .iter()
            .filter_map(|(key, value)| {
                let name = key.strip_suffix("_keywords")?;
                let keywords = coerce::as_string_list(value)
                    .into_iter()
                    .map(|keyword| keyword.to_lowercase())
                    .collect();
                Some((name.to_string(), keywords))
            })
            .collect()
    }

    pub fn keywords_for(&self, cue: MotionCue) -> Vec<String> {
        self.keyword_sets()
            .into_iter()
            .filter(|(name, _)| MotionCue::from_name(name) == Some(cue))
            .flat_map(|(_, keywords)| keywords)
            .collect()
    }
}

/// Timestamped element from the structured overlay catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayElement {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default, alias = "start", deserialize_with = "coerce::f64_or_zero")]
    pub timestamp: f64,
    #[serde(rename = "type", default, deserialize_with = "coerce::string_or_empty")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub sound: Option<String>,
}

/// Subtitle line with source timing in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubtitleEntry {
    /// `0` when absent or unusable; callers fall back to the entry position.
    #[serde(default, deserialize_with = "coerce::usize_or_zero")]
    pub index: usize,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub start: f64,
    #[serde(default, deserialize_with = "coerce::f64_or_zero")]
    pub end: f64,
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub duration: Option<f64>,
}
