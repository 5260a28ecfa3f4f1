//! Rule-based sound effects on highlights, followed by a cleanup pass.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::coerce;
use super::model::{HighlightKind, Plan, SfxCatalog};
use super::phrase::TermMatcher;

/// Metadata flag that keeps a highlight's audio through [`strip_sfx`].
pub const KEEP_SFX_KEY: &str = "keepSfx";
/// Metadata entry naming the rule that attached the sound.
pub const SFX_RULE_KEY: &str = "sfxRule";

const SFX_ROOT: &str = "assets/sfx/";

#[derive(Debug, Clone, Copy)]
pub struct SfxRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Any digit in the highlight text also matches.
    pub digits: bool,
    pub path: &'static str,
    pub gain: f64,
}

/// Checked in order; the first match wins.
pub const SFX_RULES: &[SfxRule] = &[
    SfxRule {
        name: "surprise",
        keywords: &["wow", "whoa", "surprise", "shocking", "bất ngờ"],
        digits: false,
        path: "assets/sfx/whoosh/whoosh.mp3",
        gain: 0.8,
    },
    SfxRule {
        name: "celebrate",
        keywords: &[
            "celebrate",
            "success",
            "milestone",
            "chúc mừng",
            "thành công",
            "chiến thắng",
        ],
        digits: false,
        path: "assets/sfx/emotion/applause.mp3",
        gain: 0.7,
    },
    SfxRule {
        name: "figure",
        keywords: &["percent", "million", "billion", "triệu", "tỷ"],
        digits: true,
        path: "assets/sfx/emphasis/ding.mp3",
        gain: 0.9,
    },
    SfxRule {
        name: "interface",
        keywords: &["click", "button", "app", "giao diện", "ứng dụng"],
        digits: false,
        path: "assets/sfx/ui/pop.mp3",
        gain: 0.8,
    },
    SfxRule {
        name: "tech",
        keywords: &["demo", "camera", "screenshot", "digital", "robot", "công nghệ"],
        digits: false,
        path: "assets/sfx/tech/camera-click.mp3",
        gain: 0.7,
    },
];

impl SfxRule {
    fn matches(&self, text: &TermMatcher) -> bool {
        (self.digits && text.has_digit()) || text.first_match(self.keywords.iter().copied()).is_some()
    }
}

pub fn first_matching_rule<'r>(rules: &'r [SfxRule], text: &str) -> Option<&'r SfxRule> {
    let matcher = TermMatcher::new(text);
    rules.iter().find(|rule| rule.matches(&matcher))
}

/// Lookup of catalog paths by full path, path below `assets/sfx/`, file name
/// or file stem, all case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SfxLookup {
    paths: HashMap<String, String>,
}

impl SfxLookup {
    pub fn from_catalog(catalog: &SfxCatalog) -> Self {
        let mut lookup = Self::default();
        for (path, _) in catalog.entries() {
            lookup.insert(&path);
        }
        lookup
    }

    fn insert(&mut self, path: &str) {
        for key in lookup_keys(path) {
            self.paths.entry(key).or_insert_with(|| path.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Catalog path for `name`, if the catalog has it.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        lookup_keys(name)
            .into_iter()
            .find_map(|key| self.paths.get(&key))
            .map(String::as_str)
    }
}

fn lookup_keys(path: &str) -> Vec<String> {
    let lower = path.trim().replace('\\', "/").to_lowercase();
    let mut keys = vec![lower.clone()];
    if let Some(relative) = lower.strip_prefix(SFX_ROOT) {
        keys.push(relative.to_string());
    }
    let as_path = Path::new(&lower);
    if let Some(name) = as_path.file_name().and_then(|name| name.to_str()) {
        keys.push(name.to_string());
    }
    if let Some(stem) = as_path.file_stem().and_then(|stem| stem.to_str()) {
        keys.push(stem.to_string());
    }
    keys.dedup();
    keys
}

/// First catalog entry whose id mentions applause.
pub fn find_applause(catalog: &SfxCatalog) -> Option<String> {
    catalog
        .entries()
        .into_iter()
        .find(|(_, item)| item.id.to_lowercase().contains("applause"))
        .map(|(path, _)| path)
}

/// Attach a rule sound to each highlight without one.
///
/// When `available` is given, a rule whose sound is missing from it attaches
/// nothing. Returns the number of highlights that received a sound.
pub fn attach_sfx(plan: &mut Plan, rules: &[SfxRule], available: Option<&SfxLookup>) -> usize {
    let mut attached = 0;

    for highlight in plan.highlights.iter_mut().filter(|h| h.sfx.is_none()) {
        let Some(rule) = first_matching_rule(rules, &highlight.combined_text()) else {
            continue;
        };
        let path = match available {
            Some(lookup) => match lookup.resolve(rule.path) {
                Some(path) => path.to_string(),
                None => continue,
            },
            None => rule.path.to_string(),
        };

        highlight.sfx = Some(path);
        highlight.gain = Some(rule.gain);
        highlight
            .metadata
            .insert(SFX_RULE_KEY.to_string(), Value::String(rule.name.to_string()));
        highlight
            .metadata
            .insert(KEEP_SFX_KEY.to_string(), Value::Bool(true));
        attached += 1;
    }

    attached
}

/// Remove sound from every highlight that is neither a section title nor
/// marked with [`KEEP_SFX_KEY`]. Returns how many highlights lost audio.
pub fn strip_sfx(plan: &mut Plan) -> usize {
    let mut stripped = 0;

    for highlight in &mut plan.highlights {
        if highlight.kind == HighlightKind::SectionTitle {
            continue;
        }
        let keep = highlight
            .metadata
            .get(KEEP_SFX_KEY)
            .and_then(coerce::as_bool)
            .unwrap_or(false);
        if keep {
            continue;
        }

        let had_audio =
            highlight.sfx.is_some() || highlight.gain.is_some() || highlight.ducking.is_some();
        highlight.sfx = None;
        highlight.gain = None;
        highlight.ducking = None;
        if had_audio {
            stripped += 1;
        }
    }

    stripped
}
