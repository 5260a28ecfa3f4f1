use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::broll::{KeywordRoute, default_routes};
use super::highlights::overrides::TextOverride;
use super::phrase::PhraseOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Minimum B-roll score for scene-driven assignment
    pub broll_threshold: f64,
    /// How many segments may reuse one catalog item via keyword matching
    pub broll_reuse_cap: usize,
    /// Fraction of the scene a catalog clip must cover
    pub broll_min_coverage: f64,
    /// Highlights starting closer than this (seconds) are duplicates
    pub highlight_min_gap: f64,
    /// Subtitles starting before this offset never become highlights
    pub subtitle_min_offset: f64,
    /// Segment gaps/overlaps below this are not reported
    pub timing_tolerance: f64,
    pub phrase_max_tokens: usize,
    pub phrase_max_chars: usize,
    pub seconds_per_word: f64,
    pub min_highlight_duration: f64,
    pub max_highlight_duration: f64,
    pub default_highlight_duration: f64,
    pub cta_text: String,
    pub default_cta_sfx: String,
    /// Ordered keyword → catalog id table; first match wins
    pub broll_routes: Vec<KeywordRoute>,
    /// Ordered literal subtitle overrides; first match wins. Empty by default
    pub subtitle_overrides: Vec<TextOverride>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            broll_threshold: Self::DEFAULT_BROLL_THRESHOLD,
            broll_reuse_cap: 2,
            broll_min_coverage: 0.8,
            highlight_min_gap: 0.4,
            subtitle_min_offset: 0.6,
            timing_tolerance: Self::DEFAULT_TIMING_TOLERANCE,
            phrase_max_tokens: 2,
            phrase_max_chars: 28,
            seconds_per_word: 0.5,
            min_highlight_duration: 1.5,
            max_highlight_duration: 5.0,
            default_highlight_duration: 2.6,
            cta_text: "Dang ky kenh de nhan video moi!".to_string(),
            default_cta_sfx: "assets/sfx/emotion/applause.mp3".to_string(),
            broll_routes: default_routes(),
            subtitle_overrides: Vec::new(),
        }
    }
}

impl EnrichConfig {
    pub const DEFAULT_BROLL_THRESHOLD: f64 = 1.5;
    pub const DEFAULT_TIMING_TOLERANCE: f64 = 0.05;

    pub fn load() -> Result<Self> {
        Self::load_from_path(enrich_config_path()?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading enrich config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents).context("parsing enrich config")?;
        Ok(config.sanitized())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("creating enrich config directory {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("serializing enrich config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing enrich config to {}", path.display()))?;
        Ok(())
    }

    /// Replace non-finite or negative numbers with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };

        self.broll_threshold = fix(self.broll_threshold, defaults.broll_threshold);
        self.broll_min_coverage = fix(self.broll_min_coverage, defaults.broll_min_coverage);
        self.highlight_min_gap = fix(self.highlight_min_gap, defaults.highlight_min_gap);
        self.subtitle_min_offset = fix(self.subtitle_min_offset, defaults.subtitle_min_offset);
        self.timing_tolerance = fix(self.timing_tolerance, defaults.timing_tolerance);
        self.seconds_per_word = fix(self.seconds_per_word, defaults.seconds_per_word);
        self.min_highlight_duration =
            fix(self.min_highlight_duration, defaults.min_highlight_duration);
        self.max_highlight_duration =
            fix(self.max_highlight_duration, defaults.max_highlight_duration);
        self.default_highlight_duration =
            fix(self.default_highlight_duration, defaults.default_highlight_duration);

        if self.max_highlight_duration < self.min_highlight_duration {
            self.max_highlight_duration = self.min_highlight_duration;
        }
        if self.phrase_max_tokens == 0 {
            self.phrase_max_tokens = defaults.phrase_max_tokens;
        }
        self
    }

    pub fn phrase_options(&self) -> PhraseOptions {
        PhraseOptions {
            max_tokens: self.phrase_max_tokens,
            max_chars: self.phrase_max_chars,
        }
    }

    pub fn clamp_highlight_duration(&self, duration: f64) -> f64 {
        duration.clamp(self.min_highlight_duration, self.max_highlight_duration)
    }
}

fn enrich_config_path() -> Result<PathBuf> {
    Ok(config_dir()
        .context("Unable to determine config directory")?
        .join("planfuse")
        .join("planfuse.toml"))
}
