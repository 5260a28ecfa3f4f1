//! Literal subtitle overrides.
//!
//! Each entry maps an exact phrase in a subtitle line to a prebuilt
//! highlight. Entries are checked in order and the first match wins. The
//! table is empty unless the config file supplies one.

use serde::{Deserialize, Serialize};

use super::normalize_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverride {
    /// Matched against the normalized subtitle text.
    pub needle: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

impl TextOverride {
    pub fn matches(&self, normalized: &str) -> bool {
        let needle = normalize_text(&self.needle);
        !needle.is_empty() && normalized.contains(&needle)
    }
}

/// First override matching `normalized`.
pub fn find_override<'a>(overrides: &'a [TextOverride], normalized: &str) -> Option<&'a TextOverride> {
    overrides.iter().find(|entry| entry.matches(normalized))
}
