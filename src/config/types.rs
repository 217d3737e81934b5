use serde::{Deserialize, Serialize};

use crate::diff::Side;

/// Top-level configuration. Each field maps to a TOML `[section]`.
/// Uses `#[serde(default)]` so missing sections gracefully fall back.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub mapping: MappingConfig,
}

/// Policy knobs for suggestion-to-anchor resolution.
///
/// Constructed from config and handed to `LineMapper` explicitly; there is
/// no process-wide settings singleton in this crate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Minimum similarity ratio (0–1) for fuzzy content correction.
    pub similarity_threshold: f32,
    /// Maximum distance, in lines, for the nearest-line fallback.
    pub search_radius: usize,
    /// Side assumed when a suggestion omits one.
    pub default_side: Side,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            search_radius: 5,
            default_side: Side::Right,
        }
    }
}
