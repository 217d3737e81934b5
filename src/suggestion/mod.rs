mod parse;

pub use parse::{parse_suggestions_json, parse_suggestions_yaml};

use serde::{Deserialize, Serialize};

use crate::diff::Side;

/// What kind of problem a suggestion addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Bug,
    Security,
    Performance,
    Improvement,
    Refactor,
    Style,
    Documentation,
    #[default]
    Other,
}

impl SuggestionCategory {
    /// Lenient parse from an LLM-provided label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "bug" | "possible bug" | "possible issue" => Self::Bug,
            "security" | "vulnerability" => Self::Security,
            "performance" => Self::Performance,
            "improvement" | "enhancement" | "best practice" => Self::Improvement,
            "refactor" | "refactoring" => Self::Refactor,
            "style" | "typo" | "formatting" => Self::Style,
            "documentation" | "docs" => Self::Documentation,
            _ => Self::Other,
        }
    }
}

/// One inline code suggestion as produced by the review model.
///
/// A concrete record with explicit optionality: the mapper never probes
/// for fields at runtime. Line numbers use the numbering of `side`
/// (new file for RIGHT, old file for LEFT); `side: None` means the model
/// did not say, and the mapper applies its configured default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    pub side: Option<Side>,
    pub comment: String,
    pub category: SuggestionCategory,
    pub suggested_code: String,
    /// The code the model claims it is replacing. Used for content
    /// verification and fuzzy correction when present.
    pub existing_code: Option<String>,
}
