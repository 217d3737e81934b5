use std::collections::HashMap;
use std::fmt;

use crate::config::types::MappingConfig;
use crate::diff::{ParsedFileDiff, Side};
use crate::mapping::similarity::{find_best_window, normalize_first_line, normalize_snippet};
use crate::suggestion::Suggestion;

/// How a suggestion's claimed location was turned into a diff position.
/// Ordered from highest to lowest confidence; logged for quality auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Claimed line was commentable and its content matched `existing_code`.
    ExactContentMatch,
    /// Claimed line was commentable; no content available to verify.
    LineNumberMatch,
    /// Anchor moved to the best fuzzy content match for `existing_code`.
    ContentCorrected,
    /// Claimed line was not commentable; nudged to the nearest one.
    Adjusted { from: usize },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::ExactContentMatch => f.write_str("exact_content_match"),
            Provenance::LineNumberMatch => f.write_str("line_number_match"),
            Provenance::ContentCorrected => f.write_str("content_corrected"),
            Provenance::Adjusted { from } => write!(f, "adjusted_from_{from}"),
        }
    }
}

/// A resolved comment anchor: position for position-based review APIs,
/// line + side for line-based ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub position: usize,
    pub line: usize,
    pub side: Side,
    pub provenance: Provenance,
}

/// Maps LLM code suggestions onto valid inline-comment anchors.
///
/// Holds only borrowed, immutable parsed diffs; `resolve` is pure, so one
/// mapper can serve concurrent callers.
pub struct LineMapper<'a> {
    file_map: HashMap<&'a str, &'a ParsedFileDiff>,
    config: MappingConfig,
}

impl<'a> LineMapper<'a> {
    pub fn new(parsed_files: &'a [ParsedFileDiff]) -> Self {
        Self::with_config(parsed_files, MappingConfig::default())
    }

    pub fn with_config(parsed_files: &'a [ParsedFileDiff], config: MappingConfig) -> Self {
        let file_map = parsed_files
            .iter()
            .map(|pf| (pf.file_path.as_str(), pf))
            .collect();
        Self { file_map, config }
    }

    pub fn files(&self) -> impl Iterator<Item = &ParsedFileDiff> {
        self.file_map.values().copied()
    }

    /// Resolve one suggestion to a comment anchor.
    ///
    /// Tries, in order: exact line + content verification, fuzzy content
    /// correction, plain line-number match, and (unless `strict`) a
    /// nearest-commentable-line fallback. Returns `None` when the
    /// suggestion cannot be mapped; the caller drops it without failing
    /// the batch.
    pub fn resolve(&self, suggestion: &Suggestion, strict: bool) -> Option<ResolvedAnchor> {
        if suggestion.file.is_empty() || suggestion.end_line == 0 {
            tracing::warn!(
                file = %suggestion.file,
                end_line = suggestion.end_line,
                "suggestion missing file or end line, dropping"
            );
            return None;
        }

        // Models frequently echo the diff's `a/`/`b/` path prefixes back.
        let file_name = suggestion
            .file
            .strip_prefix("a/")
            .or_else(|| suggestion.file.strip_prefix("b/"))
            .unwrap_or(&suggestion.file);

        let Some(file) = self.file_map.get(file_name).copied() else {
            tracing::warn!(file = %suggestion.file, "suggestion file not in diff, dropping");
            return None;
        };

        let side = suggestion.side.unwrap_or(self.config.default_side);
        let line = suggestion.end_line;
        let existing = suggestion.existing_code.as_deref().filter(|s| !s.trim().is_empty());

        // Exact line + content verification. Highest confidence; skips
        // fuzzy search entirely.
        if let Some(position) = file.position_of(line, side)
            && let Some(snippet) = existing
            && let Some(expected) = normalize_first_line(snippet)
            && let Some(rec) = file.record_at_position(position)
            && normalize_snippet([rec.code()]) == expected
        {
            tracing::info!(file = %file.file_path, line, %side, "exact content match");
            return Some(ResolvedAnchor {
                position,
                line,
                side,
                provenance: Provenance::ExactContentMatch,
            });
        }

        // Content-based correction: move the anchor to the last commentable
        // line of the best fuzzy match for the claimed existing code.
        if let Some(snippet) = existing {
            match find_best_window(file, snippet, self.config.similarity_threshold) {
                Some(range) => {
                    if let Some((new_line, new_side)) = file.lines()[range]
                        .iter()
                        .filter_map(|r| r.anchor_key())
                        .last()
                    {
                        let corrected = (new_line, new_side) != (line, side);
                        if corrected {
                            tracing::info!(
                                file = %file.file_path,
                                from = line,
                                to = new_line,
                                side = %new_side,
                                "corrected anchor via content match"
                            );
                        }
                        return self.finish(file, new_line, new_side, corrected, strict, suggestion);
                    }
                    tracing::warn!(
                        file = %file.file_path,
                        "content match window has no commentable line"
                    );
                }
                None => tracing::warn!(
                    file = %file.file_path,
                    line,
                    "existing code matched nothing in diff, keeping claimed line"
                ),
            }
        }

        self.finish(file, line, side, false, strict, suggestion)
    }

    /// Shared tail of `resolve`: commentable re-check, strict gate,
    /// nearest-line fallback.
    fn finish(
        &self,
        file: &ParsedFileDiff,
        line: usize,
        side: Side,
        corrected: bool,
        strict: bool,
        suggestion: &Suggestion,
    ) -> Option<ResolvedAnchor> {
        if let Some(position) = file.position_of(line, side) {
            return Some(ResolvedAnchor {
                position,
                line,
                side,
                provenance: if corrected {
                    Provenance::ContentCorrected
                } else {
                    Provenance::LineNumberMatch
                },
            });
        }

        if strict {
            tracing::warn!(
                file = %file.file_path,
                line,
                %side,
                "strict mode: line not commentable, dropping suggestion"
            );
            return None;
        }

        if let Some(anchor) = self.nearest_commentable(file, line, side) {
            tracing::warn!(
                file = %file.file_path,
                from = line,
                to = anchor.line,
                side = %anchor.side,
                "adjusted suggestion to nearest commentable line"
            );
            return Some(anchor);
        }

        tracing::error!(
            file = %file.file_path,
            line,
            %side,
            start_line = suggestion.start_line,
            "no commentable line found, dropping suggestion"
        );
        None
    }

    /// Search outward from `line` (1..=radius, both directions per step) on
    /// the same side, then try the opposite side at the original line.
    fn nearest_commentable(
        &self,
        file: &ParsedFileDiff,
        line: usize,
        side: Side,
    ) -> Option<ResolvedAnchor> {
        for offset in 1..=self.config.search_radius {
            let below = line.checked_sub(offset);
            let above = line.checked_add(offset);
            for candidate in below.into_iter().chain(above) {
                if let Some(position) = file.position_of(candidate, side) {
                    return Some(ResolvedAnchor {
                        position,
                        line: candidate,
                        side,
                        provenance: Provenance::Adjusted { from: line },
                    });
                }
            }
        }

        let flipped = side.opposite();
        file.position_of(line, flipped).map(|position| ResolvedAnchor {
            position,
            line,
            side: flipped,
            provenance: Provenance::Adjusted { from: line },
        })
    }
}
