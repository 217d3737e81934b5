use similar::TextDiff;

use crate::diff::{LineRecord, ParsedFileDiff};

/// Similarity between two strings on a 0..=1 scale, using the
/// matching-blocks ratio (the `SequenceMatcher.ratio` family).
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Normalize one line of candidate code for comparison: drop ellipsis
/// artifacts the model inserts for elided code, collapse internal
/// whitespace. Returns `None` for lines that are blank after cleanup.
fn normalize_line(line: &str) -> Option<String> {
    let trimmed = line
        .trim()
        .trim_start_matches("...")
        .trim_end_matches("...")
        .trim();
    if trimmed.is_empty() || trimmed == "…" {
        return None;
    }
    Some(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Normalize a multi-line snippet into a single comparison string.
pub(crate) fn normalize_snippet<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> String {
    lines
        .into_iter()
        .filter_map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize the first usable line of a snippet (for the cheap exact-match
/// pre-check before fuzzy search).
pub(crate) fn normalize_first_line(snippet: &str) -> Option<String> {
    snippet.lines().find_map(normalize_line)
}

/// Best-matching contiguous block of diff lines for a suggested code
/// snippet.
///
/// Slides a window of the snippet's line count over the file's diff lines
/// (markers stripped), normalizes both sides identically, and keeps the
/// highest-scoring window at or above `threshold`. Returns the window as an
/// index range into `file.lines()`.
pub(crate) fn find_best_window(
    file: &ParsedFileDiff,
    snippet: &str,
    threshold: f32,
) -> Option<std::ops::Range<usize>> {
    let target = normalize_snippet(snippet.lines());
    if target.is_empty() {
        return None;
    }

    let records = file.lines();
    let window = snippet.lines().count().clamp(1, records.len().max(1));
    if records.is_empty() {
        return None;
    }

    let mut best: Option<(f32, std::ops::Range<usize>)> = None;
    for start in 0..=(records.len() - window) {
        let range = start..start + window;
        let candidate = normalize_snippet(records[range.clone()].iter().map(LineRecord::code));
        if candidate.is_empty() {
            continue;
        }
        let score = similarity_ratio(&candidate, &target);
        if score >= threshold && best.as_ref().is_none_or(|(b, _)| score > *b) {
            best = Some((score, range));
        }
    }

    if let Some((score, range)) = &best {
        tracing::debug!(
            file = %file.file_path,
            score,
            window_start = range.start,
            "fuzzy content match found"
        );
    }
    best.map(|(_, range)| range)
}
