use std::collections::HashMap;

use indexmap::IndexMap;

use super::hunk::{HunkHeader, HunkRange, LineKind, LineRecord, Side};

/// Parsed diff for a single file, with the line/position indexes needed to
/// anchor inline review comments.
///
/// Internally this is an arena of `LineRecord`s in diff order, plus two
/// index maps into it: one keyed by `(line_number, side)` and one keyed by
/// diff position. All lookup methods resolve against the same arena, so the
/// views cannot drift apart.
#[derive(Debug, Clone)]
pub struct ParsedFileDiff {
    /// File path as suggestions reference it (no `a/`/`b/` prefix).
    pub file_path: String,
    /// This file's diff segment, verbatim (headers and hunks).
    pub patch: String,
    /// Per-hunk line ranges, for diagnostics.
    pub hunks: Vec<HunkRange>,
    lines: Vec<LineRecord>,
    by_line: IndexMap<(usize, Side), usize>,
    by_position: HashMap<usize, usize>,
}

impl ParsedFileDiff {
    /// Diff position for a commentable `(line, side)` anchor.
    ///
    /// Defined only for added/removed lines; context lines are never valid
    /// comment anchors and return `None` here even though they occupy a
    /// position.
    pub fn position_of(&self, line: usize, side: Side) -> Option<usize> {
        let idx = *self.by_line.get(&(line, side))?;
        let rec = &self.lines[idx];
        rec.is_commentable().then_some(rec.position)
    }

    /// Inverse lookup: position → `(line, side)`.
    ///
    /// For context lines (which exist on both sides) the RIGHT-side line
    /// number wins, since review UIs show new-file numbering by default.
    pub fn line_at_position(&self, position: usize) -> Option<(usize, Side)> {
        let rec = self.record_at_position(position)?;
        match rec.kind {
            LineKind::Removed => rec.old_line.map(|n| (n, Side::Left)),
            LineKind::Added | LineKind::Context => rec.new_line.map(|n| (n, Side::Right)),
        }
    }

    /// The full line record at a diff position, context lines included.
    pub fn record_at_position(&self, position: usize) -> Option<&LineRecord> {
        self.by_position.get(&position).map(|&idx| &self.lines[idx])
    }

    /// The record registered under `(line, side)`, context lines included.
    /// This is the `all_lines` view; use it for content search only.
    pub fn record_at_line(&self, line: usize, side: Side) -> Option<&LineRecord> {
        self.by_line.get(&(line, side)).map(|&idx| &self.lines[idx])
    }

    /// Whether `(line, side)` is a valid anchor for a new inline comment.
    pub fn is_commentable(&self, line: usize, side: Side) -> bool {
        self.record_at_line(line, side)
            .is_some_and(LineRecord::is_commentable)
    }

    /// All commentable `(line, side)` anchors, in diff order.
    pub fn commentable_lines(&self) -> impl Iterator<Item = (usize, Side)> + '_ {
        self.lines.iter().filter_map(LineRecord::anchor_key)
    }

    /// Number of added + removed lines.
    pub fn changed_line_count(&self) -> usize {
        self.lines.iter().filter(|r| r.is_commentable()).count()
    }

    /// Every line of the file's diff, in order (the `all_lines` view).
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }
}

/// Parse a unified diff into one `ParsedFileDiff` per changed file.
///
/// Tolerates empty input and git-style metadata lines (`diff --git`,
/// `index`, mode changes). A malformed diff yields an empty vec with a
/// warning; callers treat zero files as "nothing to review".
pub fn parse_diff(diff_text: &str) -> Vec<ParsedFileDiff> {
    if diff_text.trim().is_empty() {
        return Vec::new();
    }

    let mut files = Vec::new();
    let mut builder: Option<FileBuilder> = None;
    let mut saw_header = false;

    // Remaining old/new line counts for the hunk being walked. Tracking
    // these disambiguates `--- a/next_file` from a removed line `-- ...`.
    let mut remaining_old: usize = 0;
    let mut remaining_new: usize = 0;

    for line in diff_text.lines() {
        let in_hunk = remaining_old > 0 || remaining_new > 0;

        if !in_hunk {
            if line.starts_with("diff --git ") {
                saw_header = true;
                flush_file(&mut files, builder.take());
                builder = Some(FileBuilder::new(line));
                continue;
            }
            if let Some(old_path) = line.strip_prefix("--- ") {
                saw_header = true;
                // `difflib`-style diffs have no `diff --git` line; a `---`
                // header after a completed file starts the next one.
                if builder.as_ref().is_none_or(|b| !b.hunks.is_empty()) {
                    flush_file(&mut files, builder.take());
                    builder = Some(FileBuilder::new(line));
                }
                if let Some(b) = builder.as_mut() {
                    b.set_old_path(old_path);
                    b.push_raw(line);
                }
                continue;
            }
            if let Some(new_path) = line.strip_prefix("+++ ") {
                if let Some(b) = builder.as_mut() {
                    b.set_new_path(new_path);
                    b.push_raw(line);
                }
                continue;
            }
        }

        if let Some(header) = HunkHeader::parse(line) {
            let Some(b) = builder.as_mut() else {
                tracing::warn!("hunk header before any file header, skipping: {line}");
                continue;
            };
            remaining_old = header.size1;
            remaining_new = header.size2;
            b.start_hunk(&header, line);
            continue;
        }

        let Some(b) = builder.as_mut() else {
            continue;
        };

        if !in_hunk {
            // git metadata between `diff --git` and the first hunk
            // (`index ...`, `new file mode ...`, binary notices).
            b.push_raw(line);
            continue;
        }

        b.push_raw(line);
        if line.starts_with('\\') {
            // "\ No newline at end of file" occupies a diff position but
            // maps to no source or target line.
            b.position += 1;
            continue;
        }

        match line.as_bytes().first() {
            Some(b'+') => {
                b.push_line(LineKind::Added, line);
                remaining_new = remaining_new.saturating_sub(1);
            }
            Some(b'-') => {
                b.push_line(LineKind::Removed, line);
                remaining_old = remaining_old.saturating_sub(1);
            }
            _ => {
                // Context; some tools emit truly empty lines for empty
                // context instead of a single space.
                b.push_line(LineKind::Context, line);
                remaining_old = remaining_old.saturating_sub(1);
                remaining_new = remaining_new.saturating_sub(1);
            }
        }
    }

    flush_file(&mut files, builder.take());

    if files.is_empty() && !saw_header {
        tracing::warn!("diff text is not a unified diff, treating as empty");
    }
    files
}

fn flush_file(files: &mut Vec<ParsedFileDiff>, builder: Option<FileBuilder>) {
    if let Some(b) = builder {
        match b.finish() {
            Some(parsed) => files.push(parsed),
            None => tracing::debug!("skipping diff entry with no hunks"),
        }
    }
}

/// Incremental state while walking one file's diff segment.
struct FileBuilder {
    old_path: Option<String>,
    new_path: Option<String>,
    raw: String,
    hunks: Vec<HunkRange>,
    lines: Vec<LineRecord>,
    /// Position counter; 0 until the file's first hunk header.
    position: usize,
    old_line: usize,
    new_line: usize,
}

impl FileBuilder {
    fn new(first_line: &str) -> Self {
        let mut raw = String::new();
        if first_line.starts_with("diff --git ") {
            raw.push_str(first_line);
            raw.push('\n');
        }
        Self {
            old_path: None,
            new_path: None,
            raw,
            hunks: Vec::new(),
            lines: Vec::new(),
            position: 0,
            old_line: 0,
            new_line: 0,
        }
    }

    fn set_old_path(&mut self, path: &str) {
        self.old_path = normalize_header_path(path);
    }

    fn set_new_path(&mut self, path: &str) {
        self.new_path = normalize_header_path(path);
    }

    fn push_raw(&mut self, line: &str) {
        self.raw.push_str(line);
        self.raw.push('\n');
    }

    fn start_hunk(&mut self, header: &HunkHeader, raw_line: &str) {
        // Every hunk header after the first occupies a position, matching
        // the "lines down from the first @@" anchoring scheme.
        if !self.hunks.is_empty() {
            self.position += 1;
        }
        self.hunks.push(HunkRange::from(header));
        self.old_line = header.start1;
        self.new_line = header.start2;
        self.push_raw(raw_line);
    }

    fn push_line(&mut self, kind: LineKind, text: &str) {
        self.position += 1;
        let (old_line, new_line) = match kind {
            LineKind::Added => {
                let n = self.new_line;
                self.new_line += 1;
                (None, Some(n))
            }
            LineKind::Removed => {
                let n = self.old_line;
                self.old_line += 1;
                (Some(n), None)
            }
            LineKind::Context => {
                let pair = (Some(self.old_line), Some(self.new_line));
                self.old_line += 1;
                self.new_line += 1;
                pair
            }
        };
        self.lines.push(LineRecord {
            position: self.position,
            kind,
            old_line,
            new_line,
            text: text.to_string(),
        });
    }

    fn finish(self) -> Option<ParsedFileDiff> {
        if self.hunks.is_empty() {
            return None;
        }
        let file_path = self.new_path.or(self.old_path)?;

        let mut by_line = IndexMap::with_capacity(self.lines.len());
        let mut by_position = HashMap::with_capacity(self.lines.len());
        for (idx, rec) in self.lines.iter().enumerate() {
            by_position.insert(rec.position, idx);
            if let Some(n) = rec.old_line {
                by_line.entry((n, Side::Left)).or_insert(idx);
            }
            if let Some(n) = rec.new_line {
                by_line.entry((n, Side::Right)).or_insert(idx);
            }
        }

        Some(ParsedFileDiff {
            file_path,
            patch: self.raw,
            hunks: self.hunks,
            lines: self.lines,
            by_line,
            by_position,
        })
    }
}

/// Strip the `a/`/`b/` prefix from a `---`/`+++` header path.
/// Returns `None` for `/dev/null` (added/deleted file sides).
fn normalize_header_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path == "/dev/null" {
        return None;
    }
    let stripped = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    Some(stripped.to_string())
}
