use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Regex for parsing unified diff hunk headers.
/// Matches: `@@ -start1[,size1] +start2[,size2] @@ [section_header]`
static HUNK_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@[ ]?(.*)").unwrap());

/// Parsed hunk header values.
#[derive(Debug, Clone)]
pub struct HunkHeader {
    pub start1: usize,
    pub size1: usize,
    pub start2: usize,
    pub size2: usize,
    pub section_header: String,
}

impl HunkHeader {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HUNK_HEADER_RE.captures(line)?;
        Some(Self {
            start1: caps[1].parse().unwrap_or(0),
            size1: caps.get(2).map_or(1, |m| m.as_str().parse().unwrap_or(1)),
            start2: caps[3].parse().unwrap_or(0),
            size2: caps.get(4).map_or(1, |m| m.as_str().parse().unwrap_or(1)),
            section_header: caps.get(5).map_or("", |m| m.as_str()).to_string(),
        })
    }
}

/// Line ranges covered by one hunk, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub source_start: usize,
    pub source_end: usize,
    pub target_start: usize,
    pub target_end: usize,
}

impl From<&HunkHeader> for HunkRange {
    fn from(h: &HunkHeader) -> Self {
        Self {
            source_start: h.start1,
            source_end: h.start1 + h.size1.saturating_sub(1),
            target_start: h.start2,
            target_end: h.start2 + h.size2.saturating_sub(1),
        }
    }
}

/// Which file of the diff a line number refers to.
/// LEFT = old/source file, RIGHT = new/target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

/// One line inside a hunk, as stored in the per-file line arena.
///
/// An Added line carries only `new_line`, a Removed line only `old_line`,
/// a Context line both.
#[derive(Debug, Clone)]
pub struct LineRecord {
    /// Sequential position within the file's diff (lines down from the
    /// first `@@` header). This is the anchor review APIs expect.
    pub position: usize,
    pub kind: LineKind,
    pub old_line: Option<usize>,
    pub new_line: Option<usize>,
    /// The raw diff line, including its `+`/`-`/` ` marker.
    pub text: String,
}

impl LineRecord {
    /// The line content with the diff marker stripped.
    pub fn code(&self) -> &str {
        self.text.get(1..).unwrap_or("")
    }

    pub fn is_commentable(&self) -> bool {
        self.kind != LineKind::Context
    }

    /// The `(line, side)` key this record is commentable under, if any.
    pub fn anchor_key(&self) -> Option<(usize, Side)> {
        match self.kind {
            LineKind::Added => self.new_line.map(|n| (n, Side::Right)),
            LineKind::Removed => self.old_line.map(|n| (n, Side::Left)),
            LineKind::Context => None,
        }
    }
}
