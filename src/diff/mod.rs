mod format;
mod hunk;
mod parser;

pub use hunk::{HunkHeader, HunkRange, LineKind, LineRecord, Side};
pub use parser::{ParsedFileDiff, parse_diff};
