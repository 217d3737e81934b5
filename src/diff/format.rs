use std::fmt::Write;

use super::hunk::{LineKind, LineRecord};
use super::parser::ParsedFileDiff;

impl ParsedFileDiff {
    /// Render this file's diff in the decoupled prompt format:
    /// `## File:` header, then per hunk a `__new hunk__` block (added +
    /// context lines, prefixed with new-file line numbers) and an
    /// `__old hunk__` block (removed + context lines, no numbers).
    ///
    /// Separating the sides keeps text-completion models from conflating
    /// old and new line numbering when they cite lines back to us.
    pub fn to_decoupled_format(&self) -> String {
        let mut output = format!("## File: '{}'\n", self.file_path.trim());

        for (i, hunk) in self.hunks.iter().enumerate() {
            let records: Vec<&LineRecord> = self
                .lines()
                .iter()
                .filter(|r| in_hunk(r, hunk))
                .collect();

            let _ = writeln!(
                output,
                "\n@@ -{},{} +{},{} @@",
                hunk.source_start,
                hunk.source_end + 1 - hunk.source_start,
                hunk.target_start,
                hunk.target_end + 1 - hunk.target_start,
            );
            let _ = write!(output, "{}", render_hunk(&records));
            if i + 1 < self.hunks.len() {
                output.push('\n');
            }
        }

        output
    }
}

fn in_hunk(rec: &LineRecord, hunk: &super::hunk::HunkRange) -> bool {
    match rec.kind {
        LineKind::Added => rec
            .new_line
            .is_some_and(|n| n >= hunk.target_start && n <= hunk.target_end),
        _ => rec
            .old_line
            .is_some_and(|n| n >= hunk.source_start && n <= hunk.source_end),
    }
}

fn render_hunk(records: &[&LineRecord]) -> String {
    let mut new_content = String::new();
    let mut old_content = String::new();
    let mut has_plus = false;
    let mut has_minus = false;

    for rec in records {
        match rec.kind {
            LineKind::Added => {
                has_plus = true;
                let _ = writeln!(new_content, "{} {}", rec.new_line.unwrap_or(0), rec.text);
            }
            LineKind::Removed => {
                has_minus = true;
                let _ = writeln!(old_content, "{}", rec.text);
            }
            LineKind::Context => {
                let _ = writeln!(new_content, "{} {}", rec.new_line.unwrap_or(0), rec.text);
                let _ = writeln!(old_content, "{}", rec.text);
            }
        }
    }

    let mut out = String::new();
    if has_plus || !has_minus {
        out.push_str("__new hunk__\n");
        out.push_str(&new_content);
    }
    if has_minus {
        out.push_str("__old hunk__\n");
        out.push_str(&old_content);
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::diff::parse_diff;
    use crate::testing::fixtures::unified_diff;

    #[test]
    fn test_single_add() {
        let before = "def hello():\n    print(\"hello\")\n";
        let after = "def hello():\n    print(\"hello\")\n    print(\"world\")\n";
        let parsed = parse_diff(&unified_diff(before, after, "hello.py"));
        assert_eq!(parsed.len(), 1);

        let result = parsed[0].to_decoupled_format();
        assert!(result.contains("## File:"));
        assert!(result.contains("__new hunk__"));
        assert!(result.contains("+    print(\"world\")"));
        // New lines are prefixed with their target line number.
        assert!(result.contains("3 +    print(\"world\")"));
    }

    #[test]
    fn test_single_remove() {
        let before = "def hello():\n    print(\"hello\")\n    print(\"world\")\n";
        let after = "def hello():\n    print(\"hello\")\n";
        let parsed = parse_diff(&unified_diff(before, after, "hello.py"));

        let result = parsed[0].to_decoupled_format();
        assert!(result.contains("__old hunk__"));
        assert!(result.contains("-    print(\"world\")"));
    }

    #[test]
    fn test_add_and_remove() {
        let parsed = parse_diff(&unified_diff(
            "a = 1\nb = 2\nc = 3\n",
            "a = 1\nb = 20\nc = 3\n",
            "t.py",
        ));

        let result = parsed[0].to_decoupled_format();
        assert!(result.contains("__old hunk__"));
        assert!(result.contains("__new hunk__"));
        assert!(result.contains("-b = 2"));
        assert!(result.contains("+b = 20"));
    }

    #[test]
    fn test_multi_hunk() {
        let mut before = String::new();
        for i in 0..20 {
            before.push_str(&format!("line {i}\n"));
        }
        let after = before
            .replace("line 2\n", "CHANGED line 2\n")
            .replace("line 17\n", "CHANGED line 17\n");
        let parsed = parse_diff(&unified_diff(&before, &after, "t.py"));

        let result = parsed[0].to_decoupled_format();
        assert!(result.matches("__new hunk__").count() >= 2);
        assert!(result.contains("-line 2"));
        assert!(result.contains("+CHANGED line 2"));
        assert!(result.contains("+CHANGED line 17"));
    }

    #[test]
    fn test_context_lines_present() {
        let parsed = parse_diff(&unified_diff(
            "a = 1\nb = 2\nc = 3\nd = 4\n",
            "a = 1\nb = 2\nc = 30\nd = 4\n",
            "t.py",
        ));
        let result = parsed[0].to_decoupled_format();
        assert!(result.contains(" a = 1") || result.contains(" b = 2"));
    }

    #[test]
    fn test_hunk_headers_present() {
        let parsed = parse_diff(&unified_diff("a = 1\nb = 2\n", "a = 1\nb = 20\n", "t.py"));
        assert!(parsed[0].to_decoupled_format().contains("@@"));
    }
}
