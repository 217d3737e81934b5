use std::fmt::Write;

use crate::diff::ParsedFileDiff;

/// Render a human-readable line-mapping report for a set of parsed files.
///
/// Debugging aid for failed mappings: per file, the commentable/total line
/// counts, hunk ranges, the commentable-line → position table, and the raw
/// diff lines with their positions. Not used on any hot path.
pub fn line_mapping_report(parsed_files: &[ParsedFileDiff]) -> String {
    let mut report = String::from("# Line Mapping Report\n");

    for file in parsed_files {
        let _ = writeln!(report, "\n## File: {}", file.file_path);
        let _ = writeln!(report, "- Commentable lines: {}", file.changed_line_count());
        let _ = writeln!(report, "- Total lines in diff: {}", file.lines().len());
        let _ = writeln!(report, "- Hunks: {}", file.hunks.len());
        for hunk in &file.hunks {
            let _ = writeln!(
                report,
                "  - source {}..{}, target {}..{}",
                hunk.source_start, hunk.source_end, hunk.target_start, hunk.target_end
            );
        }

        if file.changed_line_count() > 0 {
            let _ = writeln!(report, "\n### Commentable lines");
            for (line, side) in file.commentable_lines() {
                match file.position_of(line, side) {
                    Some(position) => {
                        let content = file
                            .record_at_position(position)
                            .map_or("", |r| r.text.trim_end());
                        let _ = writeln!(
                            report,
                            "- Line {line} ({side}) -> position {position}: `{content}`"
                        );
                    }
                    None => {
                        let _ = writeln!(report, "- Line {line} ({side}) -> [NO POSITION]");
                    }
                }
            }
        }

        let _ = writeln!(report, "\n### Raw diff lines");
        for rec in file.lines() {
            let _ = writeln!(report, "P{}: `{}`", rec.position, rec.text.trim_end());
        }
    }

    report
}
