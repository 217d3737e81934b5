use crate::diff::Side;
use crate::error::AnchorError;
use crate::suggestion::{Suggestion, SuggestionCategory};

/// Extract a trimmed string field from a YAML mapping, with a fallback.
fn yaml_str_field(item: &serde_yaml_ng::Value, key: &str, default: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .trim()
        .to_string()
}

/// Extract a u64 from a YAML value, trying numeric first then string parse.
/// Models regularly quote line numbers.
fn yaml_value_as_u64(value: &serde_yaml_ng::Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn try_parse(text: &str) -> Option<serde_yaml_ng::Value> {
    match serde_yaml_ng::from_str::<serde_yaml_ng::Value>(text) {
        Ok(val) if !val.is_null() => Some(val),
        _ => None,
    }
}

/// Parse a suggestion list from a raw model response in YAML.
///
/// Strips markdown fences, then applies a short fallback cascade for the
/// formatting mistakes this contract actually sees: leading `+` diff
/// markers and tab indentation. Items missing a file or end line are
/// skipped with a warning; only a fully unparseable response is an error.
pub fn parse_suggestions_yaml(response_text: &str) -> Result<Vec<Suggestion>, AnchorError> {
    let trimmed = response_text.trim_matches('\n').trim();
    let cleaned = trimmed
        .strip_prefix("```yaml")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .trim()
        .strip_suffix("```")
        .unwrap_or(trimmed)
        .trim();

    let data = try_parse(cleaned)
        .or_else(|| {
            tracing::debug!("initial YAML parse failed, removing leading '+' markers");
            let fixed: String = cleaned
                .lines()
                .map(|l| l.strip_prefix('+').map_or(l.to_string(), |r| format!(" {r}")))
                .collect::<Vec<_>>()
                .join("\n");
            try_parse(&fixed)
        })
        .or_else(|| {
            tracing::debug!("retrying YAML parse with tabs replaced");
            cleaned
                .contains('\t')
                .then(|| try_parse(&cleaned.replace('\t', "    ")))
                .flatten()
        })
        .ok_or_else(|| AnchorError::YamlParse("no parsable YAML in model response".into()))?;

    Ok(suggestions_from_yaml(&data))
}

/// Convert a parsed YAML document into suggestion records.
///
/// Accepts the list under `code_suggestions` or `suggestions`, or a bare
/// top-level sequence.
fn suggestions_from_yaml(data: &serde_yaml_ng::Value) -> Vec<Suggestion> {
    let list = data
        .get("code_suggestions")
        .or_else(|| data.get("suggestions"))
        .unwrap_or(data);

    let Some(seq) = list.as_sequence() else {
        tracing::warn!("model response has no suggestion sequence");
        return Vec::new();
    };

    let mut suggestions = Vec::new();
    for item in seq {
        let file = yaml_str_field(item, "relevant_file", "");
        let comment = yaml_str_field(item, "suggestion_content", "");
        let suggested_code = yaml_str_field(item, "improved_code", "");
        let existing_code = item
            .get("existing_code")
            .and_then(|v| v.as_str())
            .map(|s| s.trim_end().to_string())
            .filter(|s| !s.trim().is_empty());

        let start_line = item
            .get("relevant_lines_start")
            .and_then(yaml_value_as_u64)
            .unwrap_or(0) as usize;
        let end_line = item
            .get("relevant_lines_end")
            .and_then(yaml_value_as_u64)
            .unwrap_or(start_line as u64) as usize;

        let side = match yaml_str_field(item, "side", "").to_uppercase().as_str() {
            "LEFT" => Some(Side::Left),
            "RIGHT" => Some(Side::Right),
            _ => None,
        };
        let category = SuggestionCategory::from_label(&yaml_str_field(item, "label", ""));

        if file.is_empty() || end_line == 0 {
            tracing::warn!(file = %file, "skipping suggestion without file or line range");
            continue;
        }

        suggestions.push(Suggestion {
            file,
            start_line,
            end_line,
            side,
            comment,
            category,
            suggested_code,
            existing_code,
        });
    }
    suggestions
}

/// Parse a suggestion list from JSON (some models are steered to JSON
/// output instead). Accepts a bare array or `{"suggestions": [...]}`.
pub fn parse_suggestions_json(response_text: &str) -> Result<Vec<Suggestion>, AnchorError> {
    let trimmed = response_text.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .trim()
        .strip_suffix("```")
        .unwrap_or(trimmed)
        .trim();

    let value: serde_json::Value = serde_json::from_str(cleaned)?;
    let list = value.get("suggestions").unwrap_or(&value);
    let suggestions: Vec<Suggestion> = serde_json::from_value(list.clone())?;
    Ok(suggestions
        .into_iter()
        .filter(|s| {
            let usable = !s.file.is_empty() && s.end_line > 0;
            if !usable {
                tracing::warn!(file = %s.file, "skipping suggestion without file or line range");
            }
            usable
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::SUGGESTIONS_YAML;

    #[test]
    fn test_parse_yaml_with_fences() {
        let suggestions = parse_suggestions_yaml(SUGGESTIONS_YAML).unwrap();
        assert_eq!(suggestions.len(), 2);

        assert_eq!(suggestions[0].file, "src/main.rs");
        assert_eq!(suggestions[0].end_line, 3);
        assert_eq!(suggestions[0].category, SuggestionCategory::Improvement);
        assert_eq!(suggestions[0].existing_code.as_deref(), Some("let x = 42;"));
        assert_eq!(suggestions[1].side, Some(Side::Right));
    }

    #[test]
    fn test_parse_yaml_quoted_line_numbers() {
        let yaml = "code_suggestions:\n  - relevant_file: a.rs\n    relevant_lines_start: '7'\n    relevant_lines_end: '9'\n    suggestion_content: quoted numbers\n";
        let suggestions = parse_suggestions_yaml(yaml).unwrap();
        assert_eq!(suggestions[0].start_line, 7);
        assert_eq!(suggestions[0].end_line, 9);
    }

    #[test]
    fn test_parse_yaml_end_defaults_to_start() {
        let yaml = "code_suggestions:\n  - relevant_file: a.rs\n    relevant_lines_start: 7\n";
        let suggestions = parse_suggestions_yaml(yaml).unwrap();
        assert_eq!(suggestions[0].end_line, 7);
    }

    #[test]
    fn test_parse_yaml_skips_incomplete_items() {
        let yaml = "code_suggestions:\n  - relevant_file: a.rs\n    relevant_lines_end: 3\n  - suggestion_content: no file here\n    relevant_lines_end: 9\n";
        let suggestions = parse_suggestions_yaml(yaml).unwrap();
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_parse_yaml_leading_plus_markers() {
        // The model copied a diff marker into a block scalar, which breaks
        // the scalar's indentation and the whole parse with it.
        let yaml = "code_suggestions:\n  - relevant_file: a.rs\n    relevant_lines_end: 3\n    existing_code: |\n+      let x = 1\n";
        let suggestions = parse_suggestions_yaml(yaml).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].file, "a.rs");
        assert_eq!(suggestions[0].existing_code.as_deref(), Some("let x = 1"));
    }

    #[test]
    fn test_parse_yaml_garbage_is_error() {
        assert!(parse_suggestions_yaml("{{{{not yaml at all!!!!").is_err());
    }

    #[test]
    fn test_parse_json_bare_array() {
        let json = r#"[{"file": "a.rs", "end_line": 5, "comment": "x"}]"#;
        let suggestions = parse_suggestions_json(json).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].end_line, 5);
    }

    #[test]
    fn test_parse_json_wrapped_and_fenced() {
        let json = "```json\n{\"suggestions\": [{\"file\": \"a.rs\", \"end_line\": 5}]}\n```";
        let suggestions = parse_suggestions_json(json).unwrap();
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_parse_json_filters_incomplete() {
        let json = r#"[{"file": "", "end_line": 5}, {"file": "a.rs", "end_line": 0}]"#;
        let suggestions = parse_suggestions_json(json).unwrap();
        assert!(suggestions.is_empty());
    }
}
