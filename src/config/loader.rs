use figment::Figment;
use figment::providers::{Format, Toml};

use crate::config::types::Settings;
use crate::error::AnchorError;

/// Embedded default TOML. Keeps the crate self-contained: callers get
/// sensible mapping policy without shipping a config file.
static CONFIGURATION_TOML: &str = include_str!("../../settings/configuration.toml");

/// Build the configuration by merging layers:
///
/// 1. Embedded defaults (`settings/configuration.toml`)
/// 2. An optional `anchor.toml` in the working directory
/// 3. An optional caller-provided TOML string (e.g. repo-level settings
///    fetched by the host application)
/// 4. Dotted environment variables (`MAPPING.SEARCH_RADIUS=3`), highest
///    precedence
pub fn load_settings(overrides_toml: Option<&str>) -> Result<Settings, AnchorError> {
    let mut figment = Figment::new()
        .merge(Toml::string(CONFIGURATION_TOML))
        .merge(Toml::file("anchor.toml"));

    if let Some(toml) = overrides_toml {
        figment = figment.merge(Toml::string(toml));
    }

    // Dynaconf-style SECTION.KEY env vars, encoded as TOML fragments so
    // numeric and boolean values keep their types.
    for (key, value) in std::env::vars() {
        let lower = key.to_lowercase();
        let Some((section, field)) = lower.split_once('.') else {
            continue;
        };
        if section != "mapping" {
            continue;
        }
        figment = figment.merge(Toml::string(&env_override_to_toml(
            section,
            field,
            value.trim(),
        )));
    }

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

/// Encode one env override as a TOML fragment, guessing the value type.
fn env_override_to_toml(section: &str, field: &str, value: &str) -> String {
    let is_literal = value == "true"
        || value == "false"
        || value.parse::<i64>().is_ok()
        || value.parse::<f64>().is_ok();
    let toml_value = if is_literal {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    };
    format!("[{section}]\n{field} = {toml_value}")
}
