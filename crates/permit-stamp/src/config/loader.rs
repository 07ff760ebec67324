use std::path::Path;

use crate::config::schema::{PollStrategy, StampingSettings};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/settings-v1.json");

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<StampingSettings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<StampingSettings, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let settings: StampingSettings = serde_json::from_value(json_value)?;

    validate_settings(&settings)?;

    log::debug!(
        "Loaded stamping settings: {} stampable MIME types, {} post-verdict states",
        settings.stampable_mimes.len(),
        settings.post_verdict_states.len()
    );

    Ok(settings)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_settings(settings: &StampingSettings) -> Result<(), ConfigError> {
    if settings.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported settings version: {}", settings.version),
        });
    }

    if settings.stampable_mimes.is_empty() {
        return Err(ConfigError::Validation {
            message: "stampableMimes must list at least one MIME type".to_string(),
        });
    }

    for mime in &settings.stampable_mimes {
        if !is_well_formed_mime(mime) {
            return Err(ConfigError::InvalidMime(mime.clone()));
        }
    }

    let polling = &settings.polling;
    if polling.strategy != PollStrategy::Immediate {
        if polling.interval_ms == 0 {
            return Err(ConfigError::Validation {
                message: "polling.intervalMs must be positive for fixed or exponential polling"
                    .to_string(),
            });
        }
        if polling.max_interval_ms < polling.interval_ms {
            return Err(ConfigError::Validation {
                message: format!(
                    "polling.maxIntervalMs ({}) is smaller than polling.intervalMs ({})",
                    polling.max_interval_ms, polling.interval_ms
                ),
            });
        }
    }

    Ok(())
}

/// `type/subtype`, both parts non-empty and free of whitespace.
fn is_well_formed_mime(mime: &str) -> bool {
    match mime.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.contains('/')
                && !mime.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
