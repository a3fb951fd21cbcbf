use crate::error::Result;
use crate::validation::{validate_tag_key, validate_tag_value};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format the age of a timestamp relative to `now`
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_secs = now.signed_duration_since(timestamp).num_seconds().max(0) as u64;
    format_duration(total_secs)
}

pub fn is_older_than(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>, hours_threshold: i64) -> bool {
    if let Some(t) = timestamp {
        let duration = now.signed_duration_since(t);
        duration.num_hours() >= hours_threshold
    } else {
        false
    }
}

/// Parse a "key=value" tag specification
pub fn parse_tag_spec(spec: &str) -> Result<(String, String)> {
    let (key, value) = spec.split_once('=').ok_or_else(|| {
        crate::error::LifecyclectlError::Validation {
            field: "tag".to_string(),
            reason: format!("Tag filter must be in 'key=value' form, got: {}", spec),
        }
    })?;
    validate_tag_key(key)?;
    validate_tag_value(value)?;
    Ok((key.to_string(), value.to_string()))
}

/// Parse a list of "key=value" tag specifications into a filter map
///
/// Later entries win when a key is repeated, matching how the filter map is
/// ultimately sent to EC2 (one clause per key).
pub fn parse_tag_specs(specs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut tags = BTreeMap::new();
    for spec in specs {
        let (key, value) = parse_tag_spec(spec)?;
        tags.insert(key, value);
    }
    Ok(tags)
}
