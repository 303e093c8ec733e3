use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// Parse an enum value by its wire name, ignoring case and accepting `-`
/// for `_` (`in-progress`, `IN_PROGRESS`, `request_created`).
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    [normalized.to_ascii_uppercase(), normalized.to_ascii_lowercase()]
        .iter()
        .find_map(|candidate| serde_json::from_str(&format!("\"{candidate}\"")).ok())
        .ok_or_else(|| anyhow::anyhow!("invalid {field} '{raw}'"))
}

pub fn parse_optional_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

/// Parse an RFC 3339 timestamp from the command line.
pub fn parse_timestamp(raw: &str, field: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}
