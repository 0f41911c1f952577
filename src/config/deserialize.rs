// ABOUTME: Custom serde deserializers and input parsers for config values.
// ABOUTME: Durations accept whole seconds or humantime text; applications accept a list or a string.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationEntry {
    Seconds(u64),
    Human(#[serde(with = "humantime_serde")] Duration),
}

impl From<DurationEntry> for Duration {
    fn from(entry: DurationEntry) -> Self {
        match entry {
            DurationEntry::Seconds(secs) => Duration::from_secs(secs),
            DurationEntry::Human(duration) => duration,
        }
    }
}

pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    DurationEntry::deserialize(deserializer).map(Duration::from)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApplicationsEntry {
    List(Vec<String>),
    Joined(String),
}

/// Application entries as written; splitting happens when the set is built.
pub fn deserialize_applications<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entry: Option<ApplicationsEntry> = Option::deserialize(deserializer)?;
    Ok(match entry {
        None => Vec::new(),
        Some(ApplicationsEntry::List(entries)) => entries,
        Some(ApplicationsEntry::Joined(joined)) => vec![joined],
    })
}

/// Parse a duration input: a whole number of seconds or humantime text.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(input).map_err(|e| format!("invalid duration {input:?}: {e}"))
}

/// Parse a boolean input the way workflow inputs are written.
pub fn parse_bool(input: &str) -> Result<bool, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => Err(format!("invalid boolean {other:?}")),
    }
}
