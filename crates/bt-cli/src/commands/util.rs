//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use bt_core::Event;
use bt_core::event::parse_local_timestamp;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A record in the input file that is not a valid event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableRecord {
    /// Zero-based position in the input array.
    pub position: usize,
    pub message: String,
}

/// Events read from an input file.
#[derive(Debug, Default)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    pub unreadable: Vec<UnreadableRecord>,
}

/// Reads a JSON array of events from a file, or from stdin when `path` is `-`.
///
/// Records are decoded one by one so that a single bad record (unknown
/// event type, empty id, ...) does not reject the whole file.
pub fn load_events(path: &Path) -> anyhow::Result<LoadedEvents> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read events from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    parse_event_array(&content)
}

/// Decodes a JSON array of events, collecting records that fail to decode.
pub fn parse_event_array(content: &str) -> anyhow::Result<LoadedEvents> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("input is not valid JSON")?;
    let serde_json::Value::Array(records) = value else {
        bail!("input must be a JSON array of events");
    };

    let mut loaded = LoadedEvents::default();
    for (position, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Event>(record) {
            Ok(event) => loaded.events.push(event),
            Err(e) => {
                tracing::warn!(position, error = %e, "skipping unreadable event record");
                loaded.unreadable.push(UnreadableRecord {
                    position,
                    message: e.to_string(),
                });
            }
        }
    }
    tracing::debug!(
        events = loaded.events.len(),
        unreadable = loaded.unreadable.len(),
        "loaded events"
    );
    Ok(loaded)
}

/// Resolves the `--now` option, defaulting to the current local time.
pub fn resolve_now(now: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match now {
        None => Ok(Local::now().naive_local()),
        Some(s) => parse_local_timestamp(s).with_context(|| {
            format!("invalid --now timestamp {s:?}, expected ISO 8601 (e.g., 2024-03-02T05:30:00)")
        }),
    }
}

/// Returns the Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

/// Formats minutes from midnight as `HH:MM`; the end of day prints as `24:00`.
pub fn format_clock(minutes: i64) -> String {
    let minutes = minutes.clamp(0, 24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
