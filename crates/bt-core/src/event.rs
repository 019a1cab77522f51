//! Raw care events and their parsed, time-resolved form.

use chrono::{DateTime, Days, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, SkippedEvent};
use crate::event_type::EventType;
use crate::types::EventId;

/// A care event as supplied by the event store.
///
/// Timestamps are kept as the raw ISO-8601 strings so that a malformed value
/// can be reported instead of rejected at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_type: Option<String>,
}

/// An event with parsed local wall-clock times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub id: EventId,
    pub event_type: EventType,
    pub start: NaiveDateTime,
    /// `None` for point events and for sleeps still in progress.
    pub end: Option<NaiveDateTime>,
}

impl TimedEvent {
    /// Whole minutes between start and end, or `None` without an end.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_minutes())
    }
}

impl Event {
    /// Resolves the raw timestamps into a [`TimedEvent`].
    ///
    /// An end less than a day before the start is read as crossing midnight
    /// and moved to the following day. An end further back is an
    /// [`LayoutError::InvertedInterval`].
    pub fn parse(&self) -> Result<TimedEvent, LayoutError> {
        let start = parse_local_timestamp(&self.start_time).ok_or_else(|| {
            LayoutError::MalformedTimestamp {
                field: "startTime",
                value: self.start_time.clone(),
            }
        })?;

        let end = match self.end_time.as_deref() {
            None => None,
            Some(raw) => {
                let end = parse_local_timestamp(raw).ok_or_else(|| {
                    LayoutError::MalformedTimestamp {
                        field: "endTime",
                        value: raw.to_string(),
                    }
                })?;
                Some(resolve_end(start, end)?)
            }
        };

        Ok(TimedEvent {
            id: self.id.clone(),
            event_type: self.event_type,
            start,
            end,
        })
    }
}

fn resolve_end(start: NaiveDateTime, end: NaiveDateTime) -> Result<NaiveDateTime, LayoutError> {
    if end >= start {
        return Ok(end);
    }
    if start - end < TimeDelta::days(1) {
        if let Some(next_day) = end.checked_add_days(Days::new(1)) {
            return Ok(next_day);
        }
    }
    Err(LayoutError::InvertedInterval { start, end })
}

/// Parses an ISO-8601 timestamp into local wall-clock time.
///
/// A trailing UTC offset is accepted but not applied: the wall-clock
/// component is taken as written.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses every event, splitting them into usable events and skipped ones.
///
/// Order of the input is preserved in both outputs.
pub fn parse_events(events: &[Event]) -> (Vec<TimedEvent>, Vec<SkippedEvent>) {
    let mut parsed = Vec::with_capacity(events.len());
    let mut skipped = Vec::new();

    for event in events {
        match event.parse() {
            Ok(timed) => parsed.push(timed),
            Err(reason) => {
                if matches!(reason, LayoutError::InvertedInterval { .. }) {
                    tracing::warn!(id = %event.id, error = %reason, "skipping event with inverted interval");
                } else {
                    tracing::debug!(id = %event.id, error = %reason, "skipping malformed event");
                }
                skipped.push(SkippedEvent {
                    id: event.id.clone(),
                    reason,
                });
            }
        }
    }

    (parsed, skipped)
}
