//! Per-event layout errors.
//!
//! None of these abort a render. An event that hits one is left out of the
//! layout and reported back to the caller as a [`SkippedEvent`].

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::EventId;

/// Why an event could not be placed on the timeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// `startTime` or `endTime` is not an ISO-8601 local timestamp.
    #[error("malformed {field}: {value:?}")]
    MalformedTimestamp { field: &'static str, value: String },

    /// The end precedes the start by a day or more, so it cannot be a
    /// midnight crossing.
    #[error("end {end} precedes start {start} by more than a day")]
    InvertedInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// The item starts outside the rendered day.
    #[error("start offset {start_minutes} min is outside the 24h day")]
    OutOfRangeGeometry { start_minutes: i64 },
}

impl Serialize for LayoutError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An event excluded from the layout, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEvent {
    pub id: EventId,
    pub reason: LayoutError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn malformed_timestamp_display() {
        let err = LayoutError::MalformedTimestamp {
            field: "startTime",
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "malformed startTime: \"yesterday\"");
    }

    #[test]
    fn skipped_event_serializes_reason_as_text() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let skipped = SkippedEvent {
            id: EventId::new("e1").unwrap(),
            reason: LayoutError::InvertedInterval { start, end },
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["id"], "e1");
        assert_eq!(
            json["reason"],
            "end 2024-03-01 07:00:00 precedes start 2024-03-02 08:00:00 by more than a day"
        );
    }
}
