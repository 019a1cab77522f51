//! Event type enum as the single source of truth for event type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical child-care event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Sleep,
    Nap,
    Wake,
    NightWaking,
    Feeding,
    NightFeeding,
    Medication,
    Activity,
    ExtraActivities,
    Note,
}

/// Where an event ends up when it falls inside a sleep session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// The event is itself a sleep candidate.
    Session,
    /// Rendered in the session's night-waking list.
    NightWaking,
    /// Rendered nested inside the session as an overlay.
    Overlay,
    /// Never nested; always stays on the top-level lane.
    TopLevel,
}

impl EventType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Sleep,
        Self::Nap,
        Self::Wake,
        Self::NightWaking,
        Self::Feeding,
        Self::NightFeeding,
        Self::Medication,
        Self::Activity,
        Self::ExtraActivities,
        Self::Note,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Nap => "nap",
            Self::Wake => "wake",
            Self::NightWaking => "night_waking",
            Self::Feeding => "feeding",
            Self::NightFeeding => "night_feeding",
            Self::Medication => "medication",
            Self::Activity => "activity",
            Self::ExtraActivities => "extra_activities",
            Self::Note => "note",
        }
    }

    /// How this event type relates to a surrounding sleep session.
    #[must_use]
    pub const fn attachment(&self) -> Attachment {
        match self {
            Self::Sleep | Self::Nap => Attachment::Session,
            Self::NightWaking => Attachment::NightWaking,
            Self::Feeding
            | Self::NightFeeding
            | Self::Medication
            | Self::Activity
            | Self::ExtraActivities
            | Self::Note => Attachment::Overlay,
            Self::Wake => Attachment::TopLevel,
        }
    }

    /// Returns true for `sleep` and `nap`.
    #[must_use]
    pub const fn is_sleep(&self) -> bool {
        matches!(self.attachment(), Attachment::Session)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep" => Ok(Self::Sleep),
            "nap" => Ok(Self::Nap),
            "wake" => Ok(Self::Wake),
            "night_waking" => Ok(Self::NightWaking),
            "feeding" => Ok(Self::Feeding),
            "night_feeding" => Ok(Self::NightFeeding),
            "medication" => Ok(Self::Medication),
            "activity" => Ok(Self::Activity),
            "extra_activities" => Ok(Self::ExtraActivities),
            "note" => Ok(Self::Note),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event type strings.
#[derive(Debug, Clone)]
pub struct UnknownEventType(String);

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for variant in &EventType::ALL {
            let s = variant.to_string();
            let parsed: EventType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&EventType::NightWaking).unwrap();
        assert_eq!(json, "\"night_waking\"");
        let parsed: EventType = serde_json::from_str("\"extra_activities\"").unwrap();
        assert_eq!(parsed, EventType::ExtraActivities);
    }

    #[test]
    fn unknown_type_errors() {
        let result: Result<EventType, _> = "bath".parse();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown event type: bath");
    }

    #[test]
    fn attachment_classification() {
        assert_eq!(EventType::Sleep.attachment(), Attachment::Session);
        assert_eq!(EventType::Nap.attachment(), Attachment::Session);
        assert_eq!(EventType::NightWaking.attachment(), Attachment::NightWaking);
        assert_eq!(EventType::Feeding.attachment(), Attachment::Overlay);
        assert_eq!(EventType::NightFeeding.attachment(), Attachment::Overlay);
        assert_eq!(EventType::Note.attachment(), Attachment::Overlay);
        assert_eq!(EventType::Wake.attachment(), Attachment::TopLevel);
    }

    #[test]
    fn only_sleep_and_nap_are_sleep() {
        let sleeps: Vec<_> = EventType::ALL.iter().filter(|t| t.is_sleep()).collect();
        assert_eq!(sleeps, [&EventType::Sleep, &EventType::Nap]);
    }
}
