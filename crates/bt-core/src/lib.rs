//! Core layout logic for the baby care timeline.
//!
//! This crate turns raw care events into drawable geometry:
//! - Session reconstruction: stitching sleeps across midnight and nesting
//!   night wakings and feedings inside them
//! - Column assignment: keeping concurrent items side by side
//! - Geometry: mapping minutes of the day to pixels
//!
//! Everything is pure and synchronous; the same events can be laid out for
//! several days at once.

pub mod columns;
pub mod error;
pub mod event;
pub mod event_type;
pub mod geometry;
pub mod layout;
pub mod session;
pub mod types;

pub use columns::{
    ColumnItem, ColumnLayout, OverflowSlot, PlacedItem, assign_columns, assign_columns_pinned,
};
pub use error::{LayoutError, SkippedEvent};
pub use event::{Event, TimedEvent, parse_events};
pub use event_type::{Attachment, EventType, UnknownEventType};
pub use geometry::{DayClip, DayWindow, clip_to_day, minutes_since_midnight, to_pixels};
pub use layout::{
    DayLayout, LayoutConfig, OverflowMarker, PositionedItem, PositionedSession, WeekLayout,
    format_duration, layout_day, layout_week,
};
pub use session::{Reconstruction, SleepSession, reconstruct_sessions};
pub use types::{EventId, ValidationError};
