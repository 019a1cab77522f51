//! Day and week layout: the full pipeline from raw events to geometry.
//!
//! # Pipeline
//!
//! 1. Parse raw events, collecting the malformed ones as skipped
//! 2. Reconstruct sleep sessions for the rendered day
//! 3. Assign columns to the top-level lane and, separately, inside each session
//! 4. Convert minutes to pixel blocks

use chrono::{Days, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::columns::{ColumnItem, ColumnLayout, OverflowSlot, assign_columns_pinned};
use crate::error::{LayoutError, SkippedEvent};
use crate::event::{Event, TimedEvent, parse_events};
use crate::event_type::EventType;
use crate::geometry::{self, Block, DayWindow, Placement, Scale};
use crate::session::{SleepSession, reconstruct_sessions};
use crate::types::{EventId, ValidationError};

/// Configuration for timeline layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical scale. Default: 30.
    pub pixels_per_hour: u32,

    /// Column cap for night wakings and overlays inside one session.
    /// Default: 3.
    pub session_max_columns: usize,

    /// Column cap for the top-level lane. Default: 6.
    pub top_level_max_columns: usize,

    /// Minimum height of sessions and top-level events. Default: 20.
    pub min_block_height_px: f64,

    /// Minimum height of items nested inside a session. Default: 18.
    pub min_overlay_height_px: f64,

    /// Horizontal gap subtracted from each column's width. Default: 2.0.
    pub column_gap_pct: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pixels_per_hour: 30,
            session_max_columns: 3,
            top_level_max_columns: 6,
            min_block_height_px: 20.0,
            min_overlay_height_px: 18.0,
            column_gap_pct: 2.0,
        }
    }
}

impl LayoutConfig {
    /// Checks the ranges the layout relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pixels_per_hour == 0 {
            return Err(ValidationError::ZeroPixelsPerHour);
        }
        for (field, value) in [
            ("session_max_columns", self.session_max_columns),
            ("top_level_max_columns", self.top_level_max_columns),
        ] {
            if value == 0 {
                return Err(ValidationError::ColumnCapTooSmall { field, value });
            }
        }
        for (field, value) in [
            ("min_block_height_px", self.min_block_height_px),
            ("min_overlay_height_px", self.min_overlay_height_px),
            ("column_gap_pct", self.column_gap_pct),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ValidationError::NegativeMeasure { field });
            }
        }
        Ok(())
    }

    const fn top_level_scale(&self) -> Scale {
        Scale {
            pixels_per_hour: self.pixels_per_hour,
            min_height_px: self.min_block_height_px,
            column_gap_pct: self.column_gap_pct,
        }
    }

    const fn overlay_scale(&self) -> Scale {
        Scale {
            pixels_per_hour: self.pixels_per_hour,
            min_height_px: self.min_overlay_height_px,
            column_gap_pct: self.column_gap_pct,
        }
    }
}

/// An event with its computed rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedItem {
    pub id: EventId,
    pub event_type: EventType,
    /// Index into the parsed event list.
    pub index: usize,
    pub start_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    pub start_minutes: i64,
    pub duration_minutes: i64,
    #[serde(flatten)]
    pub block: Block,
}

/// The "+N more" marker drawn in place of hidden items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowMarker {
    pub label: String,
    pub hidden_count: usize,
    pub start_minutes: i64,
    #[serde(flatten)]
    pub block: Block,
}

/// A sleep session with its own geometry and nested items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedSession {
    pub id: EventId,
    pub event_type: EventType,
    pub start_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    pub original_start_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_end_time: Option<NaiveDateTime>,
    pub is_continuation_from_previous: bool,
    pub continues_next_day: bool,
    pub in_progress: bool,
    /// Length of the full, unclipped interval.
    pub duration_minutes: i64,
    pub block: Block,
    pub night_wakings: Vec<PositionedItem>,
    pub overlay_events: Vec<PositionedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<OverflowMarker>,
    pub hidden_internal: Vec<EventId>,
    pub hidden_internal_count: usize,
}

/// Everything the renderer needs to draw one day.
///
/// Sessions and `other_events` form one column group: sessions hold column
/// 0 and top-level items that overlap them take the columns beside it, all
/// sharing the same `totalColumns`. Items nested in a session form their own
/// group, and their `leftPct`/`widthPct` are relative to the session block.
/// Every `topPx` is measured from the day's midnight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLayout {
    pub date: NaiveDate,
    pub sessions: Vec<PositionedSession>,
    pub other_events: Vec<PositionedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<OverflowMarker>,
    pub hidden_top_level: Vec<EventId>,
    pub hidden_top_level_count: usize,
    /// Sleep records that lost against an overlapping sleep.
    pub anomalies: Vec<EventId>,
    pub skipped: Vec<SkippedEvent>,
}

/// Seven consecutive days laid out from one parse of the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekLayout {
    pub week_start: NaiveDate,
    /// Each day's `skipped` lists only items that could not be positioned.
    pub days: Vec<DayLayout>,
    /// Events that could not be parsed, reported once for the week.
    pub skipped: Vec<SkippedEvent>,
}

/// Lays out one day from raw events.
///
/// `events` should include the neighbouring days' context (the previous
/// night's sleep, the next morning's events) for cross-midnight stitching.
/// Events that cannot be parsed end up in [`DayLayout::skipped`].
pub fn layout_day(
    events: &[Event],
    date: NaiveDate,
    now: NaiveDateTime,
    config: &LayoutConfig,
) -> DayLayout {
    let (parsed, skipped) = parse_events(events);
    layout_parsed_day(&parsed, skipped, date, now, config)
}

/// Lays out the seven days starting at `week_start`, in parallel.
pub fn layout_week(
    events: &[Event],
    week_start: NaiveDate,
    now: NaiveDateTime,
    config: &LayoutConfig,
) -> WeekLayout {
    let (parsed, skipped) = parse_events(events);
    let days = (0..7_u64)
        .into_par_iter()
        .filter_map(|offset| week_start.checked_add_days(Days::new(offset)))
        .map(|date| layout_parsed_day(&parsed, Vec::new(), date, now, config))
        .collect();
    WeekLayout {
        week_start,
        days,
        skipped,
    }
}

fn layout_parsed_day(
    events: &[TimedEvent],
    mut skipped: Vec<SkippedEvent>,
    date: NaiveDate,
    now: NaiveDateTime,
    config: &LayoutConfig,
) -> DayLayout {
    let day = DayWindow::new(date);
    let reconstruction = reconstruct_sessions(events, &day, now);

    let lane = Lane {
        events,
        day: &day,
        max_columns: config.top_level_max_columns,
        scale: config.top_level_scale(),
    };
    let session_spans: Vec<ColumnItem<&EventId>> = reconstruction
        .sessions
        .iter()
        .map(|session| {
            let start_minutes = day.minutes_from_start(session.start_time);
            let end_minutes = day.minutes_from_start(session.visible_end(&day, now));
            ColumnItem {
                key: &events[session.source].id,
                start_minutes,
                duration_minutes: (end_minutes - start_minutes).max(lane.min_span()),
            }
        })
        .collect();
    let top = lane.place(&session_spans, &reconstruction.other_events, &mut skipped);

    let sessions = reconstruction
        .sessions
        .iter()
        .filter_map(|session| {
            let positioned = position_session(
                events,
                session,
                &day,
                now,
                top.total_columns,
                config,
                &mut skipped,
            );
            match positioned {
                Ok(positioned) => Some(positioned),
                Err(reason) => {
                    skip(&mut skipped, &events[session.source].id, reason);
                    None
                }
            }
        })
        .collect();

    DayLayout {
        date,
        sessions,
        other_events: top.items,
        overflow: top.overflow,
        hidden_top_level_count: top.hidden.len(),
        hidden_top_level: top.hidden,
        anomalies: reconstruction
            .anomalies
            .iter()
            .map(|&i| events[i].id.clone())
            .collect(),
        skipped,
    }
}

fn position_session(
    events: &[TimedEvent],
    session: &SleepSession,
    day: &DayWindow,
    now: NaiveDateTime,
    total_columns: usize,
    config: &LayoutConfig,
    skipped: &mut Vec<SkippedEvent>,
) -> Result<PositionedSession, LayoutError> {
    let source = &events[session.source];
    let start_minutes = day.minutes_from_start(session.start_time);
    let end_minutes = day.minutes_from_start(session.visible_end(day, now));

    let block = geometry::position(
        Placement {
            start_minutes,
            duration_minutes: end_minutes - start_minutes,
            column: 0,
            total_columns: total_columns.max(1),
        },
        config.top_level_scale(),
    )?;

    let lane = Lane {
        events,
        day,
        max_columns: config.session_max_columns,
        scale: config.overlay_scale(),
    };
    let mut nested: Vec<usize> = session
        .night_wakings
        .iter()
        .chain(&session.overlay_events)
        .copied()
        .collect();
    nested.sort_by(|&a, &b| {
        events[a]
            .start
            .cmp(&events[b].start)
            .then_with(|| events[a].id.cmp(&events[b].id))
    });
    let placed = lane.place(&[], &nested, skipped);

    let (night_wakings, overlay_events): (Vec<_>, Vec<_>) = placed
        .items
        .into_iter()
        .partition(|item| item.event_type == EventType::NightWaking);

    Ok(PositionedSession {
        id: source.id.clone(),
        event_type: source.event_type,
        start_time: session.start_time,
        end_time: session.end_time,
        original_start_time: session.original_start_time,
        original_end_time: session.original_end_time,
        is_continuation_from_previous: session.is_continuation_from_previous,
        continues_next_day: session.continues_next_day,
        in_progress: session.is_in_progress(),
        duration_minutes: session.duration_minutes(now),
        block,
        night_wakings,
        overlay_events,
        overflow: placed.overflow,
        hidden_internal_count: placed.hidden.len(),
        hidden_internal: placed.hidden,
    })
}

/// One group of items sharing horizontal space.
struct Lane<'a> {
    events: &'a [TimedEvent],
    day: &'a DayWindow,
    max_columns: usize,
    scale: Scale,
}

struct PlacedLane {
    items: Vec<PositionedItem>,
    overflow: Option<OverflowMarker>,
    hidden: Vec<EventId>,
    total_columns: usize,
}

impl<'a> Lane<'a> {
    /// Minutes covered by a minimum-height block.
    fn min_span(&self) -> i64 {
        geometry::pixels_to_minutes(self.scale.min_height_px, self.scale.pixels_per_hour)
    }

    /// Places `indices` around the `pinned` spans, which keep column 0.
    fn place(
        &self,
        pinned: &[ColumnItem<&'a EventId>],
        indices: &[usize],
        skipped: &mut Vec<SkippedEvent>,
    ) -> PlacedLane {
        // Blocks are at least min_height tall, so columns are assigned on
        // the drawn extent rather than the raw duration.
        let min_span = self.min_span();
        let column_items: Vec<ColumnItem<&'a EventId>> = indices
            .iter()
            .map(|&i| {
                let event = &self.events[i];
                ColumnItem {
                    key: &event.id,
                    start_minutes: self.day.minutes_from_start(event.start),
                    duration_minutes: raw_duration(event).max(min_span),
                }
            })
            .collect();

        let ColumnLayout {
            visible,
            hidden,
            overflow,
            total_columns,
            ..
        } = assign_columns_pinned(pinned, &column_items, self.max_columns);

        let mut items = Vec::with_capacity(visible.len());
        for placed in visible {
            let index = indices[placed.index];
            let event = &self.events[index];
            let start_minutes = column_items[placed.index].start_minutes;
            let duration_minutes = raw_duration(event);
            let block = geometry::position(
                Placement {
                    start_minutes,
                    duration_minutes,
                    column: placed.column,
                    total_columns,
                },
                self.scale,
            );
            match block {
                Ok(block) => items.push(PositionedItem {
                    id: event.id.clone(),
                    event_type: event.event_type,
                    index,
                    start_time: event.start,
                    end_time: event.end,
                    start_minutes,
                    duration_minutes,
                    block,
                }),
                Err(reason) => skip(skipped, &event.id, reason),
            }
        }

        PlacedLane {
            items,
            overflow: overflow.and_then(|slot| self.marker(slot, total_columns)),
            hidden: hidden
                .into_iter()
                .map(|i| self.events[indices[i]].id.clone())
                .collect(),
            total_columns,
        }
    }

    fn marker(&self, slot: OverflowSlot, total_columns: usize) -> Option<OverflowMarker> {
        let block = geometry::position(
            Placement {
                start_minutes: slot.start_minutes,
                duration_minutes: 0,
                column: slot.column,
                total_columns,
            },
            self.scale,
        )
        .ok()?;
        Some(OverflowMarker {
            label: format!("+{} more", slot.hidden_count),
            hidden_count: slot.hidden_count,
            start_minutes: slot.start_minutes,
            block,
        })
    }
}

fn raw_duration(event: &TimedEvent) -> i64 {
    event.duration_minutes().unwrap_or(0).max(0)
}

fn skip(skipped: &mut Vec<SkippedEvent>, id: &EventId, reason: LayoutError) {
    tracing::debug!(%id, error = %reason, "declining to position item");
    skipped.push(SkippedEvent {
        id: id.clone(),
        reason,
    });
}

/// Formats minutes as "Xh Ym", or "Ym" under an hour.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours >= 1 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}
