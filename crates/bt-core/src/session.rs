//! Sleep session reconstruction for one rendered day.
//!
//! Raw `sleep`/`nap` records become [`SleepSession`]s clipped to the day,
//! and the shorter events that happen during a sleep are nested inside it.
//! Sessions refer to events by index into the parsed event slice.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};

use crate::event::TimedEvent;
use crate::event_type::Attachment;
use crate::geometry::DayWindow;

/// One continuous sleep or nap as visible on the rendered day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepSession {
    /// Index of the sleep event this session was built from.
    pub source: usize,
    /// Visible start, never before the day's midnight.
    pub start_time: NaiveDateTime,
    /// Visible end, never after the next midnight. `None` while in progress.
    pub end_time: Option<NaiveDateTime>,
    pub original_start_time: NaiveDateTime,
    pub original_end_time: Option<NaiveDateTime>,
    /// Indices of `night_waking` events inside the session, by start time.
    pub night_wakings: Vec<usize>,
    /// Indices of feedings, medications, activities and notes inside the session.
    pub overlay_events: Vec<usize>,
    pub is_continuation_from_previous: bool,
    pub continues_next_day: bool,
}

impl SleepSession {
    pub const fn is_in_progress(&self) -> bool {
        self.original_end_time.is_none()
    }

    /// Length of the full, unclipped interval. Open sessions run until `now`.
    pub fn duration_minutes(&self, now: NaiveDateTime) -> i64 {
        (self.original_end_time.unwrap_or(now) - self.original_start_time)
            .num_minutes()
            .max(0)
    }

    /// Where the block stops on this day. Open sessions are drawn up to `now`.
    pub fn visible_end(&self, day: &DayWindow, now: NaiveDateTime) -> NaiveDateTime {
        self.end_time
            .unwrap_or_else(|| now.max(self.start_time).min(day.end))
    }

    /// Start-inclusive, end-exclusive membership test on the true interval.
    fn covers(&self, t: NaiveDateTime, now: NaiveDateTime) -> bool {
        t >= self.original_start_time && t < self.original_end_time.unwrap_or(now)
    }
}

/// Output of [`reconstruct_sessions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    /// Sessions ordered by visible start.
    pub sessions: Vec<SleepSession>,
    /// Indices of events drawn on the top-level lane, ordered by start.
    pub other_events: Vec<usize>,
    /// Sleep records that lost a tie-break against an overlapping sleep.
    /// Those starting on the rendered day are also in `other_events`.
    pub anomalies: Vec<usize>,
}

/// Builds the sleep sessions and remaining events for `day`.
///
/// `events` may include context from neighbouring days (the previous
/// evening's sleep, the next morning's events); only what intersects `day`
/// is returned. Overlapping sleep records are resolved across the whole
/// slice in favour of the longer one, then the later start, so every day
/// sees the same winners.
pub fn reconstruct_sessions(
    events: &[TimedEvent],
    day: &DayWindow,
    now: NaiveDateTime,
) -> Reconstruction {
    let effective_end = |e: &TimedEvent| e.end.unwrap_or(now).max(e.start);

    let (mut candidates, rest): (Vec<usize>, Vec<usize>) =
        (0..events.len()).partition(|&i| events[i].event_type.is_sleep());

    // Clashes are resolved over every sleep, not just this day's, so both
    // fragments of an overnight sleep agree on the winner.
    candidates.sort_by(|&a, &b| rank(&events[a], &events[b], effective_end).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::new();
    let mut anomalies = Vec::new();
    for idx in candidates {
        let e = &events[idx];
        let clash = kept.iter().find(|&&k| {
            let other = &events[k];
            e.start == other.start || (e.start < effective_end(other) && other.start < effective_end(e))
        });
        if let Some(&winner) = clash {
            tracing::debug!(id = %e.id, kept = %events[winner].id, "overlapping sleep left for review");
            anomalies.push(idx);
        } else {
            kept.push(idx);
        }
    }
    let visible = |idx: &usize| {
        let e = &events[*idx];
        let visible = e.start < day.end && (effective_end(e) > day.start || e.start >= day.start);
        if !visible {
            tracing::trace!(id = %e.id, "sleep does not intersect rendered day");
        }
        visible
    };
    kept.retain(&visible);
    anomalies.retain(&visible);
    kept.sort_by(|&a, &b| by_start(&events[a], &events[b]));

    let mut sessions: Vec<SleepSession> = kept
        .into_iter()
        .map(|idx| session_shell(idx, &events[idx], day))
        .collect();

    let mut other_events = Vec::new();
    for idx in rest {
        let e = &events[idx];
        let host = sessions.iter_mut().find(|s| s.covers(e.start, now));
        let slot = match (host, e.event_type.attachment()) {
            (Some(session), Attachment::NightWaking) => Some(&mut session.night_wakings),
            (Some(session), Attachment::Overlay) => Some(&mut session.overlay_events),
            _ => None,
        };

        if !day.contains(e.start) {
            tracing::trace!(id = %e.id, "event outside rendered day");
            continue;
        }
        match slot {
            Some(list) => list.push(idx),
            None => other_events.push(idx),
        }
    }

    for &idx in &anomalies {
        if day.contains(events[idx].start) {
            other_events.push(idx);
        } else {
            tracing::debug!(id = %events[idx].id, "overlapping sleep starts before rendered day");
        }
    }

    for session in &mut sessions {
        session.night_wakings.sort_by(|&a, &b| by_start(&events[a], &events[b]));
        session.overlay_events.sort_by(|&a, &b| by_start(&events[a], &events[b]));
    }
    other_events.sort_by(|&a, &b| by_start(&events[a], &events[b]));

    Reconstruction {
        sessions,
        other_events,
        anomalies,
    }
}

fn session_shell(source: usize, event: &TimedEvent, day: &DayWindow) -> SleepSession {
    let is_continuation_from_previous = event.start < day.start;
    let start_time = event.start.max(day.start);

    let (end_time, continues_next_day) = match event.end {
        Some(end) if end > day.end => (Some(day.end), true),
        Some(end) => (Some(end), false),
        None => (None, true),
    };

    SleepSession {
        source,
        start_time,
        end_time,
        original_start_time: event.start,
        original_end_time: event.end,
        night_wakings: Vec::new(),
        overlay_events: Vec::new(),
        is_continuation_from_previous,
        continues_next_day,
    }
}

/// Orders sleep candidates best first: longest, then latest start, then id.
fn rank(
    a: &TimedEvent,
    b: &TimedEvent,
    effective_end: impl Fn(&TimedEvent) -> NaiveDateTime,
) -> Ordering {
    let duration = |e: &TimedEvent| -> Duration { effective_end(e) - e.start };
    duration(b)
        .cmp(&duration(a))
        .then_with(|| b.start.cmp(&a.start))
        .then_with(|| a.id.cmp(&b.id))
}

fn by_start(a: &TimedEvent, b: &TimedEvent) -> Ordering {
    a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id))
}
