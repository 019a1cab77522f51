//! Time-to-pixel conversion for a 24-hour vertical timeline.
//!
//! Everything here is stateless arithmetic. [`DayWindow`] carries the day
//! boundaries the session reconstruction needs; [`Block`] is the final
//! rectangle handed to the renderer.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::error::LayoutError;

/// Minutes in a rendered day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Minutes since local midnight of the time component, in `[0, 1440)`.
pub fn minutes_since_midnight<T: Timelike>(time: &T) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Converts minutes into a pixel distance.
#[allow(clippy::cast_precision_loss)]
pub fn to_pixels(minutes: i64, pixels_per_hour: u32) -> f64 {
    minutes as f64 * f64::from(pixels_per_hour) / 60.0
}

/// Converts a pixel distance back into whole minutes, rounding up.
#[allow(clippy::cast_possible_truncation)]
pub fn pixels_to_minutes(pixels: f64, pixels_per_hour: u32) -> i64 {
    if pixels <= 0.0 || pixels_per_hour == 0 {
        return 0;
    }
    (pixels * 60.0 / f64::from(pixels_per_hour)).ceil() as i64
}

/// The visible part of an interval after clipping to the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClip {
    pub visible_duration_minutes: i64,
    /// The interval runs past the bottom edge of the day.
    pub truncated: bool,
}

/// Caps a duration so that it ends no later than midnight.
///
/// Negative durations become zero. A start at or past 1440 yields zero
/// visible minutes; rejecting such items is the caller's job.
pub fn clip_to_day(start_minutes: i64, duration_minutes: i64) -> DayClip {
    let duration = duration_minutes.max(0);
    let remaining = (MINUTES_PER_DAY - start_minutes).max(0);
    if duration > remaining {
        DayClip {
            visible_duration_minutes: remaining,
            truncated: true,
        }
    } else {
        DayClip {
            visible_duration_minutes: duration,
            truncated: false,
        }
    }
}

/// The half-open local-time range `[midnight, next midnight)` of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayWindow {
    pub fn new(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        let end = start
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDateTime::MAX);
        Self { date, start, end }
    }

    /// True when `t` lies within the day, start inclusive.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t < self.end
    }

    /// Signed whole minutes from this day's midnight to `t`.
    pub fn minutes_from_start(&self, t: NaiveDateTime) -> i64 {
        (t - self.start).num_minutes()
    }
}

/// Pixel geometry of one timeline rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub top_px: f64,
    pub height_px: f64,
    pub column: usize,
    pub total_columns: usize,
    pub left_pct: f64,
    pub width_pct: f64,
    /// The underlying interval was cut at midnight.
    pub truncated: bool,
}

/// Inputs of [`position`], grouped to keep call sites readable.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub start_minutes: i64,
    pub duration_minutes: i64,
    pub column: usize,
    pub total_columns: usize,
}

/// Horizontal and vertical scale of the timeline.
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub pixels_per_hour: u32,
    pub min_height_px: f64,
    pub column_gap_pct: f64,
}

/// Computes the rectangle of an item, clipping its height at midnight.
#[allow(clippy::cast_precision_loss)]
pub fn position(placement: Placement, scale: Scale) -> Result<Block, LayoutError> {
    let Placement {
        start_minutes,
        duration_minutes,
        column,
        total_columns,
    } = placement;
    if !(0..MINUTES_PER_DAY).contains(&start_minutes) {
        return Err(LayoutError::OutOfRangeGeometry { start_minutes });
    }

    let clip = clip_to_day(start_minutes, duration_minutes);
    let total = total_columns.max(1);

    Ok(Block {
        top_px: to_pixels(start_minutes, scale.pixels_per_hour),
        height_px: to_pixels(clip.visible_duration_minutes, scale.pixels_per_hour)
            .max(scale.min_height_px),
        column,
        total_columns: total,
        left_pct: column as f64 / total as f64 * 100.0,
        width_pct: (100.0 / total as f64 - scale.column_gap_pct).max(0.0),
        truncated: clip.truncated,
    })
}
