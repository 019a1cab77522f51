//! Day command: lays out one day and prints it as text or JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use bt_core::{DayLayout, LayoutConfig, PositionedItem, format_duration, layout_day};
use bt_core::geometry::DayWindow;
use serde::Serialize;

use super::util::{LoadedEvents, UnreadableRecord, format_clock, resolve_now};
use crate::cli::LayoutArgs;

/// JSON output: the layout plus records that could not be decoded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOutput<'a> {
    #[serde(flatten)]
    pub layout: &'a DayLayout,
    pub unreadable: &'a [UnreadableRecord],
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &LayoutArgs,
    loaded: &LoadedEvents,
    config: &LayoutConfig,
) -> Result<()> {
    let now = resolve_now(args.now.as_deref())?;
    let layout = layout_day(&loaded.events, args.date, now, config);
    tracing::debug!(
        date = %args.date,
        sessions = layout.sessions.len(),
        events = layout.other_events.len(),
        "day laid out"
    );

    if args.json {
        let output = DayOutput {
            layout: &layout,
            unreadable: &loaded.unreadable,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
    } else {
        write!(writer, "{}", format_day(&layout))?;
        for record in &loaded.unreadable {
            writeln!(writer, "unreadable record #{}: {}", record.position, record.message)?;
        }
    }
    Ok(())
}

/// Renders a day layout as an indented text listing.
pub fn format_day(layout: &DayLayout) -> String {
    let mut output = String::new();
    let day = DayWindow::new(layout.date);

    writeln!(output, "{}", layout.date).unwrap();
    if layout.sessions.is_empty() && layout.other_events.is_empty() && layout.overflow.is_none() {
        writeln!(output, "  (no events)").unwrap();
    }

    if !layout.sessions.is_empty() {
        writeln!(output, "sessions:").unwrap();
    }
    for session in &layout.sessions {
        let start = format_clock(day.minutes_from_start(session.start_time));
        let end = session
            .end_time
            .map_or_else(|| "now".to_string(), |t| format_clock(day.minutes_from_start(t)));
        let mut flags = String::new();
        if session.is_continuation_from_previous {
            flags.push_str(" [from previous day]");
        }
        if session.in_progress {
            flags.push_str(" [in progress]");
        } else if session.continues_next_day {
            flags.push_str(" [continues]");
        }
        writeln!(
            output,
            "  {} {start}-{end} ({}){flags}",
            session.event_type,
            format_duration(session.duration_minutes)
        )
        .unwrap();
        writeln!(
            output,
            "    block: top {:.1}px, height {:.1}px",
            session.block.top_px, session.block.height_px
        )
        .unwrap();

        let mut nested: Vec<&PositionedItem> = session
            .night_wakings
            .iter()
            .chain(&session.overlay_events)
            .collect();
        nested.sort_by_key(|item| (item.start_minutes, item.block.column));
        for item in nested {
            writeln!(output, "    {}", format_item(item)).unwrap();
        }
        if let Some(marker) = &session.overflow {
            writeln!(
                output,
                "    {} at {}",
                marker.label,
                format_clock(marker.start_minutes)
            )
            .unwrap();
        }
    }

    if !layout.other_events.is_empty() || layout.overflow.is_some() {
        writeln!(output, "other events:").unwrap();
    }
    for item in &layout.other_events {
        writeln!(output, "  {}", format_item(item)).unwrap();
    }
    if let Some(marker) = &layout.overflow {
        writeln!(
            output,
            "  {} at {}",
            marker.label,
            format_clock(marker.start_minutes)
        )
        .unwrap();
    }

    if !layout.anomalies.is_empty() {
        let ids: Vec<_> = layout.anomalies.iter().map(ToString::to_string).collect();
        writeln!(output, "overlapping sleeps to review: {}", ids.join(", ")).unwrap();
    }

    if !layout.skipped.is_empty() {
        writeln!(output, "skipped:").unwrap();
    }
    for skipped in &layout.skipped {
        writeln!(output, "  {}: {}", skipped.id, skipped.reason).unwrap();
    }

    output
}

fn format_item(item: &PositionedItem) -> String {
    format!(
        "{} {} column {}/{}, top {:.1}px, height {:.1}px",
        item.event_type,
        format_clock(item.start_minutes),
        item.block.column + 1,
        item.block.total_columns,
        item.block.top_px,
        item.block.height_px
    )
}
