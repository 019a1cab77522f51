//! Week command: lays out the seven days of a Monday-based week.

use std::io::Write;

use anyhow::Result;
use bt_core::{LayoutConfig, WeekLayout, layout_week};
use serde::Serialize;

use super::day::format_day;
use super::util::{LoadedEvents, UnreadableRecord, resolve_now, week_start};
use crate::cli::LayoutArgs;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOutput<'a> {
    #[serde(flatten)]
    pub layout: &'a WeekLayout,
    pub unreadable: &'a [UnreadableRecord],
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &LayoutArgs,
    loaded: &LoadedEvents,
    config: &LayoutConfig,
) -> Result<()> {
    let now = resolve_now(args.now.as_deref())?;
    let monday = week_start(args.date);
    let week = layout_week(&loaded.events, monday, now, config);
    tracing::debug!(week_start = %monday, days = week.days.len(), "week laid out");

    if args.json {
        let output = WeekOutput {
            layout: &week,
            unreadable: &loaded.unreadable,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Week of {monday}")?;
    for day in &week.days {
        writeln!(writer)?;
        write!(writer, "{}", format_day(day))?;
    }
    if !week.skipped.is_empty() || !loaded.unreadable.is_empty() {
        writeln!(writer)?;
    }
    for skipped in &week.skipped {
        writeln!(writer, "skipped {}: {}", skipped.id, skipped.reason)?;
    }
    for record in &loaded.unreadable {
        writeln!(writer, "unreadable record #{}: {}", record.position, record.message)?;
    }
    Ok(())
}
