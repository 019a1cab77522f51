//! Check command: reports records that cannot be laid out.

use std::io::Write;

use anyhow::{Result, bail};
use bt_core::parse_events;

use super::util::LoadedEvents;

/// Lists unreadable and malformed records. Fails when any are found.
pub fn run<W: Write>(writer: &mut W, loaded: &LoadedEvents) -> Result<()> {
    let (parsed, skipped) = parse_events(&loaded.events);

    for record in &loaded.unreadable {
        writeln!(writer, "record #{}: {}", record.position, record.message)?;
    }
    for event in &skipped {
        writeln!(writer, "{}: {}", event.id, event.reason)?;
    }

    let problems = loaded.unreadable.len() + skipped.len();
    if problems > 0 {
        bail!(
            "{problems} of {} records cannot be laid out",
            loaded.events.len() + loaded.unreadable.len()
        );
    }
    writeln!(writer, "{} events OK", parsed.len())?;
    Ok(())
}
