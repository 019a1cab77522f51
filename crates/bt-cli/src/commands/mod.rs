//! CLI subcommand implementations.

pub mod check;
pub mod day;
pub mod util;
pub mod week;
