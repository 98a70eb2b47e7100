//! CLI subcommand implementations.

pub mod stats;
pub mod status;
