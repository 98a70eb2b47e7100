//! Usage statistics CLI library.
//!
//! This crate provides the CLI interface for usage reports.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, RangeArgs, StatsArgs, StatsPeriod};
pub use config::Config;
