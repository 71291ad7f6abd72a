//! Attendance timeline CLI library.
//!
//! This crate provides the `att` command-line interface over `att-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, Commands, DayArgs, EditArgs, EditCommand, RecordsArgs, ReportArgs, StatusArgs,
    TimelineArgs,
};
pub use config::Config;
