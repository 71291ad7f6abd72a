//! Command-line argument definitions.

use std::path::PathBuf;

use att_core::WorkStatus;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Attendance timelines and reports.
///
/// Reads an employee directory with per-day status changes and renders
/// day timelines and date-range hour totals.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the attendance data file (overrides `data_path`).
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one employee's timeline for a day.
    Timeline(TimelineArgs),

    /// Show the status-change log, edit history and totals of a day.
    Day(DayArgs),

    /// List an employee's records in a date range, most recent first.
    Records(RecordsArgs),

    /// Rank employees by work hours in a date range.
    Report(ReportArgs),

    /// Count who is working, on break or off per team at one moment.
    Status(StatusArgs),

    /// Preview an edit of one day's record. The data file is not changed.
    Edit(EditArgs),
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Employee ID.
    pub employee: String,

    /// Day to show (YYYY-MM-DD).
    pub date: NaiveDate,

    /// Include the terminal off segment.
    #[arg(long)]
    pub all: bool,

    /// Fail instead of skipping status changes with malformed times.
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Employee ID.
    pub employee: String,

    /// Day to show (YYYY-MM-DD).
    pub date: NaiveDate,
}

#[derive(Debug, Args)]
pub struct RecordsArgs {
    /// Employee ID.
    pub employee: String,

    /// First day of the range (inclusive). Defaults to the current month.
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of the range (inclusive).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// The last N days up to today instead of a range.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub last: Option<u64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// First day of the range (inclusive). Without --from and --to the
    /// current week (Sunday to Saturday) is used.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the range (inclusive).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// The last N days up to today instead of a range.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub last: Option<u64>,

    /// Only include this team ("all" for every team).
    #[arg(long)]
    pub team: Option<String>,

    /// Filter by name or nickname.
    #[arg(long, short)]
    pub query: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Day to inspect (YYYY-MM-DD).
    pub date: NaiveDate,

    /// Moment of the day (HH:MM or RFC 3339).
    #[arg(long, default_value = "12:00")]
    pub at: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Employee ID.
    pub employee: String,

    /// Day of the record to edit (YYYY-MM-DD).
    pub date: NaiveDate,

    /// Name recorded in the edit history.
    #[arg(long, default_value = "att")]
    pub editor: String,

    /// Print the edited record as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub change: EditCommand,
}

/// Edits that can be previewed.
#[derive(Debug, Subcommand)]
pub enum EditCommand {
    /// Add a manual status change.
    Add {
        /// HH:MM or RFC 3339.
        time: String,
        status: WorkStatus,
    },

    /// Change the time and/or status of a status change.
    Update {
        /// Status change ID.
        id: String,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        status: Option<WorkStatus>,
    },

    /// Replace a status change with a manual correction.
    Correct {
        /// Status change ID.
        id: String,
        time: String,
        status: WorkStatus,
    },

    /// Remove a status change.
    Remove {
        /// Status change ID.
        id: String,
    },

    /// Set the day's memo. An empty text clears it.
    Memo { text: String },
}
