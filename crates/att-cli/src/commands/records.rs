//! Records command: an employee's days in a range, most recent first.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::{
    AttendanceRecord, DateRange, Directory, RangeTotals, aggregate_hours, format_hours,
    month_totals, records_in_range, work_pattern,
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::Config;
use crate::cli::RecordsArgs;
use crate::commands::util::plural;

/// The days a records listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month { year: i32, month: u32 },
    Range(DateRange),
}

impl Period {
    /// Explicit bounds, the last N days, or else the month containing `today`.
    pub fn from_args(args: &RecordsArgs, today: NaiveDate) -> Self {
        match (args.from, args.to, args.last) {
            (_, _, Some(days)) => Self::Range(DateRange::last_days(today, days)),
            (None, None, None) => Self::Month {
                year: today.year(),
                month: today.month(),
            },
            (from, to, None) => Self::Range(DateRange::new(from, to)),
        }
    }

    pub fn range(self) -> DateRange {
        match self {
            Self::Month { year, month } => DateRange::month(year, month).unwrap_or_default(),
            Self::Range(range) => range,
        }
    }

    pub fn totals(self, records: &[AttendanceRecord]) -> RangeTotals {
        match self {
            Self::Month { year, month } => month_totals(records, year, month),
            Self::Range(range) => aggregate_hours(records, &range),
        }
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &RecordsArgs,
    config: &Config,
) -> Result<()> {
    let employee = directory.employee(&args.employee)?;
    let period = Period::from_args(args, config.today()?);
    let range = period.range();
    let records = records_in_range(&employee.attendance_records, &range);
    let totals = period.totals(&employee.attendance_records);

    if args.json {
        writeln!(writer, "{}", format_records_json(&records, &totals)?)?;
    } else {
        write!(writer, "{}", format_records(&range, &records, &totals))?;
    }
    Ok(())
}

/// Formats records as a table with a total line.
pub fn format_records(
    range: &DateRange,
    records: &[&AttendanceRecord],
    totals: &RangeTotals,
) -> String {
    let mut out = String::new();

    if let Some((from, to)) = range.bounds() {
        writeln!(out, "Records {from} to {to}").unwrap();
        writeln!(out).unwrap();
    }

    if records.is_empty() {
        writeln!(out, "No records in range.").unwrap();
    } else {
        writeln!(out, "DATE        WORK      BREAK     CHANGES").unwrap();
        writeln!(out, "────        ────      ─────     ───────").unwrap();
        for record in records {
            let mut line = format!(
                "{:<11} {:<9} {:<9} {}",
                record.date,
                format_hours(record.total_work_hours),
                format_hours(record.total_break_hours),
                record.status_changes.len()
            );
            if record.has_manual_entries() {
                line.push_str(" (manual)");
            }
            if record.memo.is_some() {
                line.push_str(" (memo)");
            }
            writeln!(out, "{line}").unwrap();
        }

        let pattern = work_pattern(records.iter().copied());
        writeln!(out).unwrap();
        writeln!(
            out,
            "Total: work {}, break {} over {}",
            format_hours(totals.work_hours),
            format_hours(totals.break_hours),
            plural(totals.included_records, "day")
        )
        .unwrap();
        writeln!(
            out,
            "Office days: {}, remote days: {}",
            pattern.office_days, pattern.remote_days
        )
        .unwrap();
    }

    if totals.has_exclusions() {
        let dates: Vec<&str> = totals.excluded.iter().map(|e| e.date.as_str()).collect();
        writeln!(
            out,
            "Skipped {} with invalid dates: {}",
            plural(totals.excluded.len(), "record"),
            dates.join(", ")
        )
        .unwrap();
    }
    out
}

#[derive(Debug, Serialize)]
struct RecordsJson<'a> {
    records: &'a [&'a AttendanceRecord],
    totals: &'a RangeTotals,
}

/// Formats records and totals as pretty JSON.
pub fn format_records_json(
    records: &[&AttendanceRecord],
    totals: &RangeTotals,
) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RecordsJson { records, totals })?)
}
