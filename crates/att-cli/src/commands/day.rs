//! Day command: raw status-change log, edit history, memo and totals.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::{
    AttendanceRecord, Directory, EditHistory, Employee, StatusChange, TimelineConfig, format_hours,
};
use chrono::NaiveDate;

use crate::Config;
use crate::cli::DayArgs;
use crate::commands::timeline::day_header;

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &DayArgs,
    config: &Config,
) -> Result<()> {
    let timeline_config = config.timeline_config()?;
    let employee = directory.employee(&args.employee)?;
    let record = directory.record(&args.employee, args.date)?;
    write!(
        writer,
        "{}",
        format_day(employee, args.date, record, &timeline_config)?
    )?;
    Ok(())
}

/// Formats the day detail page.
pub fn format_day(
    employee: &Employee,
    date: NaiveDate,
    record: &AttendanceRecord,
    config: &TimelineConfig,
) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", day_header(employee, date)).unwrap();

    writeln!(out).unwrap();
    writeln!(out, "STATUS CHANGES").unwrap();
    writeln!(out, "──────────────").unwrap();
    if record.status_changes.is_empty() {
        writeln!(out, "(none)").unwrap();
    }
    for change in &record.status_changes {
        writeln!(out, "{}", change_line(change)).unwrap();
    }

    writeln!(out).unwrap();
    writeln!(out, "EDIT HISTORY").unwrap();
    writeln!(out, "────────────").unwrap();
    if record.edit_history.is_empty() {
        writeln!(out, "(none)").unwrap();
    }
    for entry in &record.edit_history {
        writeln!(out, "{}", history_line(entry)).unwrap();
    }

    if let Some(memo) = &record.memo {
        writeln!(out).unwrap();
        writeln!(out, "MEMO").unwrap();
        writeln!(out, "────").unwrap();
        writeln!(out, "{memo}").unwrap();
        if let (Some(by), Some(at)) = (&record.memo_updated_by, record.memo_updated_at) {
            writeln!(out, "(updated by {by} at {})", at.format("%Y-%m-%d %H:%M")).unwrap();
        }
    }

    let derived = record.derived_totals(config)?;
    let drift = record.total_drift(config)?;
    writeln!(out).unwrap();
    writeln!(out, "TOTALS").unwrap();
    writeln!(out, "──────").unwrap();
    writeln!(
        out,
        "stored:  work {}, break {}",
        format_hours(record.total_work_hours),
        format_hours(record.total_break_hours)
    )
    .unwrap();
    writeln!(
        out,
        "derived: work {}, break {}",
        format_hours(derived.work_hours()),
        format_hours(derived.break_hours())
    )
    .unwrap();
    if drift.is_significant() {
        writeln!(out, "Stored totals differ from the status changes.").unwrap();
    }
    Ok(out)
}

fn change_line(change: &StatusChange) -> String {
    let source = if change.is_manual_entry {
        match &change.created_by {
            Some(by) => format!("manual by {by}"),
            None => "manual".to_string(),
        }
    } else {
        match (&change.slack_keyword, &change.slack_message_link) {
            (Some(keyword), Some(link)) => format!("slack \"{keyword}\" {link}"),
            (Some(keyword), None) => format!("slack \"{keyword}\""),
            (None, Some(link)) => link.clone(),
            (None, None) => String::new(),
        }
    };
    let line = format!("{}  {:<7} {source}", change.time, change.status.label());
    line.trim_end().to_string()
}

fn history_line(entry: &EditHistory) -> String {
    let mut line = format!(
        "{}  {}  {}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.edited_by,
        entry.action,
        entry.description
    );
    match (&entry.old_value, &entry.new_value) {
        (Some(old), Some(new)) => {
            write!(line, " ({} -> {})", audit_value(old), audit_value(new)).unwrap();
        }
        (Some(old), None) => {
            write!(line, " (was {})", audit_value(old)).unwrap();
        }
        (None, Some(new)) => {
            write!(line, " (now {})", audit_value(new)).unwrap();
        }
        (None, None) => {}
    }
    line
}

fn audit_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
