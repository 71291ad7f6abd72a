//! Report command: employees ranked by work hours in a date range.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::{
    DashboardRow, DateRange, Directory, Selection, TeamFilter, dashboard_rows, format_hours,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::Config;
use crate::cli::ReportArgs;
use crate::commands::util::plural;

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &ReportArgs,
    config: &Config,
) -> Result<()> {
    let selection = selection_from_args(args, config.today()?);
    if let Some(message) = unknown_team(directory, &selection.team) {
        writeln!(writer, "{message}")?;
        return Ok(());
    }
    let rows = dashboard_rows(directory, &selection);

    if args.json {
        writeln!(writer, "{}", format_report_json(&selection, &rows)?)?;
    } else {
        write!(writer, "{}", format_report(&selection, &rows))?;
    }
    Ok(())
}

/// The range is `--last N` days, explicit bounds, or the week containing
/// `today` when no bound is given. A single bound leaves the range open.
fn selection_from_args(args: &ReportArgs, today: NaiveDate) -> Selection {
    let range = match (args.from, args.to, args.last) {
        (_, _, Some(days)) => DateRange::last_days(today, days),
        (None, None, None) => DateRange::week_of(today),
        (from, to, None) => DateRange::new(from, to),
    };
    let Ok(team) = args.team.as_deref().unwrap_or("all").parse::<TeamFilter>();
    Selection {
        range,
        team,
        query: args.query.clone(),
    }
}

/// A message naming the known teams when `team` matches none of them.
fn unknown_team(directory: &Directory, team: &TeamFilter) -> Option<String> {
    let TeamFilter::Team(name) = team else {
        return None;
    };
    let teams = directory.teams();
    if teams.contains(&name.as_str()) {
        return None;
    }
    Some(format!("No team named {name:?}. Teams: {}", teams.join(", ")))
}

/// Formats the ranked rows as a table with a total line.
pub fn format_report(selection: &Selection, rows: &[DashboardRow]) -> String {
    let mut out = String::new();

    let Some((from, to)) = selection.range.bounds() else {
        writeln!(out, "No date range selected; pass --from and --to.").unwrap();
        return out;
    };

    writeln!(
        out,
        "Work hours {} to {}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    )
    .unwrap();
    writeln!(out).unwrap();

    if rows.is_empty() {
        writeln!(out, "No matching employees.").unwrap();
        return out;
    }

    writeln!(out, "{}", report_line("NAME", "TEAM", "WORK", "BREAK")).unwrap();
    writeln!(out, "{}", report_line("────", "────", "────", "─────")).unwrap();
    for row in rows {
        let line = report_line(
            &row.display_name,
            &row.team,
            &format_hours(row.totals.work_hours),
            &format_hours(row.totals.break_hours),
        );
        writeln!(out, "{line}").unwrap();
    }

    let work: f64 = rows.iter().map(|r| r.totals.work_hours).sum();
    let excluded: usize = rows.iter().map(|r| r.totals.excluded.len()).sum();
    writeln!(out).unwrap();
    writeln!(
        out,
        "Total: {} across {}",
        format_hours(work),
        plural(rows.len(), "employee")
    )
    .unwrap();
    if excluded > 0 {
        writeln!(out, "Skipped {} with invalid dates.", plural(excluded, "record")).unwrap();
    }
    out
}

fn report_line(name: &str, team: &str, work: &str, breaks: &str) -> String {
    let line = format!("{name:<24} {team:<14} {work:>8} {breaks:>8}");
    line.trim_end().to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    range: DateRange,
    rows: &'a [DashboardRow],
}

/// Formats the ranked rows as pretty JSON.
pub fn format_report_json(selection: &Selection, rows: &[DashboardRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ReportJson {
        range: selection.range,
        rows,
    })?)
}
