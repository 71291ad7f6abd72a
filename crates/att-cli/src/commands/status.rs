//! Status command: company and per-team headcounts at one moment of a day.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use att_core::{
    CompanyPresence, DayMinute, Directory, TeamStatus, TimeValue, company_presence_at,
    team_status_at,
};
use serde::Serialize;

use crate::Config;
use crate::cli::StatusArgs;

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &StatusArgs,
    config: &Config,
) -> Result<()> {
    let timeline_config = config.timeline_config()?;
    let minute = TimeValue::parse(&args.at)
        .and_then(|value| value.resolve(args.date, timeline_config.utc_offset))
        .with_context(|| format!("invalid --at time {:?}", args.at))?;
    let company = company_presence_at(directory, args.date, minute, &timeline_config);
    let teams = team_status_at(directory, args.date, minute, &timeline_config);

    if args.json {
        let json = StatusJson {
            company: &company,
            teams: &teams,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&json)?)?;
    } else {
        write!(writer, "{}", format_status(minute, &company, &teams))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusJson<'a> {
    company: &'a CompanyPresence,
    teams: &'a [TeamStatus],
}

/// Formats company totals, office presence and the per-team table.
pub fn format_status(
    minute: DayMinute,
    company: &CompanyPresence,
    teams: &[TeamStatus],
) -> String {
    let mut out = String::new();
    writeln!(out, "Status at {minute}").unwrap();
    writeln!(out).unwrap();

    if teams.is_empty() {
        writeln!(out, "No employees.").unwrap();
        return out;
    }

    writeln!(
        out,
        "Working: {} (office {}, remote {})",
        company.working(),
        company.office,
        company.remote
    )
    .unwrap();
    writeln!(out, "Break: {}, off: {}", company.on_break, company.off).unwrap();
    if !company.offices.is_empty() {
        let offices: Vec<String> = company
            .offices
            .iter()
            .map(|o| format!("{} {}/{}", o.office, o.present, o.members))
            .collect();
        writeln!(out, "Offices: {}", offices.join(", ")).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(
        out,
        "{:<16} {:>7} {:>7} {:>7} {:>7}",
        "TEAM", "MEMBERS", "WORKING", "BREAK", "OFF"
    )
    .unwrap();
    for team in teams {
        writeln!(
            out,
            "{:<16} {:>7} {:>7} {:>7} {:>7}",
            team.team, team.members, team.working, team.on_break, team.off
        )
        .unwrap();
    }
    out
}
