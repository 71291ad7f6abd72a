//! Dashboard views over the directory: ranked totals, team status, work pattern.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{DateRange, RangeTotals, aggregate_hours};
use crate::directory::{Directory, Employee};
use crate::record::AttendanceRecord;
use crate::status::WorkStatus;
use crate::time::DayMinute;
use crate::timeline::TimelineConfig;
use crate::types::EmployeeId;

/// Which teams a view includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    pub fn matches(&self, team: &str) -> bool {
        match self {
            Self::All => true,
            Self::Team(name) => name == team,
        }
    }
}

impl FromStr for TeamFilter {
    type Err = std::convert::Infallible;

    /// `all` (any case) or `전체` select every team.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s == "전체" {
            Ok(Self::All)
        } else {
            Ok(Self::Team(s.to_string()))
        }
    }
}

/// The view state of a dashboard, passed in explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub range: DateRange,
    pub team: TeamFilter,
    pub query: Option<String>,
}

impl Selection {
    pub fn matches(&self, employee: &Employee) -> bool {
        self.team.matches(&employee.team)
            && self
                .query
                .as_deref()
                .is_none_or(|q| employee.matches_query(q))
    }
}

/// One row of the ranked hours table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub employee_id: EmployeeId,
    pub display_name: String,
    pub team: String,
    pub totals: RangeTotals,
}

/// Matching employees with their range totals, most hours first.
pub fn dashboard_rows(directory: &Directory, selection: &Selection) -> Vec<DashboardRow> {
    let mut rows: Vec<DashboardRow> = directory
        .employees
        .iter()
        .filter(|e| selection.matches(e))
        .map(|e| DashboardRow {
            employee_id: e.id.clone(),
            display_name: e.display_name(),
            team: e.team.clone(),
            totals: aggregate_hours(&e.attendance_records, &selection.range),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.totals
            .work_hours
            .total_cmp(&a.totals.work_hours)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    rows
}

/// How many members of a team are in each state at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatus {
    pub team: String,
    pub members: usize,
    pub working: usize,
    pub on_break: usize,
    pub off: usize,
}

/// Team headcounts by status at `minute` of `date`, sorted by team name.
///
/// Employees with no record, an unreadable record, or no segment covering
/// the minute count as off.
pub fn team_status_at(
    directory: &Directory,
    date: NaiveDate,
    minute: DayMinute,
    config: &TimelineConfig,
) -> Vec<TeamStatus> {
    let mut teams: BTreeMap<&str, TeamStatus> = BTreeMap::new();

    for employee in &directory.employees {
        let status = status_of(employee, date, minute, config);

        let entry = teams
            .entry(employee.team.as_str())
            .or_insert_with(|| TeamStatus {
                team: employee.team.clone(),
                ..TeamStatus::default()
            });
        entry.members += 1;
        match status {
            Some(s) if s.is_work() => entry.working += 1,
            Some(WorkStatus::Break) => entry.on_break += 1,
            _ => entry.off += 1,
        }
    }

    teams.into_values().collect()
}

/// Members of one office and how many are working there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficePresence {
    pub office: String,
    pub members: usize,
    /// Members in `work_office` status.
    pub present: usize,
}

/// Company-wide headcounts at one instant, with office and remote work
/// counted apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPresence {
    pub office: usize,
    pub remote: usize,
    pub on_break: usize,
    pub off: usize,
    /// Per-office presence, sorted by office name. Employees without an
    /// office are left out.
    pub offices: Vec<OfficePresence>,
}

impl CompanyPresence {
    pub const fn working(&self) -> usize {
        self.office + self.remote
    }
}

/// Company headcounts at `minute` of `date`. Missing records count as off.
pub fn company_presence_at(
    directory: &Directory,
    date: NaiveDate,
    minute: DayMinute,
    config: &TimelineConfig,
) -> CompanyPresence {
    let mut presence = CompanyPresence::default();
    let mut offices: BTreeMap<&str, OfficePresence> = BTreeMap::new();

    for employee in &directory.employees {
        let status = status_of(employee, date, minute, config);
        match status {
            Some(WorkStatus::WorkOffice) => presence.office += 1,
            Some(WorkStatus::WorkRemote) => presence.remote += 1,
            Some(WorkStatus::Break) => presence.on_break += 1,
            Some(WorkStatus::Off) | None => presence.off += 1,
        }

        if let Some(office) = employee.office.as_deref() {
            let entry = offices.entry(office).or_insert_with(|| OfficePresence {
                office: office.to_string(),
                ..OfficePresence::default()
            });
            entry.members += 1;
            if status == Some(WorkStatus::WorkOffice) {
                entry.present += 1;
            }
        }
    }

    presence.offices = offices.into_values().collect();
    presence
}

fn status_of(
    employee: &Employee,
    date: NaiveDate,
    minute: DayMinute,
    config: &TimelineConfig,
) -> Option<WorkStatus> {
    employee
        .record_on(date)
        .and_then(|r| r.timeline(config).ok())
        .and_then(|t| t.status_at(minute))
}

/// Days with any office status and days with any remote status.
///
/// A day with both counts toward both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPattern {
    pub office_days: usize,
    pub remote_days: usize,
}

pub fn work_pattern<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> WorkPattern {
    records.into_iter().fold(WorkPattern::default(), |mut pattern, record| {
        let has = |status: WorkStatus| record.status_changes.iter().any(|c| c.status == status);
        if has(WorkStatus::WorkOffice) {
            pattern.office_days += 1;
        }
        if has(WorkStatus::WorkRemote) {
            pattern.remote_days += 1;
        }
        pattern
    })
}

/// Formats hours as `"{h}h {m}m"`, or `"{h}h"` on the hour. Minutes are
/// floored; negative or non-finite input renders as `0h`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0h".to_string();
    }
    let total_minutes = (hours * 60.0 + 1e-9).floor() as u64;
    let (h, m) = (total_minutes / 60, total_minutes % 60);
    if m > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{h}h")
    }
}
