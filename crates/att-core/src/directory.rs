//! Employee directory loaded from a fixture file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::AttendanceRecord;
use crate::types::EmployeeId;

/// Lookup failures. Callers render these as a "not found" state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("employee not found: {id}")]
    EmployeeNotFound { id: String },

    #[error("no attendance record for employee {employee_id} on {date}")]
    RecordNotFound { employee_id: String, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub nickname: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(default)]
    pub attendance_records: Vec<AttendanceRecord>,
}

impl Employee {
    /// `nickname(name)`, as shown in tables.
    pub fn display_name(&self) -> String {
        format!("{}({})", self.nickname, self.name)
    }

    /// The record for `date`. Records with unparseable dates never match.
    pub fn record_on(&self, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.attendance_records
            .iter()
            .find(|r| r.parsed_date().is_ok_and(|d| d == date))
    }

    /// Case-insensitive match on name or nickname.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.nickname.to_lowercase().contains(&query)
    }
}

/// All employees known to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    pub employees: Vec<Employee>,
}

impl Directory {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn employee(&self, id: &str) -> Result<&Employee, DirectoryError> {
        self.employees
            .iter()
            .find(|e| e.id.as_str() == id)
            .ok_or_else(|| DirectoryError::EmployeeNotFound { id: id.to_string() })
    }

    pub fn record(&self, id: &str, date: NaiveDate) -> Result<&AttendanceRecord, DirectoryError> {
        self.employee(id)?
            .record_on(date)
            .ok_or_else(|| DirectoryError::RecordNotFound {
                employee_id: id.to_string(),
                date,
            })
    }

    /// Distinct team names, sorted.
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = self.employees.iter().map(|e| e.team.as_str()).collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }
}
