//! Per-day attendance records and their status changes.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::WorkStatus;
use crate::time::{DayMinute, TimeValue};
use crate::timeline::{DayTotals, Timeline, TimelineConfig, TimelineError, segment_day};
use crate::types::{EditId, StatusChangeId};

/// Format of record dates in fixture files.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// A record's `date` is not a calendar date.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("invalid record date {date:?}")]
pub struct InvalidRecordDate {
    pub date: String,
}

/// A transition into a new work status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: StatusChangeId,

    /// Raw time as written: `HH:MM` or an RFC 3339 instant.
    ///
    /// Kept unparsed so a single bad value only excludes this event.
    pub time: String,

    pub status: WorkStatus,

    /// Keyword of the chat message that triggered the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_keyword: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_message_link: Option<String>,

    /// Added directly by a user rather than inferred from a message.
    #[serde(default)]
    pub is_manual_entry: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// The change this one replaced through a correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrects: Option<StatusChangeId>,
}

impl StatusChange {
    /// Creates a change with no chat metadata.
    pub fn new(id: StatusChangeId, time: impl Into<String>, status: WorkStatus) -> Self {
        Self {
            id,
            time: time.into(),
            status,
            slack_keyword: None,
            slack_message_link: None,
            is_manual_entry: false,
            created_by: None,
            corrects: None,
        }
    }

    /// Resolves `time` to minutes since local midnight of `date`.
    pub fn resolve_minute(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<DayMinute, TimelineError> {
        TimeValue::parse(&self.time)
            .and_then(|value| value.resolve(date, offset))
            .map_err(|reason| TimelineError::MalformedTimeValue {
                event_id: self.id.clone(),
                value: self.time.clone(),
                reason,
            })
    }
}

/// Kind of edit recorded in the history.
///
/// Covers both generations of the history format: `add`/`edit`/`delete`
/// and `add`/`correct`/`note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Add,
    Edit,
    Delete,
    Correct,
    Note,
}

impl EditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Correct => "correct",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHistory {
    pub id: EditId,
    pub timestamp: DateTime<Utc>,
    pub edited_by: String,
    pub action: EditAction,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
}

/// One employee's attendance on one calendar day.
///
/// `total_work_hours` and `total_break_hours` are stored values. They are
/// refreshed from the segments on every status-change edit but may drift
/// in loaded data; see [`AttendanceRecord::total_drift`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// ISO `YYYY-MM-DD`, parsed on demand.
    pub date: String,
    #[serde(default)]
    pub total_work_hours: f64,
    #[serde(default)]
    pub total_break_hours: f64,
    #[serde(default)]
    pub status_changes: Vec<StatusChange>,
    #[serde(default)]
    pub edit_history: Vec<EditHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_updated_at: Option<DateTime<Utc>>,
}

/// Stored totals minus segment-derived totals, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalDrift {
    pub work_hours: f64,
    pub break_hours: f64,
}

impl TotalDrift {
    /// Whether either total is off by at least one minute.
    pub fn is_significant(&self) -> bool {
        const ONE_MINUTE: f64 = 1.0 / 60.0;
        self.work_hours.abs() >= ONE_MINUTE || self.break_hours.abs() >= ONE_MINUTE
    }
}

impl AttendanceRecord {
    /// Creates an empty record for `date` with zero totals.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: date.format(RECORD_DATE_FORMAT).to_string(),
            total_work_hours: 0.0,
            total_break_hours: 0.0,
            status_changes: Vec::new(),
            edit_history: Vec::new(),
            memo: None,
            memo_updated_by: None,
            memo_updated_at: None,
        }
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, InvalidRecordDate> {
        NaiveDate::parse_from_str(self.date.trim(), RECORD_DATE_FORMAT).map_err(|_| {
            InvalidRecordDate {
                date: self.date.clone(),
            }
        })
    }

    pub fn status_change(&self, id: &str) -> Option<&StatusChange> {
        self.status_changes.iter().find(|c| c.id.as_str() == id)
    }

    /// Segments this record's status changes.
    pub fn timeline(&self, config: &TimelineConfig) -> Result<Timeline, InvalidRecordDate> {
        let date = self.parsed_date()?;
        Ok(segment_day(&self.status_changes, date, config))
    }

    /// Work and break totals derived from segments at read time.
    pub fn derived_totals(&self, config: &TimelineConfig) -> Result<DayTotals, InvalidRecordDate> {
        Ok(self.timeline(config)?.totals())
    }

    /// How far the stored totals are from the segment-derived ones.
    pub fn total_drift(&self, config: &TimelineConfig) -> Result<TotalDrift, InvalidRecordDate> {
        let derived = self.derived_totals(config)?;
        Ok(TotalDrift {
            work_hours: self.total_work_hours - derived.work_hours(),
            break_hours: self.total_break_hours - derived.break_hours(),
        })
    }

    /// Whether any status change of the day was entered manually.
    pub fn has_manual_entries(&self) -> bool {
        self.status_changes.iter().any(|c| c.is_manual_entry)
    }
}
