//! Copy-on-write edits of an attendance record.
//!
//! Every edit returns a new [`AttendanceRecord`]: status changes re-sorted,
//! one [`EditHistory`] entry appended, stored totals refreshed from the
//! segments. The original record is left untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use thiserror::Error;

use crate::record::{AttendanceRecord, EditAction, EditHistory, InvalidRecordDate, StatusChange};
use crate::status::WorkStatus;
use crate::timeline::{TimelineConfig, TimelineError};
use crate::types::{EditId, StatusChangeId};

/// Errors from editing a record. An edit that fails changes nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("status change {id} not found on {date}")]
    UnknownStatusChange { id: String, date: String },

    #[error("edit changes nothing")]
    EmptyPatch,

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    InvalidDate(#[from] InvalidRecordDate),
}

/// Who is editing, when, and how segments are computed for the refreshed totals.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub editor: String,
    pub at: DateTime<Utc>,
    pub timeline: TimelineConfig,
}

impl EditContext {
    /// Context stamped with the current time.
    pub fn now(editor: impl Into<String>, timeline: TimelineConfig) -> Self {
        Self {
            editor: editor.into(),
            at: Utc::now(),
            timeline,
        }
    }
}

/// Input for a manually entered status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusChange {
    pub time: String,
    pub status: WorkStatus,
    pub slack_keyword: Option<String>,
    pub slack_message_link: Option<String>,
}

impl NewStatusChange {
    pub fn new(time: impl Into<String>, status: WorkStatus) -> Self {
        Self {
            time: time.into(),
            status,
            slack_keyword: None,
            slack_message_link: None,
        }
    }
}

/// Fields to change on an existing status change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChangePatch {
    pub time: Option<String>,
    pub status: Option<WorkStatus>,
}

/// The pieces of one history entry.
struct Audit {
    action: EditAction,
    description: String,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
}

impl AttendanceRecord {
    /// Adds a manual status change.
    pub fn with_change_added(
        &self,
        change: NewStatusChange,
        ctx: &EditContext,
    ) -> Result<Self, EditError> {
        let date = self.parsed_date()?;
        let added = manual_change(StatusChangeId::generate(), change, ctx, None);
        added.resolve_minute(date, ctx.timeline.utc_offset)?;

        let audit = Audit {
            action: EditAction::Add,
            description: format!("added {} at {}", added.status, added.time),
            old_value: None,
            new_value: Some(snapshot(&added)),
        };

        let mut changes = self.status_changes.clone();
        changes.push(added);
        self.rebuilt(date, changes, audit, ctx)
    }

    /// Changes the time and/or status of one status change.
    pub fn with_change_updated(
        &self,
        id: &str,
        patch: StatusChangePatch,
        ctx: &EditContext,
    ) -> Result<Self, EditError> {
        if patch.time.is_none() && patch.status.is_none() {
            return Err(EditError::EmptyPatch);
        }
        let date = self.parsed_date()?;
        let index = self.index_of(id)?;

        let mut changes = self.status_changes.clone();
        let before = changes[index].clone();
        let after = &mut changes[index];
        if let Some(time) = patch.time {
            after.time = time;
        }
        if let Some(status) = patch.status {
            after.status = status;
        }
        after.resolve_minute(date, ctx.timeline.utc_offset)?;

        let audit = Audit {
            action: EditAction::Edit,
            description: format!(
                "changed {} {} to {} {}",
                before.time, before.status, after.time, after.status
            ),
            old_value: Some(snapshot(&before)),
            new_value: Some(snapshot(after)),
        };
        self.rebuilt(date, changes, audit, ctx)
    }

    /// Replaces one status change with a manual entry that points back at it.
    pub fn with_change_corrected(
        &self,
        id: &str,
        replacement: NewStatusChange,
        ctx: &EditContext,
    ) -> Result<Self, EditError> {
        let date = self.parsed_date()?;
        let index = self.index_of(id)?;

        let mut changes = self.status_changes.clone();
        let original = changes.remove(index);
        let corrected = manual_change(
            StatusChangeId::generate(),
            replacement,
            ctx,
            Some(original.id.clone()),
        );
        corrected.resolve_minute(date, ctx.timeline.utc_offset)?;

        let audit = Audit {
            action: EditAction::Correct,
            description: format!(
                "corrected {} {} to {} {}",
                original.time, original.status, corrected.time, corrected.status
            ),
            old_value: Some(snapshot(&original)),
            new_value: Some(snapshot(&corrected)),
        };
        changes.push(corrected);
        self.rebuilt(date, changes, audit, ctx)
    }

    /// Removes one status change.
    pub fn with_change_removed(&self, id: &str, ctx: &EditContext) -> Result<Self, EditError> {
        let date = self.parsed_date()?;
        let index = self.index_of(id)?;

        let mut changes = self.status_changes.clone();
        let removed = changes.remove(index);
        let audit = Audit {
            action: EditAction::Delete,
            description: format!("deleted {} at {}", removed.status, removed.time),
            old_value: Some(snapshot(&removed)),
            new_value: None,
        };
        self.rebuilt(date, changes, audit, ctx)
    }

    /// Sets or clears the day's memo. Totals are left as they are.
    pub fn with_memo(&self, memo: impl Into<String>, ctx: &EditContext) -> Self {
        let memo = memo.into();
        let memo = (!memo.trim().is_empty()).then_some(memo);

        let mut next = self.clone();
        next.edit_history.push(history_entry(
            Audit {
                action: EditAction::Note,
                description: if memo.is_some() {
                    "updated memo".to_string()
                } else {
                    "cleared memo".to_string()
                },
                old_value: self.memo.as_ref().map(|m| json!(m)),
                new_value: memo.as_ref().map(|m| json!(m)),
            },
            ctx,
        ));
        next.memo = memo;
        next.memo_updated_by = Some(ctx.editor.clone());
        next.memo_updated_at = Some(ctx.at);
        next
    }

    fn index_of(&self, id: &str) -> Result<usize, EditError> {
        self.status_changes
            .iter()
            .position(|c| c.id.as_str() == id)
            .ok_or_else(|| EditError::UnknownStatusChange {
                id: id.to_string(),
                date: self.date.clone(),
            })
    }

    fn rebuilt(
        &self,
        date: NaiveDate,
        mut changes: Vec<StatusChange>,
        audit: Audit,
        ctx: &EditContext,
    ) -> Result<Self, EditError> {
        sort_changes(&mut changes, date, &ctx.timeline);

        let mut next = self.clone();
        next.status_changes = changes;
        next.edit_history.push(history_entry(audit, ctx));

        let totals = next.derived_totals(&ctx.timeline)?;
        next.total_work_hours = totals.work_hours();
        next.total_break_hours = totals.break_hours();

        tracing::debug!(
            date = %next.date,
            work_hours = next.total_work_hours,
            break_hours = next.total_break_hours,
            "refreshed totals after edit"
        );
        Ok(next)
    }
}

/// Stable sort by resolved minute. Unresolvable times go last, in input order.
fn sort_changes(changes: &mut [StatusChange], date: NaiveDate, config: &TimelineConfig) {
    changes.sort_by_cached_key(|change| match change.resolve_minute(date, config.utc_offset) {
        Ok(minute) => (false, minute.get()),
        Err(_) => (true, 0),
    });
}

fn manual_change(
    id: StatusChangeId,
    change: NewStatusChange,
    ctx: &EditContext,
    corrects: Option<StatusChangeId>,
) -> StatusChange {
    StatusChange {
        id,
        time: change.time,
        status: change.status,
        slack_keyword: change.slack_keyword.filter(|s| !s.is_empty()),
        slack_message_link: change.slack_message_link.filter(|s| !s.is_empty()),
        is_manual_entry: true,
        created_by: Some(ctx.editor.clone()),
        corrects,
    }
}

fn history_entry(audit: Audit, ctx: &EditContext) -> EditHistory {
    EditHistory {
        id: EditId::generate(),
        timestamp: ctx.at,
        edited_by: ctx.editor.clone(),
        action: audit.action,
        description: audit.description,
        old_value: audit.old_value,
        new_value: audit.new_value,
    }
}

fn snapshot(change: &StatusChange) -> serde_json::Value {
    json!({ "time": change.time, "status": change.status })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn change(id: &str, time: &str, status: WorkStatus) -> StatusChange {
        StatusChange::new(StatusChangeId::new(id).unwrap(), time, status)
    }

    fn record() -> AttendanceRecord {
        let mut record = AttendanceRecord::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        record.total_work_hours = 9.0;
        record.total_break_hours = 1.0;
        record.status_changes = vec![
            change("start", "09:00", WorkStatus::WorkOffice),
            change("lunch", "12:00", WorkStatus::Break),
            change("back", "13:00", WorkStatus::WorkOffice),
            change("end", "18:30", WorkStatus::Off),
        ];
        record
    }

    fn ctx() -> EditContext {
        EditContext {
            editor: "admin".to_string(),
            at: Utc.with_ymd_and_hms(2025, 1, 7, 9, 0, 0).unwrap(),
            timeline: TimelineConfig::default(),
        }
    }

    fn times(record: &AttendanceRecord) -> Vec<&str> {
        record.status_changes.iter().map(|c| c.time.as_str()).collect()
    }

    #[test]
    fn add_sorts_marks_manual_and_logs() {
        let original = record();
        let edited = original
            .with_change_added(NewStatusChange::new("15:00", WorkStatus::Break), &ctx())
            .unwrap();

        assert_eq!(times(&edited), vec!["09:00", "12:00", "13:00", "15:00", "18:30"]);
        let added = &edited.status_changes[3];
        assert!(added.is_manual_entry);
        assert_eq!(added.created_by.as_deref(), Some("admin"));

        let entry = edited.edit_history.last().unwrap();
        assert_eq!(entry.action, EditAction::Add);
        assert_eq!(entry.description, "added break at 15:00");
        assert_eq!(entry.timestamp, ctx().at);

        // Copy-on-write: the original snapshot is untouched.
        assert_eq!(original, record());
    }

    #[test]
    fn add_refreshes_totals_from_segments() {
        let edited = record()
            .with_change_added(NewStatusChange::new("15:00", WorkStatus::Break), &ctx())
            .unwrap();
        // 09-12 work, 12-13 break, 13-15 work, 15-18:30 break
        assert!((edited.total_work_hours - 5.0).abs() < 1e-9);
        assert!((edited.total_break_hours - 4.5).abs() < 1e-9);
        assert!(!edited.total_drift(&ctx().timeline).unwrap().is_significant());
    }

    #[test]
    fn add_rejects_malformed_time() {
        let err = record()
            .with_change_added(NewStatusChange::new("3pm", WorkStatus::Break), &ctx())
            .unwrap_err();
        assert!(matches!(err, EditError::Timeline(_)));
    }

    #[test]
    fn update_resorts_and_records_old_and_new() {
        let edited = record()
            .with_change_updated(
                "lunch",
                StatusChangePatch {
                    time: Some("13:30".to_string()),
                    status: None,
                },
                &ctx(),
            )
            .unwrap();

        let ids: Vec<_> = edited.status_changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "back", "lunch", "end"]);

        let entry = edited.edit_history.last().unwrap();
        assert_eq!(entry.action, EditAction::Edit);
        assert_eq!(
            entry.old_value,
            Some(json!({ "time": "12:00", "status": "break" }))
        );
        assert_eq!(
            entry.new_value,
            Some(json!({ "time": "13:30", "status": "break" }))
        );
    }

    #[test]
    fn update_rejects_empty_patch_and_unknown_id() {
        let record = record();
        assert_eq!(
            record.with_change_updated("lunch", StatusChangePatch::default(), &ctx()),
            Err(EditError::EmptyPatch)
        );

        let err = record
            .with_change_updated(
                "nope",
                StatusChangePatch {
                    time: None,
                    status: Some(WorkStatus::Off),
                },
                &ctx(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "status change nope not found on 2025-01-06");
    }

    #[test]
    fn correct_links_replacement_to_original() {
        let edited = record()
            .with_change_corrected(
                "lunch",
                NewStatusChange::new("12:30", WorkStatus::Break),
                &ctx(),
            )
            .unwrap();

        assert!(edited.status_change("lunch").is_none());
        let replacement = &edited.status_changes[1];
        assert_eq!(replacement.time, "12:30");
        assert_eq!(replacement.corrects.as_ref().map(StatusChangeId::as_str), Some("lunch"));
        assert!(replacement.is_manual_entry);
        assert_eq!(edited.edit_history.last().unwrap().action, EditAction::Correct);
    }

    #[test]
    fn remove_drops_change_and_logs_delete() {
        let edited = record().with_change_removed("end", &ctx()).unwrap();
        assert_eq!(times(&edited), vec!["09:00", "12:00", "13:00"]);

        let entry = edited.edit_history.last().unwrap();
        assert_eq!(entry.action, EditAction::Delete);
        assert!(entry.new_value.is_none());
        // Without the off event, work runs until midnight.
        assert!((edited.total_work_hours - 14.0).abs() < 1e-9);
    }

    #[test]
    fn history_is_append_only_across_edits() {
        let ctx = ctx();
        let edited = record()
            .with_change_removed("end", &ctx)
            .and_then(|r| r.with_change_added(NewStatusChange::new("19:00", WorkStatus::Off), &ctx))
            .unwrap();
        let actions: Vec<_> = edited.edit_history.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![EditAction::Delete, EditAction::Add]);
    }

    #[test]
    fn memo_sets_audit_fields_without_touching_totals() {
        let edited = record().with_memo("dentist at 8", &ctx());
        assert_eq!(edited.memo.as_deref(), Some("dentist at 8"));
        assert_eq!(edited.memo_updated_by.as_deref(), Some("admin"));
        assert_eq!(edited.memo_updated_at, Some(ctx().at));
        assert!((edited.total_work_hours - 9.0).abs() < 1e-9);
        assert_eq!(edited.edit_history.last().unwrap().action, EditAction::Note);

        let cleared = edited.with_memo("  ", &ctx());
        assert!(cleared.memo.is_none());
        assert_eq!(cleared.edit_history.last().unwrap().description, "cleared memo");
    }

    #[test]
    fn existing_malformed_change_does_not_block_edits() {
        let mut broken = record();
        broken.status_changes.push(change("bad", "soon", WorkStatus::Break));

        let edited = broken.with_change_removed("lunch", &ctx()).unwrap();
        assert_eq!(edited.status_changes.last().unwrap().id.as_str(), "bad");
    }
}
