//! Edit command: apply one edit to a record and print the result.
//!
//! The data file is never written; the output shows what the record would
//! look like, with its new history entry and refreshed totals.

use std::io::Write;

use anyhow::Result;
use att_core::{
    AttendanceRecord, Directory, EditContext, EditError, NewStatusChange, StatusChangePatch,
};

use crate::Config;
use crate::cli::{EditArgs, EditCommand};
use crate::commands::day::format_day;

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &EditArgs,
    config: &Config,
) -> Result<()> {
    let timeline_config = config.timeline_config()?;
    let employee = directory.employee(&args.employee)?;
    let record = directory.record(&args.employee, args.date)?;

    let ctx = EditContext::now(args.editor.clone(), timeline_config);
    let edited = apply(record, &args.change, &ctx)?;
    tracing::debug!(
        employee = %employee.id,
        date = %args.date,
        history = edited.edit_history.len(),
        "previewed edit"
    );

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&edited)?)?;
    } else {
        write!(
            writer,
            "{}",
            format_day(employee, args.date, &edited, &timeline_config)?
        )?;
        writeln!(writer)?;
        writeln!(writer, "Preview only; the data file is unchanged.")?;
    }
    Ok(())
}

/// Applies one edit to a copy of `record`.
pub fn apply(
    record: &AttendanceRecord,
    change: &EditCommand,
    ctx: &EditContext,
) -> Result<AttendanceRecord, EditError> {
    match change {
        EditCommand::Add { time, status } => {
            record.with_change_added(NewStatusChange::new(time.clone(), *status), ctx)
        }
        EditCommand::Update { id, time, status } => {
            let patch = StatusChangePatch {
                time: time.clone(),
                status: *status,
            };
            record.with_change_updated(id, patch, ctx)
        }
        EditCommand::Correct { id, time, status } => {
            record.with_change_corrected(id, NewStatusChange::new(time.clone(), *status), ctx)
        }
        EditCommand::Remove { id } => record.with_change_removed(id, ctx),
        EditCommand::Memo { text } => Ok(record.with_memo(text.clone(), ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::{EditAction, StatusChange, StatusChangeId, TimelineConfig, WorkStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record() -> AttendanceRecord {
        let mut record = AttendanceRecord::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        record.total_work_hours = 9.0;
        record.status_changes = [
            ("s1", "09:00", WorkStatus::WorkOffice),
            ("s2", "18:00", WorkStatus::Off),
        ]
        .into_iter()
        .map(|(id, time, status)| StatusChange::new(StatusChangeId::new(id).unwrap(), time, status))
        .collect();
        record
    }

    fn ctx() -> EditContext {
        EditContext {
            editor: "lead".to_string(),
            at: Utc.with_ymd_and_hms(2025, 1, 7, 9, 0, 0).unwrap(),
            timeline: TimelineConfig::default(),
        }
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "totals are whole minutes and exactly representable"
    )]
    fn add_inserts_break_and_refreshes_totals() {
        let change = EditCommand::Add {
            time: "12:00".to_string(),
            status: WorkStatus::Break,
        };
        let edited = apply(&record(), &change, &ctx()).unwrap();

        let times: Vec<&str> = edited.status_changes.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, ["09:00", "12:00", "18:00"]);
        assert_eq!(edited.total_work_hours, 3.0);
        assert_eq!(edited.total_break_hours, 6.0);
        assert_eq!(edited.edit_history[0].action, EditAction::Add);
        assert_eq!(edited.edit_history[0].edited_by, "lead");
    }

    #[test]
    fn update_and_remove_use_ids() {
        let update = EditCommand::Update {
            id: "s2".to_string(),
            time: Some("17:30".to_string()),
            status: None,
        };
        let edited = apply(&record(), &update, &ctx()).unwrap();
        assert_eq!(edited.status_change("s2").unwrap().time, "17:30");

        let remove = EditCommand::Remove {
            id: "missing".to_string(),
        };
        let err = apply(&record(), &remove, &ctx()).unwrap_err();
        assert!(matches!(err, EditError::UnknownStatusChange { .. }));
    }

    #[test]
    fn correct_points_back_at_original() {
        let correct = EditCommand::Correct {
            id: "s1".to_string(),
            time: "08:45".to_string(),
            status: WorkStatus::WorkRemote,
        };
        let edited = apply(&record(), &correct, &ctx()).unwrap();
        let first = &edited.status_changes[0];
        assert_eq!(first.time, "08:45");
        assert_eq!(first.corrects.as_ref().map(StatusChangeId::as_str), Some("s1"));
        assert!(edited.status_change("s1").is_none());
    }

    #[test]
    fn memo_is_recorded() {
        let memo = EditCommand::Memo {
            text: "doctor".to_string(),
        };
        let edited = apply(&record(), &memo, &ctx()).unwrap();
        assert_eq!(edited.memo.as_deref(), Some("doctor"));
        assert_eq!(edited.memo_updated_by.as_deref(), Some("lead"));
    }

    #[test]
    fn malformed_time_is_rejected() {
        let change = EditCommand::Add {
            time: "noon".to_string(),
            status: WorkStatus::Break,
        };
        let err = apply(&record(), &change, &ctx()).unwrap_err();
        assert!(matches!(err, EditError::Timeline(_)));
    }
}
