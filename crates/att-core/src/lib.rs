//! Core domain logic for attendance timelines.
//!
//! This crate contains the fundamental types and logic for:
//! - Segmentation: turning a day's status changes into timeline segments
//! - Aggregation: summing stored hour totals over a date range
//! - Editing: copy-on-write changes to a record with an audit trail
//! - Dashboard views: ranked totals, team status, office/remote pattern

pub mod aggregate;
pub mod dashboard;
pub mod directory;
mod edit;
pub mod record;
pub mod status;
pub mod time;
pub mod timeline;
pub mod types;

pub use aggregate::{DateRange, RangeTotals, aggregate_hours, month_totals, records_in_range};
pub use dashboard::{
    CompanyPresence, DashboardRow, OfficePresence, Selection, TeamFilter, TeamStatus, WorkPattern,
    company_presence_at, dashboard_rows, format_hours, team_status_at, work_pattern,
};
pub use directory::{Directory, DirectoryError, Employee};
pub use edit::{EditContext, EditError, NewStatusChange, StatusChangePatch};
pub use record::{
    AttendanceRecord, EditAction, EditHistory, InvalidRecordDate, StatusChange, TotalDrift,
};
pub use status::{UnknownWorkStatus, WorkStatus};
pub use time::{DayMinute, EndOfDay, TimeParseError, TimeValue};
pub use timeline::{
    DayTotals, Segment, SegmentLayout, Timeline, TimelineConfig, TimelineError, segment_day,
};
pub use types::{EditId, EmployeeId, StatusChangeId, ValidationError};
