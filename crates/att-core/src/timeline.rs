//! Status-change timeline segmentation.
//!
//! # Algorithm Summary
//!
//! 1. Resolve every status change to a [`DayMinute`] on the record date
//!    (events that cannot be resolved are excluded and reported)
//! 2. Stable-sort by minute, so equal times keep their input order
//! 3. Each event opens a segment that runs until the next event, or until
//!    the configured end-of-day boundary for the last event

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::record::StatusChange;
use crate::status::WorkStatus;
use crate::time::{DayMinute, EndOfDay, MINUTES_PER_DAY, TimeParseError};
use crate::types::StatusChangeId;

/// Errors raised while building a timeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// A status change's time is neither `HH:MM` nor a usable instant.
    #[error("malformed time value {value:?} on status change {event_id}: {reason}")]
    MalformedTimeValue {
        event_id: StatusChangeId,
        value: String,
        #[source]
        reason: TimeParseError,
    },
}

/// Configuration for segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Offset absolute instants are projected into.
    /// Default: UTC.
    pub utc_offset: FixedOffset,

    /// Where the final, unterminated segment ends.
    /// Default: `24:00`.
    pub end_of_day: EndOfDay,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            end_of_day: EndOfDay::default(),
        }
    }
}

/// A contiguous interval with one constant status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// The status change that opened this segment.
    pub event_id: StatusChangeId,
    pub status: WorkStatus,
    pub start_time: String,
    pub end_time: String,
    pub start_minute: DayMinute,
    pub end_minute: DayMinute,
    pub duration_minutes: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_keyword: Option<String>,
    pub is_manual_entry: bool,
}

/// Horizontal placement of a segment on a 24-hour track, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentLayout {
    pub left: f64,
    pub width: f64,
}

impl Segment {
    fn new(change: &StatusChange, start: DayMinute, end: DayMinute, end_of_day: EndOfDay) -> Self {
        Self {
            event_id: change.id.clone(),
            status: change.status,
            start_time: start.to_string(),
            end_time: end_of_day.label(end),
            start_minute: start,
            end_minute: end,
            duration_minutes: start.minutes_until(end),
            slack_keyword: change.slack_keyword.clone(),
            is_manual_entry: change.is_manual_entry,
        }
    }

    /// Whether `minute` falls inside `[start, end)`.
    pub fn covers(&self, minute: DayMinute) -> bool {
        self.start_minute <= minute && minute < self.end_minute
    }

    /// Placement on the track. Width is widened to `min_width_percent` for
    /// visibility; `duration_minutes` is unaffected.
    pub fn layout(&self, min_width_percent: f64) -> SegmentLayout {
        let day = f64::from(MINUTES_PER_DAY);
        let left = f64::from(self.start_minute.get()) / day * 100.0;
        let width = (f64::from(self.duration_minutes) / day * 100.0).max(min_width_percent);
        SegmentLayout { left, width }
    }
}

/// Work and break minutes derived from segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl DayTotals {
    /// Sums work (office + remote) and break minutes; `off` counts toward neither.
    pub fn from_segments(segments: &[Segment]) -> Self {
        segments.iter().fold(Self::default(), |mut totals, segment| {
            let minutes = u32::from(segment.duration_minutes);
            if segment.status.is_work() {
                totals.work_minutes += minutes;
            } else if segment.status.is_break() {
                totals.break_minutes += minutes;
            }
            totals
        })
    }

    pub fn work_hours(self) -> f64 {
        f64::from(self.work_minutes) / 60.0
    }

    pub fn break_hours(self) -> f64 {
        f64::from(self.break_minutes) / 60.0
    }
}

/// Segments of one day plus the events that had to be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<Segment>,
    excluded: Vec<TimelineError>,
}

impl Timeline {
    /// All segments, including a terminal `off` segment.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments for drawing: a terminal `off` segment is dropped.
    pub fn displayed(&self) -> &[Segment] {
        match self.segments.split_last() {
            Some((last, rest)) if last.status == WorkStatus::Off => rest,
            _ => &self.segments,
        }
    }

    /// Events excluded because their time could not be resolved.
    pub fn excluded(&self) -> &[TimelineError] {
        &self.excluded
    }

    pub fn has_exclusions(&self) -> bool {
        !self.excluded.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment durations.
    pub fn total_minutes(&self) -> u32 {
        self.segments
            .iter()
            .map(|s| u32::from(s.duration_minutes))
            .sum()
    }

    pub fn totals(&self) -> DayTotals {
        DayTotals::from_segments(&self.segments)
    }

    /// Status in effect at `minute`, if any segment covers it.
    pub fn status_at(&self, minute: DayMinute) -> Option<WorkStatus> {
        self.segments
            .iter()
            .find(|s| s.covers(minute))
            .map(|s| s.status)
    }

    /// Strict view: fails with the first exclusion, if any.
    pub fn into_result(self) -> Result<Vec<Segment>, TimelineError> {
        match self.excluded.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.segments),
        }
    }
}

/// Builds the timeline of one day from its status changes.
///
/// Changes need not be sorted. Changes whose time cannot be resolved are
/// excluded, logged, and reported on the returned [`Timeline`].
pub fn segment_day(changes: &[StatusChange], date: NaiveDate, config: &TimelineConfig) -> Timeline {
    let mut excluded = Vec::new();
    let mut resolved: Vec<(DayMinute, &StatusChange)> = Vec::with_capacity(changes.len());

    for change in changes {
        match change.resolve_minute(date, config.utc_offset) {
            Ok(minute) => resolved.push((minute, change)),
            Err(err) => {
                tracing::warn!(
                    event_id = %change.id,
                    value = %change.time,
                    %date,
                    "excluding status change from timeline: {err}"
                );
                excluded.push(err);
            }
        }
    }

    // sort_by_key is stable
    resolved.sort_by_key(|(minute, _)| *minute);

    let boundary = config.end_of_day.boundary();
    let segments = resolved
        .iter()
        .enumerate()
        .map(|(i, (start, change))| {
            let end = resolved
                .get(i + 1)
                .map_or(boundary, |(next, _)| *next)
                .max(*start);
            Segment::new(change, *start, end, config.end_of_day)
        })
        .collect();

    Timeline { segments, excluded }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, time: &str, status: WorkStatus) -> StatusChange {
        StatusChange::new(StatusChangeId::new(id).unwrap(), time, status)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn office_day() -> Vec<StatusChange> {
        vec![
            change("start", "09:00", WorkStatus::WorkOffice),
            change("lunch", "12:00", WorkStatus::Break),
            change("back", "13:00", WorkStatus::WorkOffice),
            change("end", "18:30", WorkStatus::Off),
        ]
    }

    fn spans(segments: &[Segment]) -> Vec<(&str, &str, WorkStatus, u16)> {
        segments
            .iter()
            .map(|s| {
                (
                    s.start_time.as_str(),
                    s.end_time.as_str(),
                    s.status,
                    s.duration_minutes,
                )
            })
            .collect()
    }

    #[test]
    fn office_day_segments() {
        let timeline = segment_day(&office_day(), day(), &TimelineConfig::default());

        assert_eq!(
            spans(timeline.segments()),
            vec![
                ("09:00", "12:00", WorkStatus::WorkOffice, 180),
                ("12:00", "13:00", WorkStatus::Break, 60),
                ("13:00", "18:30", WorkStatus::WorkOffice, 330),
                ("18:30", "24:00", WorkStatus::Off, 330),
            ]
        );
    }

    #[test]
    fn displayed_drops_terminal_off() {
        let timeline = segment_day(&office_day(), day(), &TimelineConfig::default());

        let displayed = timeline.displayed();
        assert_eq!(displayed.len(), 3);
        let shown: u32 = displayed.iter().map(|s| u32::from(s.duration_minutes)).sum();
        assert_eq!(shown, 570);
        assert_eq!(timeline.segments().len(), 4);
    }

    #[test]
    fn displayed_keeps_off_that_is_not_terminal() {
        let changes = vec![
            change("a", "08:00", WorkStatus::Off),
            change("b", "09:00", WorkStatus::WorkRemote),
        ];
        let timeline = segment_day(&changes, day(), &TimelineConfig::default());
        assert_eq!(timeline.displayed().len(), 2);
    }

    #[test]
    fn durations_cover_rest_of_day_from_first_event() {
        let timeline = segment_day(&office_day(), day(), &TimelineConfig::default());
        // Segments start at 09:00, so the covered span is 1440 - 540
        assert_eq!(timeline.total_minutes(), 1440 - 540);

        let from_midnight = vec![
            change("a", "00:00", WorkStatus::Off),
            change("b", "09:00", WorkStatus::WorkOffice),
            change("c", "18:00", WorkStatus::Off),
        ];
        let timeline = segment_day(&from_midnight, day(), &TimelineConfig::default());
        assert_eq!(timeline.total_minutes(), 1440);
    }

    #[test]
    fn empty_input_gives_empty_timeline() {
        let timeline = segment_day(&[], day(), &TimelineConfig::default());
        assert!(timeline.is_empty());
        assert!(!timeline.has_exclusions());
        assert_eq!(timeline.total_minutes(), 0);
    }

    #[test]
    fn single_event_runs_to_end_of_day() {
        let changes = vec![change("only", "22:15", WorkStatus::WorkRemote)];
        let timeline = segment_day(&changes, day(), &TimelineConfig::default());
        assert_eq!(
            spans(timeline.segments()),
            vec![("22:15", "24:00", WorkStatus::WorkRemote, 105)]
        );
    }

    #[test]
    fn unsorted_input_is_sorted_and_equal_times_are_stable() {
        let changes = vec![
            change("late", "13:00", WorkStatus::WorkOffice),
            change("first-at-noon", "12:00", WorkStatus::Break),
            change("second-at-noon", "12:00", WorkStatus::WorkRemote),
        ];
        let config = TimelineConfig::default();
        let timeline = segment_day(&changes, day(), &config);

        let ids: Vec<_> = timeline
            .segments()
            .iter()
            .map(|s| s.event_id.as_str())
            .collect();
        assert_eq!(ids, vec!["first-at-noon", "second-at-noon", "late"]);
        assert_eq!(timeline.segments()[0].duration_minutes, 0);
        assert_eq!(timeline.segments()[1].duration_minutes, 60);

        assert_eq!(segment_day(&changes, day(), &config), timeline);
    }

    #[test]
    fn start_times_roundtrip_to_event_times() {
        let changes = office_day();
        let timeline = segment_day(&changes, day(), &TimelineConfig::default());
        let starts: Vec<_> = timeline
            .segments()
            .iter()
            .map(|s| s.start_time.clone())
            .collect();
        let times: Vec<_> = changes.iter().map(|c| c.time.clone()).collect();
        assert_eq!(starts, times);
    }

    #[test]
    fn malformed_event_is_excluded_and_reported() {
        let changes = vec![
            change("start", "09:00", WorkStatus::WorkOffice),
            change("broken", "9 o'clock", WorkStatus::Break),
            change("end", "18:00", WorkStatus::Off),
        ];
        let timeline = segment_day(&changes, day(), &TimelineConfig::default());

        assert_eq!(timeline.segments().len(), 2);
        assert_eq!(timeline.segments()[0].duration_minutes, 540);
        assert!(timeline.has_exclusions());

        let TimelineError::MalformedTimeValue {
            event_id, reason, ..
        } = &timeline.excluded()[0];
        assert_eq!(event_id.as_str(), "broken");
        assert_eq!(*reason, TimeParseError::Unrecognized);

        let err = timeline.into_result().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn into_result_passes_clean_timelines_through() {
        let segments = segment_day(&office_day(), day(), &TimelineConfig::default())
            .into_result()
            .unwrap();
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn mixed_encodings_are_normalized() {
        let changes = vec![
            change("start", "2025-01-06T00:00:00Z", WorkStatus::WorkOffice),
            change("lunch", "12:00", WorkStatus::Break),
            change("back", "2025-01-06T04:00:00.000Z", WorkStatus::WorkOffice),
        ];
        let config = TimelineConfig {
            utc_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            end_of_day: EndOfDay::Midnight,
        };
        let timeline = segment_day(&changes, day(), &config);
        assert_eq!(
            spans(timeline.segments()),
            vec![
                ("09:00", "12:00", WorkStatus::WorkOffice, 180),
                ("12:00", "13:00", WorkStatus::Break, 60),
                ("13:00", "24:00", WorkStatus::WorkOffice, 660),
            ]
        );
    }

    #[test]
    fn end_of_day_policy_controls_final_segment() {
        let changes = vec![change("end", "18:00", WorkStatus::Off)];

        let next_day = TimelineConfig {
            end_of_day: EndOfDay::NextDayMidnight,
            ..TimelineConfig::default()
        };
        let timeline = segment_day(&changes, day(), &next_day);
        assert_eq!(timeline.segments()[0].end_time, "00:00");
        assert_eq!(timeline.segments()[0].duration_minutes, 360);

        let last_minute = TimelineConfig {
            end_of_day: EndOfDay::LastMinute,
            ..TimelineConfig::default()
        };
        let timeline = segment_day(&changes, day(), &last_minute);
        assert_eq!(timeline.segments()[0].end_time, "23:59");
        assert_eq!(timeline.segments()[0].duration_minutes, 359);
    }

    #[test]
    fn totals_from_segments() {
        let totals = segment_day(&office_day(), day(), &TimelineConfig::default()).totals();
        assert_eq!(totals.work_minutes, 510);
        assert_eq!(totals.break_minutes, 60);
        assert!((totals.work_hours() - 8.5).abs() < f64::EPSILON);
        assert!((totals.break_hours() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn status_at_uses_half_open_segments() {
        let timeline = segment_day(&office_day(), day(), &TimelineConfig::default());
        let at = |h, m| timeline.status_at(DayMinute::from_hm(h, m).unwrap());

        assert_eq!(at(8, 59), None);
        assert_eq!(at(9, 0), Some(WorkStatus::WorkOffice));
        assert_eq!(at(12, 0), Some(WorkStatus::Break));
        assert_eq!(at(12, 59), Some(WorkStatus::Break));
        assert_eq!(at(13, 0), Some(WorkStatus::WorkOffice));
        assert_eq!(at(23, 0), Some(WorkStatus::Off));
    }

    #[test]
    fn layout_widens_short_segments_only() {
        let changes = vec![
            change("a", "12:00", WorkStatus::Break),
            change("b", "12:00", WorkStatus::WorkOffice),
        ];
        let timeline = segment_day(&changes, day(), &TimelineConfig::default());

        let zero = timeline.segments()[0].layout(0.5);
        assert!((zero.left - 50.0).abs() < 1e-9);
        assert!((zero.width - 0.5).abs() < 1e-9);
        assert_eq!(timeline.segments()[0].duration_minutes, 0);

        let rest = timeline.segments()[1].layout(0.5);
        assert!((rest.width - 50.0).abs() < 1e-9);
    }
}
