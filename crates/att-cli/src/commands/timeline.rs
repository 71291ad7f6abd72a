//! Timeline command: one employee's day as segments.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::{
    AttendanceRecord, DayMinute, DayTotals, Directory, Employee, Segment, SegmentLayout, Timeline,
    WorkStatus, format_hours,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::Config;
use crate::cli::TimelineArgs;

/// Cells in the rendered track; each covers 30 minutes.
const TRACK_CELLS: u16 = 48;
const MINUTES_PER_CELL: u16 = 30;

pub fn run<W: Write>(
    writer: &mut W,
    directory: &Directory,
    args: &TimelineArgs,
    config: &Config,
) -> Result<()> {
    let timeline_config = config.timeline_config()?;
    let employee = directory.employee(&args.employee)?;
    let record = directory.record(&args.employee, args.date)?;
    let timeline = record.timeline(&timeline_config)?;
    if args.strict {
        timeline.clone().into_result()?;
    }

    if args.json {
        let json = format_timeline_json(
            employee,
            args.date,
            &timeline,
            args.all,
            config.min_segment_width_percent,
        )?;
        writeln!(writer, "{json}")?;
    } else {
        let view = TimelineView {
            employee,
            date: args.date,
            record,
            timeline: &timeline,
            show_all: args.all,
        };
        write!(writer, "{}", view.render())?;
    }
    Ok(())
}

/// Everything needed to render one day's timeline as text.
pub struct TimelineView<'a> {
    pub employee: &'a Employee,
    pub date: NaiveDate,
    pub record: &'a AttendanceRecord,
    pub timeline: &'a Timeline,
    pub show_all: bool,
}

impl TimelineView<'_> {
    fn segments(&self) -> &[Segment] {
        if self.show_all {
            self.timeline.segments()
        } else {
            self.timeline.displayed()
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let segments = self.segments();

        writeln!(out, "{}", day_header(self.employee, self.date)).unwrap();
        writeln!(
            out,
            "stored: work {}, break {}",
            format_hours(self.record.total_work_hours),
            format_hours(self.record.total_break_hours)
        )
        .unwrap();
        writeln!(out).unwrap();

        if segments.is_empty() {
            writeln!(out, "No status changes recorded.").unwrap();
        } else {
            writeln!(out, "{}", track_labels()).unwrap();
            writeln!(out, "|{}|", track(segments)).unwrap();
            writeln!(out).unwrap();
            for segment in segments {
                writeln!(out, "{}", segment_line(segment)).unwrap();
            }
            writeln!(out).unwrap();

            let shown: u32 = segments.iter().map(|s| u32::from(s.duration_minutes)).sum();
            let derived = DayTotals::from_segments(self.timeline.segments());
            writeln!(out, "covered: {}", format_hours(f64::from(shown) / 60.0)).unwrap();
            writeln!(
                out,
                "derived: work {}, break {}",
                format_hours(derived.work_hours()),
                format_hours(derived.break_hours())
            )
            .unwrap();
        }

        for excluded in self.timeline.excluded() {
            writeln!(out, "excluded: {excluded}").unwrap();
        }
        out
    }
}

/// `nickname(name) YYYY-MM-DD (Ddd)`
pub fn day_header(employee: &Employee, date: NaiveDate) -> String {
    format!("{} {}", employee.display_name(), date.format("%Y-%m-%d (%a)"))
}

/// Hour labels aligned with the cell boundaries of the track, which sits
/// between two `|` columns. `24:00` ends on the closing bar.
fn track_labels() -> String {
    let width = usize::from(TRACK_CELLS) + 2;
    let mut labels = String::new();
    for hour in (0..=24u16).step_by(6) {
        let label = format!("{hour:02}:00");
        let column = (1 + usize::from(hour * 60 / MINUTES_PER_CELL)).min(width - label.len());
        while labels.len() < column {
            labels.push(' ');
        }
        labels.push_str(&label);
    }
    labels
}

/// One character per 30-minute cell, sampled at the middle of the cell.
fn track(segments: &[Segment]) -> String {
    (0..TRACK_CELLS)
        .map(|cell| {
            let sample = DayMinute::new(cell * MINUTES_PER_CELL + MINUTES_PER_CELL / 2);
            sample
                .and_then(|minute| segments.iter().find(|s| s.covers(minute)))
                .map_or(' ', |s| status_char(s.status))
        })
        .collect()
}

const fn status_char(status: WorkStatus) -> char {
    match status {
        WorkStatus::WorkOffice => 'O',
        WorkStatus::WorkRemote => 'R',
        WorkStatus::Break => 'B',
        WorkStatus::Off => '.',
    }
}

fn segment_line(segment: &Segment) -> String {
    let duration = format_hours(f64::from(segment.duration_minutes) / 60.0);
    let note = if segment.is_manual_entry {
        "(manual)"
    } else {
        segment.slack_keyword.as_deref().unwrap_or("")
    };
    let line = format!(
        "{}-{}  {:<7} {:<7} {note}",
        segment.start_time,
        segment.end_time,
        segment.status.label(),
        duration
    );
    line.trim_end().to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineJson<'a> {
    employee_id: &'a str,
    date: String,
    segments: Vec<SegmentJson<'a>>,
    derived: DayTotals,
    excluded: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SegmentJson<'a> {
    #[serde(flatten)]
    segment: &'a Segment,
    layout: SegmentLayout,
}

/// Formats the timeline as pretty JSON with track layout per segment.
pub fn format_timeline_json(
    employee: &Employee,
    date: NaiveDate,
    timeline: &Timeline,
    show_all: bool,
    min_width_percent: f64,
) -> Result<String> {
    let segments = if show_all {
        timeline.segments()
    } else {
        timeline.displayed()
    };
    let json = TimelineJson {
        employee_id: employee.id.as_str(),
        date: date.format("%Y-%m-%d").to_string(),
        segments: segments
            .iter()
            .map(|segment| SegmentJson {
                segment,
                layout: segment.layout(min_width_percent),
            })
            .collect(),
        derived: timeline.totals(),
        excluded: timeline.excluded().iter().map(ToString::to_string).collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
