//! Date-range aggregation of stored hour totals.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::{AttendanceRecord, InvalidRecordDate};

/// A closed calendar-date interval. Either bound may be unset while a
/// selection is still being made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub const fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub const fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Sunday through Saturday of the week containing `today`.
    pub fn week_of(today: NaiveDate) -> Self {
        let since_sunday = u64::from(today.weekday().num_days_from_sunday());
        let sunday = today - Days::new(since_sunday);
        Self::between(sunday, sunday + Days::new(6))
    }

    /// The `days` days ending with `today`, inclusive.
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        Self::between(today - Days::new(days.saturating_sub(1)), today)
    }

    /// The whole calendar month, or `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = first.checked_add_months(chrono::Months::new(1))?;
        Some(Self::between(first, next - Days::new(1)))
    }

    /// Both bounds, if set.
    pub const fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    /// Inclusive membership; false while either bound is unset.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds()
            .is_some_and(|(from, to)| from <= date && date <= to)
    }
}

/// Summed stored totals over a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTotals {
    pub work_hours: f64,
    pub break_hours: f64,
    pub included_records: usize,
    /// Records left out because their date did not parse.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<InvalidRecordDate>,
    /// Set when a bound was missing and nothing was aggregated.
    pub empty_selection: bool,
}

impl RangeTotals {
    pub fn has_exclusions(&self) -> bool {
        !self.excluded.is_empty()
    }
}

/// Sums `total_work_hours` and `total_break_hours` of records dated within
/// `range`, both ends inclusive.
///
/// A missing bound yields zero totals with `empty_selection` set. Records
/// with an unparseable date are excluded and reported; the rest still count.
/// The result does not depend on the order of `records`.
pub fn aggregate_hours(records: &[AttendanceRecord], range: &DateRange) -> RangeTotals {
    let Some((from, to)) = range.bounds() else {
        tracing::debug!(?range, "empty range selection, aggregating nothing");
        return RangeTotals {
            empty_selection: true,
            ..RangeTotals::default()
        };
    };

    let mut excluded = Vec::new();
    let mut included: Vec<(NaiveDate, f64, f64)> = Vec::new();
    for record in records {
        match record.parsed_date() {
            Ok(date) if from <= date && date <= to => {
                included.push((date, record.total_work_hours, record.total_break_hours));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(date = %err.date, "excluding record from aggregation: {err}");
                excluded.push(err);
            }
        }
    }

    // Fixed summation order keeps float totals independent of input order.
    included.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    });

    RangeTotals {
        work_hours: included.iter().map(|r| r.1).sum(),
        break_hours: included.iter().map(|r| r.2).sum(),
        included_records: included.len(),
        excluded,
        empty_selection: false,
    }
}

/// Records dated within `range`, most recent first.
///
/// Records with an unparseable date are skipped.
pub fn records_in_range<'a>(
    records: &'a [AttendanceRecord],
    range: &DateRange,
) -> Vec<&'a AttendanceRecord> {
    let mut matching: Vec<(NaiveDate, &AttendanceRecord)> = records
        .iter()
        .filter_map(|record| record.parsed_date().ok().map(|date| (date, record)))
        .filter(|(date, _)| range.contains(*date))
        .collect();
    matching.sort_by(|a, b| b.0.cmp(&a.0));
    matching.into_iter().map(|(_, record)| record).collect()
}

/// Totals for one calendar month. An invalid month aggregates nothing.
pub fn month_totals(records: &[AttendanceRecord], year: i32, month: u32) -> RangeTotals {
    let range = DateRange::month(year, month).unwrap_or_default();
    aggregate_hours(records, &range)
}
