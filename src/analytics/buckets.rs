//! Fixed-width time buckets for trend and comparison series.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::calendar::{checked_shift_month, start_of_month, start_of_quarter};
use crate::ledger::{DateRange, LedgerEntry};
use crate::taxonomy::CategoryId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BucketWidth {
    Day,
    Month,
    Quarter,
}

impl BucketWidth {
    /// Start of the bucket containing `date`.
    ///
    /// Both bucket iteration and entry grouping go through this function, so
    /// they always agree on boundaries.
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            BucketWidth::Day => date,
            BucketWidth::Month => start_of_month(date),
            BucketWidth::Quarter => start_of_quarter(date),
        }
    }

    /// Moves a bucket start by `steps` buckets; saturates at chrono's range.
    pub fn advance(self, start: NaiveDate, steps: i32) -> NaiveDate {
        let shifted = match self {
            BucketWidth::Day => start.checked_add_signed(Duration::days(steps as i64)),
            BucketWidth::Month => checked_shift_month(start, steps),
            BucketWidth::Quarter => steps
                .checked_mul(3)
                .and_then(|months| checked_shift_month(start, months)),
        };
        shifted.unwrap_or(if steps < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BucketWidth::Day => "Day",
            BucketWidth::Month => "Month",
            BucketWidth::Quarter => "Quarter",
        };
        f.write_str(label)
    }
}

/// Preset trend ranges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Last30Days,
    Last3Months,
    Last6Months,
    LastYear,
}

impl TimeRange {
    pub fn width(self) -> BucketWidth {
        match self {
            TimeRange::Last30Days => BucketWidth::Day,
            _ => BucketWidth::Month,
        }
    }

    pub fn bucket_count(self) -> usize {
        match self {
            TimeRange::Last30Days => 30,
            TimeRange::Last3Months => 3,
            TimeRange::Last6Months => 6,
            TimeRange::LastYear => 12,
        }
    }
}

/// `count` consecutive buckets of `width`, the last one containing `reference`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketSpec {
    pub width: BucketWidth,
    pub count: usize,
    pub reference: NaiveDate,
}

impl BucketSpec {
    pub fn new(width: BucketWidth, count: usize, reference: NaiveDate) -> Self {
        Self {
            width,
            count,
            reference,
        }
    }

    pub fn for_range(range: TimeRange, reference: NaiveDate) -> Self {
        Self::new(range.width(), range.bucket_count(), reference)
    }

    /// Bucket start dates, oldest first.
    pub fn starts(&self) -> Vec<NaiveDate> {
        let last = self.width.truncate(self.reference);
        (0..self.count)
            .map(|ordinal| {
                self.width
                    .advance(last, steps_back(self.count - 1 - ordinal))
            })
            .collect()
    }

    /// Closed range covered by every bucket; `None` when there are no buckets.
    pub fn window(&self) -> Option<DateRange> {
        let starts = self.starts();
        let first = *starts.first()?;
        let last = *starts.last()?;
        let end = self.width.advance(last, 1).pred_opt().unwrap_or(last);
        Some(DateRange { start: first, end })
    }

    /// The same number of buckets, ending right before the first bucket here.
    pub fn previous_period(&self) -> Self {
        let last = self.width.truncate(self.reference);
        Self {
            reference: self.width.advance(last, steps_back(self.count)),
            ..*self
        }
    }
}

/// Negative step count for `buckets`, saturating past `i32::MAX`.
fn steps_back(buckets: usize) -> i32 {
    i32::try_from(buckets).map_or(i32::MIN, |steps| -steps)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub start: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Gap-free ordered series of buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    pub width: BucketWidth,
    pub buckets: Vec<Bucket>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|bucket| bucket.total).sum()
    }

    /// `(bucket start, total)` pairs, oldest first.
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.buckets
            .iter()
            .map(|bucket| (bucket.start, bucket.total))
            .collect()
    }
}

/// Primary and previous-period value at one ordinal position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonPoint {
    pub ordinal: usize,
    pub current: Bucket,
    pub previous: Bucket,
}

impl ComparisonPoint {
    pub fn change(&self) -> f64 {
        self.current.total - self.previous.total
    }
}

/// Totals per bucket for every bucket in `spec`, zero-filled.
pub fn bucketize<'a, I>(entries: I, spec: &BucketSpec) -> TimeSeries
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let starts = spec.starts();
    let Some(window) = spec.window() else {
        return TimeSeries {
            width: spec.width,
            buckets: Vec::new(),
        };
    };
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for entry in entries {
        if !window.contains(entry.date()) {
            continue;
        }
        let slot = sums.entry(spec.width.truncate(entry.date())).or_insert((0.0, 0));
        slot.0 += entry.amount();
        slot.1 += 1;
    }
    let buckets = starts
        .into_iter()
        .map(|start| {
            let (total, count) = sums.get(&start).copied().unwrap_or((0.0, 0));
            Bucket {
                start,
                total,
                count,
            }
        })
        .collect();
    TimeSeries {
        width: spec.width,
        buckets,
    }
}

/// Series for the period immediately before `spec`, same bucket count.
pub fn comparison_series<'a, I>(entries: I, spec: &BucketSpec) -> TimeSeries
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    bucketize(entries, &spec.previous_period())
}

/// Pairs current and previous-period buckets by ordinal position.
pub fn compare_periods(entries: &[LedgerEntry], spec: &BucketSpec) -> Vec<ComparisonPoint> {
    let current = bucketize(entries, spec);
    let previous = comparison_series(entries, spec);
    current
        .buckets
        .into_iter()
        .zip(previous.buckets)
        .enumerate()
        .map(|(ordinal, (current, previous))| ComparisonPoint {
            ordinal,
            current,
            previous,
        })
        .collect()
}

/// One zero-filled series per category that has spending in the window.
pub fn category_series<'a, I>(
    entries: I,
    spec: &BucketSpec,
) -> BTreeMap<CategoryId, TimeSeries>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut per_category: BTreeMap<CategoryId, Vec<&LedgerEntry>> = BTreeMap::new();
    let window = spec.window();
    for entry in entries {
        if window.is_some_and(|window| window.contains(entry.date())) {
            per_category
                .entry(entry.category_id())
                .or_default()
                .push(entry);
        }
    }
    per_category
        .into_iter()
        .map(|(category_id, entries)| (category_id, bucketize(entries, spec)))
        .collect()
}
