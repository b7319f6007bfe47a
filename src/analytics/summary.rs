//! Aggregation of ledger entries into period summaries.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::calendar::{end_of_month, start_of_month, start_of_week};
use crate::ledger::{DateRange, LedgerEntry, LimitPeriod};
use crate::taxonomy::CategoryId;
use crate::utils::{clamped_ratio, safe_ratio};

/// Knobs for [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryOptions {
    /// Which snapshotted limit the window is judged against.
    pub period: LimitPeriod,
    /// Limit used when no entry in the window carries a snapshot.
    pub fallback_limit: f64,
    /// Amount the user intends to keep unspent in the window.
    pub savings_target: f64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            period: LimitPeriod::Daily,
            fallback_limit: 0.0,
            savings_target: 0.0,
        }
    }
}

impl SummaryOptions {
    pub fn for_period(period: LimitPeriod) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

/// Share of the window total spent in a single category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category_id: CategoryId,
    pub amount: f64,
    pub count: usize,
    /// Fraction of the window total in `[0, 1]`.
    pub share: f64,
}

/// Compact reference to a notable entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryHighlight {
    pub entry_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub category_id: CategoryId,
}

impl From<&LedgerEntry> for EntryHighlight {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            entry_id: entry.id(),
            amount: entry.amount(),
            date: entry.date(),
            category_id: entry.category_id(),
        }
    }
}

/// Derived totals for a closed date range. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    pub window: DateRange,
    pub total: f64,
    pub count: usize,
    pub limit_period: LimitPeriod,
    pub limit: f64,
    /// `total / limit` capped at 1; zero when there is no limit.
    pub progress: f64,
    pub over_limit: bool,
    pub breakdown: Vec<CategoryShare>,
    pub largest: Option<EntryHighlight>,
    pub smallest: Option<EntryHighlight>,
    pub average: f64,
    /// Percentage of the limit left unspent, in `[0, 100]`.
    pub efficiency_score: f64,
    pub target_savings: f64,
    /// Unspent part of the limit; negative when over the limit.
    pub actual_savings: f64,
}

impl PeriodSummary {
    pub fn remaining(&self) -> f64 {
        (self.limit - self.total).max(0.0)
    }

    pub fn share_of(&self, category_id: CategoryId) -> f64 {
        self.breakdown
            .iter()
            .find(|share| share.category_id == category_id)
            .map(|share| share.share)
            .unwrap_or(0.0)
    }

    /// Progress of `actual_savings` toward `target_savings`, in `[0, 1]`.
    pub fn savings_progress(&self) -> f64 {
        clamped_ratio(self.actual_savings, self.target_savings)
    }
}

/// Folds the entries dated inside `window` into a [`PeriodSummary`].
///
/// The limit is taken from the snapshot of the most recently created entry
/// in the window, so later edits to the configured limits never change how a
/// past period is judged.
pub fn summarize<'a, I>(entries: I, window: DateRange, options: &SummaryOptions) -> PeriodSummary
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let in_window: Vec<&LedgerEntry> = entries
        .into_iter()
        .filter(|entry| window.contains(entry.date()))
        .collect();
    let limit = resolve_limit(&in_window, options.period, options.fallback_limit);
    summarize_against(&in_window, window, options, limit)
}

/// One summary per calendar day in `window`, each judged by its own entries' daily limit.
pub fn daily_summaries<'a, I>(
    entries: I,
    window: DateRange,
    options: &SummaryOptions,
) -> Vec<PeriodSummary>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let by_day = group_by_date(entries, window);
    let options = SummaryOptions {
        period: LimitPeriod::Daily,
        ..*options
    };
    window
        .iter_days()
        .map(|day| {
            let day_entries = by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]);
            let limit = resolve_limit(day_entries, LimitPeriod::Daily, options.fallback_limit);
            summarize_against(day_entries, DateRange::single_day(day), &options, limit)
        })
        .collect()
}

/// Monday-based weeks clipped to `window`.
///
/// A week's limit is the daily snapshot times the number of days it covers.
pub fn weekly_summaries<'a, I>(
    entries: I,
    window: DateRange,
    options: &SummaryOptions,
) -> Vec<PeriodSummary>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let by_day = group_by_date(entries, window);
    let options = SummaryOptions {
        period: LimitPeriod::Daily,
        ..*options
    };
    let mut summaries = Vec::new();
    let mut week_start = start_of_week(window.start);
    while week_start <= window.end {
        let to_sunday = 6 - week_start.weekday().num_days_from_monday() as i64;
        let sunday = week_start.checked_add_signed(Duration::days(to_sunday));
        let week = DateRange {
            start: week_start,
            end: sunday.map_or(window.end, |end| end.min(window.end)),
        };
        if let Some(clipped) = week.intersect(&window) {
            let week_entries: Vec<&LedgerEntry> = by_day
                .range(clipped.start..=clipped.end)
                .flat_map(|(_, day)| day.iter().copied())
                .collect();
            let daily = resolve_limit(&week_entries, LimitPeriod::Daily, options.fallback_limit);
            let limit = daily * clipped.days() as f64;
            summaries.push(summarize_against(&week_entries, clipped, &options, limit));
        }
        match sunday.and_then(|end| end.succ_opt()) {
            Some(next) => week_start = next,
            None => break,
        }
    }
    summaries
}

/// Summary of the calendar month containing `date`, judged by the monthly limit.
pub fn monthly_summary<'a, I>(
    entries: I,
    date: NaiveDate,
    options: &SummaryOptions,
) -> PeriodSummary
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let window = DateRange {
        start: start_of_month(date),
        end: end_of_month(date),
    };
    let options = SummaryOptions {
        period: LimitPeriod::Monthly,
        ..*options
    };
    summarize(entries, window, &options)
}

/// Number of days in `window` whose spending exceeded that day's snapshotted limit.
pub fn over_limit_days<'a, I>(entries: I, window: DateRange) -> usize
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    daily_summaries(entries, window, &SummaryOptions::default())
        .iter()
        .filter(|summary| summary.over_limit)
        .count()
}

/// Limit snapshotted on the newest entry, or `fallback` when there are none.
pub fn resolve_limit(entries: &[&LedgerEntry], period: LimitPeriod, fallback: f64) -> f64 {
    entries
        .iter()
        .max_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        })
        .map(|entry| entry.limit_for(period))
        .unwrap_or(fallback)
}

fn summarize_against(
    entries: &[&LedgerEntry],
    window: DateRange,
    options: &SummaryOptions,
    limit: f64,
) -> PeriodSummary {
    let limit = if limit.is_finite() { limit.max(0.0) } else { 0.0 };
    let total: f64 = entries.iter().map(|entry| entry.amount()).sum();
    let count = entries.len();

    let mut per_category: BTreeMap<CategoryId, (f64, usize)> = BTreeMap::new();
    for entry in entries {
        let slot = per_category.entry(entry.category_id()).or_insert((0.0, 0));
        slot.0 += entry.amount();
        slot.1 += 1;
    }
    let mut breakdown: Vec<CategoryShare> = per_category
        .into_iter()
        .map(|(category_id, (amount, count))| CategoryShare {
            category_id,
            amount,
            count,
            share: safe_ratio(amount, total),
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    let largest = entries
        .iter()
        .copied()
        .min_by(|a, b| rank_by_amount(a, b, true))
        .map(EntryHighlight::from);
    let smallest = entries
        .iter()
        .copied()
        .min_by(|a, b| rank_by_amount(a, b, false))
        .map(EntryHighlight::from);

    let (progress, over_limit, efficiency_score) = if limit > 0.0 {
        (
            clamped_ratio(total, limit),
            total > limit,
            (safe_ratio(limit - total, limit) * 100.0).clamp(0.0, 100.0),
        )
    } else {
        (0.0, false, 0.0)
    };

    tracing::debug!(%window, count, total, limit, "summarized period");

    PeriodSummary {
        window,
        total,
        count,
        limit_period: options.period,
        limit,
        progress,
        over_limit,
        breakdown,
        largest,
        smallest,
        average: safe_ratio(total, count as f64),
        efficiency_score,
        target_savings: options.savings_target,
        actual_savings: limit - total,
    }
}

/// Orders by amount (descending when asked), then earliest date, then id.
///
/// Used with `min_by`, so ties resolve to the earliest entry.
fn rank_by_amount(a: &LedgerEntry, b: &LedgerEntry, descending: bool) -> Ordering {
    let by_amount = a
        .amount()
        .partial_cmp(&b.amount())
        .unwrap_or(Ordering::Equal);
    let by_amount = if descending {
        by_amount.reverse()
    } else {
        by_amount
    };
    by_amount
        .then_with(|| a.date().cmp(&b.date()))
        .then_with(|| a.id().cmp(&b.id()))
}

fn group_by_date<'a, I>(
    entries: I,
    window: DateRange,
) -> BTreeMap<NaiveDate, Vec<&'a LedgerEntry>>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut by_day: BTreeMap<NaiveDate, Vec<&LedgerEntry>> = BTreeMap::new();
    for entry in entries {
        if window.contains(entry.date()) {
            by_day.entry(entry.date()).or_default().push(entry);
        }
    }
    by_day
}
