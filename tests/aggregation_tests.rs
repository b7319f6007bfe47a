mod common;

use chrono::NaiveDate;
use common::{date, default_limits, entry, entry_with, instant, range};
use spendlog_core::analytics::{
    daily_summaries, monthly_summary, over_limit_days, summarize, weekly_summaries,
    SummaryOptions,
};
use spendlog_core::ledger::{LedgerEntry, LimitPeriod, LimitSettings};
use spendlog_core::taxonomy::CategoryId;

#[test]
fn empty_window_yields_zeroed_summary() {
    let entries: Vec<LedgerEntry> = Vec::new();
    let summary = summarize(
        &entries,
        range(date(2025, 3, 1), date(2025, 3, 31)),
        &SummaryOptions::default(),
    );
    assert_eq!(summary.total, 0.0);
    assert_eq!(summary.count, 0);
    assert_eq!(summary.average, 0.0);
    assert_eq!(summary.progress, 0.0);
    assert!(summary.breakdown.is_empty());
    assert!(summary.largest.is_none());
    assert!(summary.smallest.is_none());
    assert!(!summary.over_limit);
}

#[test]
fn breakdown_shares_sum_to_one() {
    let entries = vec![
        entry(30.0, CategoryId::Food, date(2025, 3, 2)),
        entry(45.0, CategoryId::Transport, date(2025, 3, 3)),
        entry(25.0, CategoryId::Food, date(2025, 3, 4)),
        entry(100.0, CategoryId::Housing, date(2025, 3, 5)),
    ];
    let summary = summarize(
        &entries,
        range(date(2025, 3, 1), date(2025, 3, 31)),
        &SummaryOptions::for_period(LimitPeriod::Monthly),
    );
    let shares: f64 = summary.breakdown.iter().map(|s| s.share).sum();
    assert!((shares - 1.0).abs() < 1e-9);
    assert_eq!(summary.breakdown[0].category_id, CategoryId::Housing);
    assert_eq!(summary.share_of(CategoryId::Food), 0.275);
    assert_eq!(summary.limit, 1500.0);
    assert_eq!(summary.average, 50.0);
}

#[test]
fn largest_and_smallest_ties_resolve_to_earliest_date() {
    let later = entry(40.0, CategoryId::Food, date(2025, 3, 9));
    let earlier = entry(40.0, CategoryId::Shopping, date(2025, 3, 2));
    let small_late = entry(5.0, CategoryId::Food, date(2025, 3, 8));
    let small_early = entry(5.0, CategoryId::Food, date(2025, 3, 3));
    let entries = vec![later, earlier.clone(), small_late, small_early.clone()];
    let summary = summarize(
        &entries,
        range(date(2025, 3, 1), date(2025, 3, 31)),
        &SummaryOptions::default(),
    );
    assert_eq!(summary.largest.unwrap().entry_id, earlier.id());
    assert_eq!(summary.smallest.unwrap().entry_id, small_early.id());
}

#[test]
fn entries_outside_the_window_are_ignored() {
    let entries = vec![
        entry(10.0, CategoryId::Food, date(2025, 2, 28)),
        entry(20.0, CategoryId::Food, date(2025, 3, 1)),
        entry(30.0, CategoryId::Food, date(2025, 3, 31)),
        entry(40.0, CategoryId::Food, date(2025, 4, 1)),
    ];
    let summary = summarize(
        &entries,
        range(date(2025, 3, 1), date(2025, 3, 31)),
        &SummaryOptions::default(),
    );
    assert_eq!(summary.total, 50.0);
    assert_eq!(summary.count, 2);
}

#[test]
fn past_periods_keep_their_snapshotted_limit() {
    let mut settings = LimitSettings::new(40.0, 1000.0, 12_000.0);
    let january = vec![
        entry_with(30.0, CategoryId::Food, date(2025, 1, 5), &settings, instant(2025, 1, 5, 9)),
        entry_with(15.0, CategoryId::Food, date(2025, 1, 5), &settings, instant(2025, 1, 5, 19)),
    ];

    let before = summarize(
        &january,
        range(date(2025, 1, 5), date(2025, 1, 5)),
        &SummaryOptions::default(),
    );

    settings.daily = 100.0;
    let february = entry_with(
        60.0,
        CategoryId::Food,
        date(2025, 2, 1),
        &settings,
        instant(2025, 2, 1, 9),
    );
    let mut all = january.clone();
    all.push(february);

    let after = summarize(
        &all,
        range(date(2025, 1, 5), date(2025, 1, 5)),
        &SummaryOptions::default(),
    );
    assert_eq!(before, after);
    assert_eq!(after.limit, 40.0);
    assert!(after.over_limit);

    let feb = summarize(
        &all,
        range(date(2025, 2, 1), date(2025, 2, 1)),
        &SummaryOptions::default(),
    );
    assert_eq!(feb.limit, 100.0);
    assert!(!feb.over_limit);
}

#[test]
fn limit_comes_from_most_recently_created_entry() {
    let old = LimitSettings::new(20.0, 600.0, 7000.0);
    let new = LimitSettings::new(35.0, 900.0, 9000.0);
    let entries = vec![
        entry_with(5.0, CategoryId::Food, date(2025, 4, 1), &new, instant(2025, 4, 2, 8)),
        entry_with(5.0, CategoryId::Food, date(2025, 4, 3), &old, instant(2025, 4, 1, 8)),
    ];
    let summary = summarize(
        &entries,
        range(date(2025, 4, 1), date(2025, 4, 30)),
        &SummaryOptions::for_period(LimitPeriod::Monthly),
    );
    assert_eq!(summary.limit, 900.0);
}

#[test]
fn fallback_limit_applies_without_entries() {
    let entries: Vec<LedgerEntry> = Vec::new();
    let options = SummaryOptions {
        fallback_limit: 75.0,
        ..SummaryOptions::default()
    };
    let summary = summarize(&entries, range(date(2025, 4, 1), date(2025, 4, 1)), &options);
    assert_eq!(summary.limit, 75.0);
    assert_eq!(summary.efficiency_score, 100.0);
    assert_eq!(summary.remaining(), 75.0);
}

#[test]
fn aggregation_is_pure_and_repeatable() {
    let entries = vec![
        entry(12.0, CategoryId::Food, date(2025, 3, 2)),
        entry(8.0, CategoryId::Health, date(2025, 3, 2)),
    ];
    let snapshot = entries.clone();
    let window = range(date(2025, 3, 1), date(2025, 3, 7));
    let first = summarize(&entries, window, &SummaryOptions::default());
    let second = summarize(&entries, window, &SummaryOptions::default());
    assert_eq!(first, second);
    assert_eq!(entries, snapshot);
}

#[test]
fn efficiency_and_savings_follow_the_limit() {
    let entries = vec![entry(20.0, CategoryId::Food, date(2025, 3, 2))];
    let options = SummaryOptions {
        savings_target: 20.0,
        ..SummaryOptions::default()
    };
    let summary = summarize(&entries, range(date(2025, 3, 2), date(2025, 3, 2)), &options);
    assert_eq!(summary.limit, 50.0);
    assert_eq!(summary.progress, 0.4);
    assert!((summary.efficiency_score - 60.0).abs() < 1e-9);
    assert_eq!(summary.actual_savings, 30.0);
    assert_eq!(summary.savings_progress(), 1.0);
}

#[test]
fn daily_summaries_cover_every_day() {
    let entries = vec![
        entry(60.0, CategoryId::Food, date(2025, 3, 3)),
        entry(10.0, CategoryId::Food, date(2025, 3, 5)),
    ];
    let window = range(date(2025, 3, 1), date(2025, 3, 7));
    let days = daily_summaries(&entries, window, &SummaryOptions::default());
    assert_eq!(days.len(), 7);
    assert!(days[2].over_limit);
    assert_eq!(days[0].total, 0.0);
    assert_eq!(over_limit_days(&entries, window), 1);
}

#[test]
fn weekly_summaries_clip_to_window_and_scale_daily_limit() {
    // 2025-03-01 is a Saturday.
    let entries = vec![
        entry(20.0, CategoryId::Food, date(2025, 3, 1)),
        entry(20.0, CategoryId::Food, date(2025, 3, 4)),
    ];
    let window = range(date(2025, 3, 1), date(2025, 3, 12));
    let weeks = weekly_summaries(&entries, window, &SummaryOptions::default());
    assert_eq!(weeks.len(), 3);
    assert_eq!(weeks[0].window, range(date(2025, 3, 1), date(2025, 3, 2)));
    assert_eq!(weeks[0].limit, 100.0);
    assert_eq!(weeks[1].limit, 350.0);
    assert_eq!(weeks[2].window.end, date(2025, 3, 12));
    assert_eq!(weeks[2].limit, 0.0);
}

#[test]
fn monthly_summary_uses_monthly_limit() {
    let entries = vec![entry(1600.0, CategoryId::Housing, date(2025, 3, 1))];
    let summary = monthly_summary(&entries, date(2025, 3, 15), &SummaryOptions::default());
    assert_eq!(summary.window, range(date(2025, 3, 1), date(2025, 3, 31)));
    assert_eq!(summary.limit, default_limits().monthly);
    assert!(summary.over_limit);
    assert_eq!(summary.progress, 1.0);
    assert_eq!(summary.efficiency_score, 0.0);
}

#[test]
fn weekly_summaries_handle_the_ends_of_the_calendar() {
    let entries: Vec<LedgerEntry> = Vec::new();
    let last = NaiveDate::MAX;
    let tail = range(
        last.pred_opt().and_then(|d| d.pred_opt()).unwrap(),
        last,
    );
    let weeks = weekly_summaries(&entries, tail, &SummaryOptions::default());
    assert!(!weeks.is_empty());
    assert_eq!(weeks.last().unwrap().window.end, last);
    let covered: i64 = weeks.iter().map(|w| w.window.days()).sum();
    assert_eq!(covered, 3);

    let first = NaiveDate::MIN;
    let head = range(first, first.succ_opt().and_then(|d| d.succ_opt()).unwrap());
    let weeks = weekly_summaries(&entries, head, &SummaryOptions::default());
    assert_eq!(weeks[0].window.start, first);
    let covered: i64 = weeks.iter().map(|w| w.window.days()).sum();
    assert_eq!(covered, 3);
}
