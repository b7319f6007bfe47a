#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use spendlog_core::ledger::{DateRange, LedgerEntry, LimitSettings, NewEntry, RecurrenceRule};
use spendlog_core::taxonomy::CategoryId;
use spendlog_core::time::FixedClock;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).expect("ordered range")
}

pub fn instant(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hour, 0, 0)
        .single()
        .expect("valid instant")
}

/// Clock pinned to `created`.
pub fn clock_at(created: DateTime<Utc>) -> FixedClock {
    FixedClock(created)
}

pub fn default_limits() -> LimitSettings {
    LimitSettings::new(50.0, 1500.0, 18_000.0)
}

pub fn entry(amount: f64, category: CategoryId, on: NaiveDate) -> LedgerEntry {
    entry_with(amount, category, on, &default_limits(), instant(2025, 1, 1, 8))
}

pub fn entry_with(
    amount: f64,
    category: CategoryId,
    on: NaiveDate,
    limits: &LimitSettings,
    created: DateTime<Utc>,
) -> LedgerEntry {
    let draft = NewEntry::new(amount, "USD", category, on);
    LedgerEntry::new(draft, limits, &clock_at(created)).expect("create entry")
}

pub fn recurring(amount: f64, anchor: NaiveDate, rule: RecurrenceRule) -> LedgerEntry {
    let draft = NewEntry::new(amount, "USD", CategoryId::Utilities, anchor)
        .with_description("Recurring bill")
        .with_recurrence(rule);
    LedgerEntry::new(draft, &default_limits(), &clock_at(instant(2025, 1, 1, 8)))
        .expect("create template")
}
