//! Expansion of recurring templates into concrete dated occurrences.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use super::calendar::{is_weekend, month_occurrence, months_between};
use super::entry::{LedgerEntry, RecurrenceKind, RecurrenceRule};
use super::range::DateRange;
use crate::errors::LedgerResult;

/// Derives an occurrence id from its recurrence group and date.
pub type OccurrenceIdFn = dyn Fn(Uuid, NaiveDate) -> Uuid + Send + Sync;

/// Stable id for the occurrence of `group_id` on `date`.
///
/// Two expansions over overlapping windows yield identical ids for the same
/// day, which lets callers deduplicate by id alone.
pub fn deterministic_occurrence_id(group_id: Uuid, date: NaiveDate) -> Uuid {
    let key = date.format("%Y-%m-%d").to_string();
    Uuid::new_v5(&group_id, key.as_bytes())
}

/// A recurrence rule bound to the anchor date it starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    anchor: NaiveDate,
    rule: RecurrenceRule,
}

impl Schedule {
    pub fn new(anchor: NaiveDate, rule: RecurrenceRule) -> LedgerResult<Self> {
        rule.validate()?;
        Ok(Self { anchor, rule })
    }

    pub fn for_entry(entry: &LedgerEntry) -> LedgerResult<Self> {
        Self::new(entry.date(), *entry.recurrence())
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// Scheduled dates that fall inside `window`, oldest first.
    pub fn dates_in(&self, window: DateRange) -> ScheduleDates {
        let lower = window.start.max(self.anchor);
        let upper = match self.rule.end_date() {
            Some(end) => window.end.min(end),
            None => window.end,
        };
        ScheduleDates {
            schedule: *self,
            index: self.first_index_on_or_after(lower),
            lower,
            upper,
            done: !self.rule.is_recurring() || lower > upper,
        }
    }

    /// First scheduled date strictly after `date`, honouring the end date.
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let from = date.succ_opt()?;
        let window = DateRange {
            start: from,
            end: NaiveDate::MAX,
        };
        self.dates_in(window).next()
    }

    /// Whether the schedule produces an occurrence on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.dates_in(DateRange::single_day(date)).next().is_some()
    }

    fn step_days(&self) -> Option<i64> {
        match self.rule.kind() {
            RecurrenceKind::Daily | RecurrenceKind::Weekdays => Some(1),
            RecurrenceKind::Weekly => Some(7),
            RecurrenceKind::CustomInterval => Some(self.rule.interval() as i64),
            RecurrenceKind::Monthly | RecurrenceKind::None => None,
        }
    }

    fn date_at(&self, index: u32) -> Option<NaiveDate> {
        match self.rule.kind() {
            RecurrenceKind::None => None,
            RecurrenceKind::Monthly => month_occurrence(self.anchor, index),
            _ => {
                let step = self.step_days()?;
                self.anchor
                    .checked_add_signed(Duration::days(step.checked_mul(index as i64)?))
            }
        }
    }

    fn first_index_on_or_after(&self, date: NaiveDate) -> u32 {
        if date <= self.anchor {
            return 0;
        }
        match self.rule.kind() {
            RecurrenceKind::Monthly => (months_between(self.anchor, date) - 1).max(0) as u32,
            _ => match self.step_days() {
                Some(step) => {
                    let days = (date - self.anchor).num_days();
                    let steps = (days + step - 1) / step;
                    steps.min(u32::MAX as i64) as u32
                }
                None => 0,
            },
        }
    }
}

/// Lazy iterator over the dates of a [`Schedule`] inside a window.
#[derive(Debug, Clone)]
pub struct ScheduleDates {
    schedule: Schedule,
    index: u32,
    lower: NaiveDate,
    upper: NaiveDate,
    done: bool,
}

impl Iterator for ScheduleDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.done {
            let Some(candidate) = self.schedule.date_at(self.index) else {
                self.done = true;
                break;
            };
            if candidate > self.upper {
                self.done = true;
                break;
            }
            match self.index.checked_add(1) {
                Some(next) => self.index = next,
                None => self.done = true,
            }
            if candidate < self.lower {
                continue;
            }
            if self.schedule.rule.kind() == RecurrenceKind::Weekdays && is_weekend(candidate) {
                continue;
            }
            return Some(candidate);
        }
        None
    }
}

/// Occurrences generated from one template; cloning the iterator restarts it
/// from the same position.
///
/// Every scheduled date inside the window is emitted; the window alone bounds
/// the expansion.
#[derive(Clone)]
pub struct Occurrences<'a> {
    template: &'a LedgerEntry,
    group_id: Uuid,
    dates: ScheduleDates,
    derive_id: Option<&'a OccurrenceIdFn>,
}

impl<'a> Occurrences<'a> {
    pub fn template(&self) -> &'a LedgerEntry {
        self.template
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    /// Remaining dates without materializing entries.
    pub fn dates(&self) -> ScheduleDates {
        self.dates.clone()
    }
}

impl Iterator for Occurrences<'_> {
    type Item = LedgerEntry;

    fn next(&mut self) -> Option<LedgerEntry> {
        let date = self.dates.next()?;
        let id = match self.derive_id {
            Some(derive) => derive(self.group_id, date),
            None => Uuid::new_v4(),
        };
        Some(self.template.occurrence(id, self.group_id, date))
    }
}

/// Expands `template` into occurrences within `window` using random ids.
///
/// A template whose rule is [`RecurrenceKind::None`] expands to nothing.
pub fn expand(template: &LedgerEntry, window: DateRange) -> LedgerResult<Occurrences<'_>> {
    build(template, window, None)
}

/// Expands `template` using `derive_id` for occurrence ids.
pub fn expand_with<'a>(
    template: &'a LedgerEntry,
    window: DateRange,
    derive_id: &'a OccurrenceIdFn,
) -> LedgerResult<Occurrences<'a>> {
    build(template, window, Some(derive_id))
}

fn build<'a>(
    template: &'a LedgerEntry,
    window: DateRange,
    derive_id: Option<&'a OccurrenceIdFn>,
) -> LedgerResult<Occurrences<'a>> {
    let schedule = Schedule::for_entry(template)?;
    let group_id = template.recurrence_group_id().unwrap_or(template.id());
    tracing::debug!(
        template = %template.id(),
        kind = %template.recurrence().kind(),
        %window,
        "expanding recurrence"
    );
    Ok(Occurrences {
        template,
        group_id,
        dates: schedule.dates_in(window),
        derive_id,
    })
}
