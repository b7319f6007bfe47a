//! Ledger entry model, limit snapshots and recurrence expansion.

pub mod calendar;
pub mod entry;
pub mod groups;
pub mod limits;
pub mod range;
pub mod recurring;

pub use entry::{EntryStatus, LedgerEntry, NewEntry, RecurrenceKind, RecurrenceRule};
pub use groups::RecurrenceGroups;
pub use limits::{LimitPeriod, LimitSettings, LimitSnapshot};
pub use range::DateRange;
pub use recurring::{
    deterministic_occurrence_id, expand, expand_with, OccurrenceIdFn, Occurrences, Schedule,
    ScheduleDates,
};
