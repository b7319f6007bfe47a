//! Arena of ledger entries indexed by recurrence group.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use uuid::Uuid;

use super::entry::{LedgerEntry, NewEntry};
use super::range::DateRange;
use super::recurring::{expand, expand_with, OccurrenceIdFn};
use crate::errors::LedgerResult;
use crate::time::Clock;

#[derive(Debug, Clone, Default)]
struct GroupSlot {
    template: Option<usize>,
    by_date: BTreeMap<NaiveDate, usize>,
}

/// Owns entries and keeps the template/occurrence relation as O(1) lookups.
///
/// Each group holds at most one entry per date, so the (group, date) pair is
/// unique across everything stored here.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceGroups {
    slots: Vec<Option<LedgerEntry>>,
    by_id: HashMap<Uuid, usize>,
    groups: HashMap<Uuid, GroupSlot>,
}

impl RecurrenceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut groups = Self::new();
        for entry in entries {
            groups.insert(entry);
        }
        groups
    }

    /// Stores an entry, replacing any previous version with the same id.
    ///
    /// Returns `false` when another entry of the same group already sits on
    /// the entry's date; the entry is not stored in that case.
    pub fn insert(&mut self, entry: LedgerEntry) -> bool {
        if let Some(group_id) = entry.recurrence_group_id() {
            if let Some(existing) = self
                .groups
                .get(&group_id)
                .and_then(|slot| slot.by_date.get(&entry.date()))
            {
                let same_id = self.slots[*existing]
                    .as_ref()
                    .is_some_and(|stored| stored.id() == entry.id());
                if !same_id {
                    tracing::debug!(
                        group = %group_id,
                        date = %entry.date(),
                        "skipping duplicate occurrence"
                    );
                    return false;
                }
            }
        }

        if let Some(previous) = self.by_id.get(&entry.id()).copied() {
            self.detach(previous);
        }

        let index = self.slots.len();
        if let Some(group_id) = entry.recurrence_group_id() {
            let slot = self.groups.entry(group_id).or_default();
            slot.by_date.insert(entry.date(), index);
            if entry.is_template() {
                slot.template = Some(index);
            }
        }
        self.by_id.insert(entry.id(), index);
        self.slots.push(Some(entry));
        true
    }

    pub fn get(&self, id: Uuid) -> Option<&LedgerEntry> {
        self.by_id
            .get(&id)
            .and_then(|index| self.slots[*index].as_ref())
    }

    pub fn template_of(&self, group_id: Uuid) -> Option<&LedgerEntry> {
        self.groups
            .get(&group_id)
            .and_then(|slot| slot.template)
            .and_then(|index| self.slots[index].as_ref())
    }

    /// Every entry of the group, template included, ordered by date.
    pub fn members_of(&self, group_id: Uuid) -> Vec<&LedgerEntry> {
        self.groups
            .get(&group_id)
            .map(|slot| {
                slot.by_date
                    .values()
                    .filter_map(|index| self.slots[*index].as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Generated occurrences of the group, ordered by date.
    pub fn occurrences_of(&self, group_id: Uuid) -> Vec<&LedgerEntry> {
        self.members_of(group_id)
            .into_iter()
            .filter(|entry| entry.is_occurrence())
            .collect()
    }

    pub fn has_member_on(&self, group_id: Uuid, date: NaiveDate) -> bool {
        self.groups
            .get(&group_id)
            .is_some_and(|slot| slot.by_date.contains_key(&date))
    }

    pub fn templates(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries().filter(|entry| entry.is_template())
    }

    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Occurrences of `template` inside `window` that are not stored yet.
    pub fn missing_occurrences(
        &self,
        template: &LedgerEntry,
        window: DateRange,
        derive_id: Option<&OccurrenceIdFn>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let occurrences = match derive_id {
            Some(derive) => expand_with(template, window, derive)?,
            None => expand(template, window)?,
        };
        let group_id = occurrences.group_id();
        Ok(occurrences
            .filter(|occurrence| !self.has_member_on(group_id, occurrence.date()))
            .collect())
    }

    /// Expands every stored template over `window` and stores the missing
    /// occurrences, returning the ids that were added.
    pub fn materialize(
        &mut self,
        window: DateRange,
        derive_id: Option<&OccurrenceIdFn>,
    ) -> LedgerResult<Vec<Uuid>> {
        let mut pending = Vec::new();
        for template in self.templates() {
            pending.extend(self.missing_occurrences(template, window, derive_id)?);
        }
        let mut added = Vec::with_capacity(pending.len());
        for occurrence in pending {
            let id = occurrence.id();
            if self.insert(occurrence) {
                added.push(id);
            }
        }
        tracing::debug!(added = added.len(), %window, "materialized recurring occurrences");
        Ok(added)
    }

    /// Applies `edit` to every member of a group, keeping each member's own date.
    ///
    /// All revisions are validated before any is stored, so a rejected edit
    /// leaves the group untouched. Returns the number of revised entries.
    pub fn revise_group<F>(
        &mut self,
        group_id: Uuid,
        clock: &dyn Clock,
        edit: F,
    ) -> LedgerResult<usize>
    where
        F: Fn(&mut NewEntry),
    {
        let indices: Vec<usize> = match self.groups.get(&group_id) {
            Some(slot) => slot.by_date.values().copied().collect(),
            None => return Ok(0),
        };
        let mut revised = Vec::with_capacity(indices.len());
        for index in indices {
            if let Some(entry) = self.slots[index].as_ref() {
                let date = entry.date();
                let next = entry.revise(clock, |draft| {
                    edit(draft);
                    draft.date = date;
                })?;
                revised.push((index, next));
            }
        }
        let count = revised.len();
        for (index, entry) in revised {
            self.slots[index] = Some(entry);
        }
        tracing::debug!(group = %group_id, count, "revised recurrence group");
        Ok(count)
    }

    /// Removes a single entry. Removing a template does not touch its occurrences.
    pub fn remove(&mut self, id: Uuid) -> Option<LedgerEntry> {
        let index = self.by_id.get(&id).copied()?;
        self.detach(index)
    }

    /// Removes the template and every occurrence of a group.
    pub fn remove_group(&mut self, group_id: Uuid) -> Vec<LedgerEntry> {
        let Some(slot) = self.groups.remove(&group_id) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(slot.by_date.len());
        for index in slot.by_date.into_values() {
            if let Some(entry) = self.slots[index].take() {
                self.by_id.remove(&entry.id());
                removed.push(entry);
            }
        }
        removed
    }

    /// Removes the group's generated occurrences dated on or after `from`.
    pub fn remove_occurrences_from(
        &mut self,
        group_id: Uuid,
        from: NaiveDate,
    ) -> Vec<LedgerEntry> {
        let indices: Vec<usize> = match self.groups.get(&group_id) {
            Some(slot) => slot.by_date.range(from..).map(|(_, index)| *index).collect(),
            None => return Vec::new(),
        };
        let mut removed = Vec::new();
        for index in indices {
            let is_occurrence = self.slots[index]
                .as_ref()
                .is_some_and(LedgerEntry::is_occurrence);
            if is_occurrence {
                removed.extend(self.detach(index));
            }
        }
        removed
    }

    fn detach(&mut self, index: usize) -> Option<LedgerEntry> {
        let entry = self.slots.get_mut(index)?.take()?;
        self.by_id.remove(&entry.id());
        if let Some(group_id) = entry.recurrence_group_id() {
            if let Some(slot) = self.groups.get_mut(&group_id) {
                if slot.by_date.get(&entry.date()) == Some(&index) {
                    slot.by_date.remove(&entry.date());
                }
                if slot.template == Some(index) {
                    slot.template = None;
                }
                if slot.by_date.is_empty() && slot.template.is_none() {
                    self.groups.remove(&group_id);
                }
            }
        }
        Some(entry)
    }
}
