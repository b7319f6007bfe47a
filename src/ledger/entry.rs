use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::limits::{LimitPeriod, LimitSettings, LimitSnapshot};
use crate::errors::{LedgerError, LedgerResult};
use crate::taxonomy::{CategoryId, SubCategoryId, Taxonomy};
use crate::time::Clock;

/// Repetition pattern of a recurring entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// Every day except Saturday and Sunday.
    Weekdays,
    /// Every `interval` days.
    CustomInterval,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceKind::None => "None",
            RecurrenceKind::Daily => "Daily",
            RecurrenceKind::Weekly => "Weekly",
            RecurrenceKind::Monthly => "Monthly",
            RecurrenceKind::Weekdays => "Weekdays",
            RecurrenceKind::CustomInterval => "Custom",
        };
        f.write_str(label)
    }
}

/// Recurrence descriptor carried by every entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct RecurrenceRule {
    kind: RecurrenceKind,
    #[serde(default = "RecurrenceRule::default_interval")]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// Builds a rule, rejecting custom intervals below one day.
    ///
    /// For every kind except [`RecurrenceKind::CustomInterval`] the interval is
    /// ignored; for [`RecurrenceKind::None`] the end date is ignored as well.
    pub fn new(
        kind: RecurrenceKind,
        interval: i64,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Self> {
        match kind {
            RecurrenceKind::None => Ok(Self::none()),
            RecurrenceKind::CustomInterval => {
                if interval < 1 || interval > u32::MAX as i64 {
                    return Err(LedgerError::InvalidRecurrenceInterval(interval));
                }
                Ok(Self {
                    kind,
                    interval: interval as u32,
                    end_date,
                })
            }
            _ => Ok(Self {
                kind,
                interval: 1,
                end_date,
            }),
        }
    }

    pub fn none() -> Self {
        Self {
            kind: RecurrenceKind::None,
            interval: 1,
            end_date: None,
        }
    }

    pub fn daily() -> Self {
        Self::simple(RecurrenceKind::Daily)
    }

    pub fn weekly() -> Self {
        Self::simple(RecurrenceKind::Weekly)
    }

    pub fn monthly() -> Self {
        Self::simple(RecurrenceKind::Monthly)
    }

    pub fn weekdays() -> Self {
        Self::simple(RecurrenceKind::Weekdays)
    }

    pub fn every_days(days: i64) -> LedgerResult<Self> {
        Self::new(RecurrenceKind::CustomInterval, days, None)
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        if self.kind != RecurrenceKind::None {
            self.end_date = Some(end_date);
        }
        self
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.kind
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    /// Day step of the rule; only meaningful for custom intervals.
    pub fn interval(&self) -> u32 {
        match self.kind {
            RecurrenceKind::CustomInterval => self.interval,
            _ => 1,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.kind {
            RecurrenceKind::None => None,
            _ => self.end_date,
        }
    }

    /// Re-checks invariants on rules that bypassed [`RecurrenceRule::new`],
    /// e.g. ones deserialized from storage.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.kind == RecurrenceKind::CustomInterval && self.interval == 0 {
            return Err(LedgerError::InvalidRecurrenceInterval(0));
        }
        Ok(())
    }

    pub fn label(&self) -> String {
        match self.kind {
            RecurrenceKind::CustomInterval if self.interval == 1 => "Every day".into(),
            RecurrenceKind::CustomInterval => format!("Every {} days", self.interval),
            kind => kind.to_string(),
        }
    }

    fn simple(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            interval: 1,
            end_date: None,
        }
    }

    fn default_interval() -> u32 {
        1
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EntryStatus {
    #[default]
    Confirmed,
    Pending,
}

/// Caller-supplied fields for a new entry or a revision of an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub amount: f64,
    pub currency: String,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubCategoryId>,
    pub description: String,
    pub date: NaiveDate,
    pub recurrence: RecurrenceRule,
    pub status: EntryStatus,
    pub tags: Vec<String>,
}

impl NewEntry {
    pub fn new(
        amount: f64,
        currency: impl Into<String>,
        category_id: CategoryId,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            category_id,
            subcategory_id: None,
            description: String::new(),
            date,
            recurrence: RecurrenceRule::none(),
            status: EntryStatus::Confirmed,
            tags: Vec::new(),
        }
    }

    /// Sets the subcategory and derives the category from the taxonomy.
    pub fn with_subcategory(mut self, taxonomy: &Taxonomy, subcategory: SubCategoryId) -> Self {
        self.category_id = taxonomy.parent_of(&subcategory);
        self.subcategory_id = Some(subcategory);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceRule) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> LedgerResult<()> {
        validate_amount(self.amount)?;
        self.recurrence.validate()
    }
}

fn validate_amount(amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}

/// Canonical, immutable ledger record.
///
/// Entries are never edited in place: [`LedgerEntry::revise`] produces a new
/// version carrying the same id, creation time and limit snapshot. Stored
/// records go through [`LedgerEntry::validate`] when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "StoredEntry")]
pub struct LedgerEntry {
    id: Uuid,
    amount: f64,
    currency: String,
    category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcategory_id: Option<SubCategoryId>,
    description: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    limits: LimitSnapshot,
    recurrence: RecurrenceRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurrence_group_id: Option<Uuid>,
    status: EntryStatus,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_entry_id: Option<Uuid>,
}

/// Wire shape of [`LedgerEntry`]; checked before it becomes an entry.
#[derive(Deserialize)]
struct StoredEntry {
    id: Uuid,
    amount: f64,
    currency: String,
    category_id: CategoryId,
    #[serde(default)]
    subcategory_id: Option<SubCategoryId>,
    #[serde(default)]
    description: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    limits: LimitSnapshot,
    #[serde(default)]
    recurrence: RecurrenceRule,
    #[serde(default)]
    recurrence_group_id: Option<Uuid>,
    #[serde(default)]
    status: EntryStatus,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    parent_entry_id: Option<Uuid>,
}

impl TryFrom<StoredEntry> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(stored: StoredEntry) -> LedgerResult<Self> {
        let entry = Self {
            id: stored.id,
            amount: stored.amount,
            currency: stored.currency,
            category_id: stored.category_id,
            subcategory_id: stored.subcategory_id,
            description: stored.description,
            date: stored.date,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            limits: stored.limits,
            recurrence: stored.recurrence,
            recurrence_group_id: stored.recurrence_group_id,
            status: stored.status,
            tags: stored.tags,
            parent_entry_id: stored.parent_entry_id,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl LedgerEntry {
    /// Creates an entry stamped with the currently configured limits.
    pub fn new(draft: NewEntry, limits: &LimitSettings, clock: &dyn Clock) -> LedgerResult<Self> {
        draft.validate()?;
        let now = clock.now();
        let id = Uuid::new_v4();
        let recurrence_group_id = draft.recurrence.is_recurring().then_some(id);
        Ok(Self {
            id,
            amount: draft.amount,
            currency: draft.currency,
            category_id: draft.category_id,
            subcategory_id: draft.subcategory_id,
            description: draft.description,
            date: draft.date,
            created_at: now,
            updated_at: now,
            limits: limits.snapshot(),
            recurrence: draft.recurrence,
            recurrence_group_id,
            status: draft.status,
            tags: draft.tags,
            parent_entry_id: None,
        })
    }

    /// Returns a new version of this entry with `edit` applied.
    ///
    /// The id, creation timestamp, limit snapshot and recurrence links are kept.
    pub fn revise<F>(&self, clock: &dyn Clock, edit: F) -> LedgerResult<Self>
    where
        F: FnOnce(&mut NewEntry),
    {
        let mut draft = self.to_draft();
        edit(&mut draft);
        draft.validate()?;
        let recurrence_group_id = match self.recurrence_group_id {
            Some(group) => Some(group),
            None => draft.recurrence.is_recurring().then_some(self.id),
        };
        Ok(Self {
            id: self.id,
            amount: draft.amount,
            currency: draft.currency,
            category_id: draft.category_id,
            subcategory_id: draft.subcategory_id,
            description: draft.description,
            date: draft.date,
            created_at: self.created_at,
            updated_at: clock.now(),
            limits: self.limits,
            recurrence: draft.recurrence,
            recurrence_group_id,
            status: draft.status,
            tags: draft.tags,
            parent_entry_id: self.parent_entry_id,
        })
    }

    /// Concrete occurrence of this template on `date`.
    pub(crate) fn occurrence(&self, id: Uuid, group_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id,
            date,
            recurrence_group_id: Some(group_id),
            parent_entry_id: Some(self.id),
            ..self.clone()
        }
    }

    /// Checks the amount and recurrence invariants that construction enforces.
    pub fn validate(&self) -> LedgerResult<()> {
        validate_amount(self.amount)?;
        self.recurrence.validate()
    }

    pub fn to_draft(&self) -> NewEntry {
        NewEntry {
            amount: self.amount,
            currency: self.currency.clone(),
            category_id: self.category_id,
            subcategory_id: self.subcategory_id.clone(),
            description: self.description.clone(),
            date: self.date,
            recurrence: self.recurrence,
            status: self.status,
            tags: self.tags.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn subcategory_id(&self) -> Option<&SubCategoryId> {
        self.subcategory_id.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn limits(&self) -> &LimitSnapshot {
        &self.limits
    }

    pub fn limit_for(&self, period: LimitPeriod) -> f64 {
        self.limits.limit_for(period)
    }

    pub fn recurrence(&self) -> &RecurrenceRule {
        &self.recurrence
    }

    pub fn recurrence_group_id(&self) -> Option<Uuid> {
        self.recurrence_group_id
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn parent_entry_id(&self) -> Option<Uuid> {
        self.parent_entry_id
    }

    /// A recurring entry that was not itself generated by expansion.
    pub fn is_template(&self) -> bool {
        self.recurrence.is_recurring() && self.parent_entry_id.is_none()
    }

    pub fn is_occurrence(&self) -> bool {
        self.parent_entry_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::TimeZone;

    fn clock(hour: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn custom_interval_rejects_non_positive_values() {
        assert!(matches!(
            RecurrenceRule::every_days(0),
            Err(LedgerError::InvalidRecurrenceInterval(0))
        ));
        assert!(matches!(
            RecurrenceRule::every_days(-3),
            Err(LedgerError::InvalidRecurrenceInterval(-3))
        ));
        assert_eq!(RecurrenceRule::every_days(10).unwrap().interval(), 10);
    }

    #[test]
    fn none_rule_ignores_interval_and_end_date() {
        let rule = RecurrenceRule::new(RecurrenceKind::None, -4, Some(date(2025, 1, 1))).unwrap();
        assert_eq!(rule.end_date(), None);
        assert_eq!(rule.interval(), 1);
        assert!(!rule.is_recurring());
        assert_eq!(RecurrenceRule::none().until(date(2025, 1, 1)).end_date(), None);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let draft = NewEntry::new(-1.0, "USD", CategoryId::Food, date(2025, 3, 1));
        let err = LedgerEntry::new(draft, &LimitSettings::default(), &clock(8)).unwrap_err();
        assert!(matches!(err, LedgerError::NegativeAmount(_)));
    }

    #[test]
    fn recurring_entry_becomes_its_own_group() {
        let draft = NewEntry::new(12.5, "USD", CategoryId::Food, date(2025, 3, 1))
            .with_recurrence(RecurrenceRule::weekly());
        let entry = LedgerEntry::new(draft, &LimitSettings::default(), &clock(8)).unwrap();
        assert_eq!(entry.recurrence_group_id(), Some(entry.id()));
        assert!(entry.is_template());
    }

    #[test]
    fn revise_keeps_identity_and_snapshot() {
        let settings = LimitSettings::new(40.0, 1000.0, 12000.0);
        let draft = NewEntry::new(20.0, "USD", CategoryId::Food, date(2025, 3, 1))
            .with_description("Lunch");
        let original = LedgerEntry::new(draft, &settings, &clock(8)).unwrap();

        let revised = original
            .revise(&clock(9), |draft| {
                draft.amount = 25.0;
                draft.description = "Team lunch".into();
            })
            .unwrap();

        assert_eq!(revised.id(), original.id());
        assert_eq!(revised.created_at(), original.created_at());
        assert_eq!(revised.limits(), original.limits());
        assert!(revised.updated_at() > original.updated_at());
        assert_eq!(revised.amount(), 25.0);
        assert_eq!(original.amount(), 20.0);
    }

    #[test]
    fn stored_entry_with_negative_amount_is_rejected() {
        let draft = NewEntry::new(50.0, "USD", CategoryId::Food, date(2025, 3, 1));
        let entry = LedgerEntry::new(draft, &LimitSettings::default(), &clock(8)).unwrap();
        let mut json = serde_json::to_value(&entry).unwrap();

        let restored: LedgerEntry = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, entry);

        json["amount"] = serde_json::json!(-50.0);
        let err = serde_json::from_value::<LedgerEntry>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid amount"));
    }

    #[test]
    fn stored_custom_rule_with_zero_interval_is_rejected() {
        let draft = NewEntry::new(5.0, "USD", CategoryId::Food, date(2025, 3, 1))
            .with_recurrence(RecurrenceRule::every_days(3).unwrap());
        let entry = LedgerEntry::new(draft, &LimitSettings::default(), &clock(8)).unwrap();
        let mut json = serde_json::to_value(&entry).unwrap();
        json["recurrence"]["interval"] = serde_json::json!(0);
        assert!(serde_json::from_value::<LedgerEntry>(json).is_err());
    }

    #[test]
    fn subcategory_drives_category() {
        let draft = NewEntry::new(3.0, "EUR", CategoryId::Other, date(2025, 3, 1))
            .with_subcategory(Taxonomy::standard(), SubCategoryId::new("coffee"));
        assert_eq!(draft.category_id, CategoryId::Food);
    }
}
