//! Spending limits and the snapshot frozen onto each entry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cadence a spending limit applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum LimitPeriod {
    #[default]
    Daily,
    Monthly,
    Yearly,
}

impl fmt::Display for LimitPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LimitPeriod::Daily => "Daily",
            LimitPeriod::Monthly => "Monthly",
            LimitPeriod::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

/// Currently configured limits. Only used to stamp new entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LimitSettings {
    pub daily: f64,
    pub monthly: f64,
    pub yearly: f64,
}

impl LimitSettings {
    pub fn new(daily: f64, monthly: f64, yearly: f64) -> Self {
        Self {
            daily,
            monthly,
            yearly,
        }
    }

    /// Freezes the current values into a snapshot for a new entry.
    pub fn snapshot(&self) -> LimitSnapshot {
        LimitSnapshot {
            daily: self.daily.max(0.0),
            monthly: self.monthly.max(0.0),
            yearly: self.yearly.max(0.0),
        }
    }

    pub fn limit_for(&self, period: LimitPeriod) -> f64 {
        match period {
            LimitPeriod::Daily => self.daily,
            LimitPeriod::Monthly => self.monthly,
            LimitPeriod::Yearly => self.yearly,
        }
    }
}

/// Limits in force when an entry was created.
///
/// The fields are private so a snapshot can only come from
/// [`LimitSettings::snapshot`] or deserialization; nothing re-stamps it later.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LimitSnapshot {
    daily: f64,
    monthly: f64,
    yearly: f64,
}

impl LimitSnapshot {
    pub fn daily(&self) -> f64 {
        self.daily
    }

    pub fn monthly(&self) -> f64 {
        self.monthly
    }

    pub fn yearly(&self) -> f64 {
        self.yearly
    }

    pub fn limit_for(&self, period: LimitPeriod) -> f64 {
        match period {
            LimitPeriod::Daily => self.daily,
            LimitPeriod::Monthly => self.monthly,
            LimitPeriod::Yearly => self.yearly,
        }
    }

    /// Whether `total` breaches the snapshotted limit. A zero limit never does.
    pub fn is_exceeded_by(&self, total: f64, period: LimitPeriod) -> bool {
        let limit = self.limit_for(period);
        limit > 0.0 && total > limit
    }
}
