//! Simple and compound interest formulas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};

pub const ANNUALLY: i64 = 1;
pub const QUARTERLY: i64 = 4;
pub const MONTHLY: i64 = 12;
pub const DAILY: i64 = 365;

/// How interest accrues on a principal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum InterestType {
    Simple,
    #[default]
    Compound,
}

impl InterestType {
    /// Balance after `time` years at annual `rate` (0.05 = 5%).
    ///
    /// `compounding_frequency` is the number of compounding periods per year
    /// and must be at least 1 for either kind; simple interest ignores its value.
    pub fn calculate_amount(
        self,
        principal: f64,
        rate: f64,
        time: f64,
        compounding_frequency: i64,
    ) -> LedgerResult<f64> {
        if compounding_frequency < 1 {
            return Err(LedgerError::InvalidCompoundingFrequency(
                compounding_frequency,
            ));
        }
        let amount = match self {
            InterestType::Simple => principal * (1.0 + rate * time),
            InterestType::Compound => {
                let n = compounding_frequency as f64;
                principal * (1.0 + rate / n).powf(n * time)
            }
        };
        Ok(amount)
    }

    /// Interest earned: `calculate_amount - principal`.
    pub fn calculate_interest(
        self,
        principal: f64,
        rate: f64,
        time: f64,
        compounding_frequency: i64,
    ) -> LedgerResult<f64> {
        Ok(self.calculate_amount(principal, rate, time, compounding_frequency)? - principal)
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InterestType::Simple => "Simple",
            InterestType::Compound => "Compound",
        };
        f.write_str(label)
    }
}
