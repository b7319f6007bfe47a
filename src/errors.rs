use thiserror::Error;

/// Error type that captures precondition violations raised by the ledger engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid recurrence interval: {0} (must be at least 1 day)")]
    InvalidRecurrenceInterval(i64),
    #[error("Invalid compounding frequency: {0} (must be at least 1)")]
    InvalidCompoundingFrequency(i64),
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("Invalid amount: {0} (must be finite and non-negative)")]
    NegativeAmount(f64),
    #[error("Configuration directory unavailable on this platform")]
    ConfigDirUnavailable,
}

pub type LedgerResult<T> = Result<T, LedgerError>;
