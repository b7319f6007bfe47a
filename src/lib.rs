#![doc(test(attr(deny(warnings))))]

//! Spendlog Core is the computation engine behind personal expense tracking:
//! a category taxonomy, immutable ledger entries with limit snapshots,
//! recurrence expansion, period aggregation, time-series bucketing and
//! financial plan projections.

pub mod analytics;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod planning;
pub mod taxonomy;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Spendlog Core tracing initialized.");
    });
}
