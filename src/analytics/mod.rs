//! Derived views over ledger entries: period summaries and bucketed series.

pub mod buckets;
pub mod summary;

pub use buckets::{
    bucketize, category_series, compare_periods, comparison_series, Bucket, BucketSpec,
    BucketWidth, ComparisonPoint, TimeRange, TimeSeries,
};
pub use summary::{
    daily_summaries, monthly_summary, over_limit_days, resolve_limit, summarize,
    weekly_summaries, CategoryShare, EntryHighlight, PeriodSummary, SummaryOptions,
};
