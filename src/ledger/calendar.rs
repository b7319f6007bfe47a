//! Calendar arithmetic shared by recurrence expansion and bucketing.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Moves `date` by `months`, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    checked_shift_month(date, months).unwrap_or(date)
}

/// Like [`shift_month`], but `None` when the result leaves chrono's range.
pub fn checked_shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Same day-of-month as `anchor`, `months` after it, clamped to the month end.
///
/// Always computed from the original anchor so a clamp in February never
/// drags later occurrences back to the 28th.
pub fn month_occurrence(anchor: NaiveDate, months: u32) -> Option<NaiveDate> {
    checked_shift_month(anchor, i32::try_from(months).ok()?)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 12 {
        return 31;
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Number of whole calendar months between the months of `from` and `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() * 12 + to.month0() as i32) - (from.year() * 12 + from.month0() as i32)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

pub fn start_of_quarter(date: NaiveDate) -> NaiveDate {
    let month = date.month0() / 3 * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Monday of the ISO week containing `date`, saturating at chrono's minimum date.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(
        date.weekday().num_days_from_monday() as i64,
    ))
    .unwrap_or(NaiveDate::MIN)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn shift_month_clamps_short_months() {
        assert_eq!(shift_month(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(shift_month(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(shift_month(d(2025, 3, 31), 1), d(2025, 4, 30));
        assert_eq!(shift_month(d(2025, 1, 15), -1), d(2024, 12, 15));
        assert_eq!(shift_month(d(2025, 11, 30), 14), d(2027, 1, 30));
    }

    #[test]
    fn month_occurrence_restores_anchor_day() {
        let anchor = d(2025, 1, 31);
        assert_eq!(month_occurrence(anchor, 1), Some(d(2025, 2, 28)));
        assert_eq!(month_occurrence(anchor, 2), Some(d(2025, 3, 31)));
        assert_eq!(month_occurrence(NaiveDate::MAX, 12), None);
    }

    #[test]
    fn period_starts() {
        assert_eq!(start_of_quarter(d(2025, 8, 17)), d(2025, 7, 1));
        assert_eq!(start_of_week(d(2025, 6, 1)), d(2025, 5, 26));
        assert_eq!(end_of_month(d(2025, 2, 3)), d(2025, 2, 28));
        assert_eq!(months_between(d(2024, 11, 30), d(2025, 2, 1)), 3);
        assert!(is_weekend(d(2025, 6, 1)));
        assert!(!is_weekend(d(2025, 6, 2)));
    }
}
