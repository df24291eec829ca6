//! Period resolution: maps a cadence and a reference instant to the concrete
//! `[start, end)` interval that contains it.
//!
//! All boundaries are computed in UTC and weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use momo_domain::{BudgetPeriod, Interval};

/// Resolves the interval of `period` that contains `reference`.
pub fn resolve(period: BudgetPeriod, reference: DateTime<Utc>) -> Interval {
    let day = reference.date_naive();
    let (start, end) = match period {
        BudgetPeriod::Daily => (day, day + Duration::days(1)),
        BudgetPeriod::Weekly => {
            let start = week_start(day);
            (start, start + Duration::days(7))
        }
        BudgetPeriod::Monthly => {
            let start = first_of_month(day);
            (start, next_month_start(start))
        }
    };
    Interval {
        start: midnight(start),
        end: midnight(end),
    }
}

/// The calendar month containing `reference`.
pub fn month_containing(reference: DateTime<Utc>) -> Interval {
    resolve(BudgetPeriod::Monthly, reference)
}

/// Moves `reference` by `months` calendar months, clamping the day to the
/// length of the target month (Mar 31 shifted back one month is Feb 28/29).
/// Returns `None` only when the result leaves chrono's representable range.
pub fn shift_months(reference: DateTime<Utc>, months: i32) -> Option<DateTime<Utc>> {
    let step = Months::new(months.unsigned_abs());
    if months >= 0 {
        reference.checked_add_months(step)
    } else {
        reference.checked_sub_months(step)
    }
}

/// Start of the UTC day containing `instant`.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    midnight(instant.date_naive())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::default()), Utc)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let delta = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(delta)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn next_month_start(first: NaiveDate) -> NaiveDate {
    first + Duration::days(days_in_month(first.year(), first.month()) as i64)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn daily_spans_the_reference_day() {
        let interval = resolve(BudgetPeriod::Daily, at(2025, 3, 12, 17, 45));
        assert_eq!(interval.start, at(2025, 3, 12, 0, 0));
        assert_eq!(interval.end, at(2025, 3, 13, 0, 0));
    }

    #[test]
    fn weekly_starts_on_monday() {
        // 2025-03-12 is a Wednesday.
        let interval = resolve(BudgetPeriod::Weekly, at(2025, 3, 12, 8, 0));
        assert_eq!(interval.start, at(2025, 3, 10, 0, 0));
        assert_eq!(interval.end, at(2025, 3, 17, 0, 0));

        let monday = resolve(BudgetPeriod::Weekly, at(2025, 3, 10, 0, 0));
        assert_eq!(monday.start, at(2025, 3, 10, 0, 0));

        let sunday = resolve(BudgetPeriod::Weekly, at(2025, 3, 16, 23, 59));
        assert_eq!(sunday.start, at(2025, 3, 10, 0, 0));
        assert_eq!(sunday.end, at(2025, 3, 17, 0, 0));
    }

    #[test]
    fn weekly_crosses_month_and_year_boundaries() {
        // 2025-01-01 is a Wednesday; its week starts in 2024.
        let interval = resolve(BudgetPeriod::Weekly, at(2025, 1, 1, 12, 0));
        assert_eq!(interval.start, at(2024, 12, 30, 0, 0));
        assert_eq!(interval.end, at(2025, 1, 6, 0, 0));
    }

    #[test]
    fn monthly_handles_month_lengths() {
        let feb_leap = resolve(BudgetPeriod::Monthly, at(2024, 2, 29, 10, 0));
        assert_eq!(feb_leap.start, at(2024, 2, 1, 0, 0));
        assert_eq!(feb_leap.end, at(2024, 3, 1, 0, 0));

        let feb = resolve(BudgetPeriod::Monthly, at(2025, 2, 14, 10, 0));
        assert_eq!(feb.end, at(2025, 3, 1, 0, 0));

        let december = resolve(BudgetPeriod::Monthly, at(2025, 12, 31, 23, 59));
        assert_eq!(december.start, at(2025, 12, 1, 0, 0));
        assert_eq!(december.end, at(2026, 1, 1, 0, 0));
    }

    #[test]
    fn reference_at_boundary_opens_the_new_period() {
        let interval = resolve(BudgetPeriod::Monthly, at(2025, 4, 1, 0, 0));
        assert_eq!(interval.start, at(2025, 4, 1, 0, 0));
        assert!(!interval.contains(at(2025, 3, 31, 23, 59)));
    }

    #[test]
    fn shift_months_clamps_to_month_length() {
        let reference = at(2025, 3, 31, 12, 0);
        assert_eq!(shift_months(reference, 0), Some(reference));
        assert_eq!(shift_months(reference, -1), Some(at(2025, 2, 28, 12, 0)));
        assert_eq!(shift_months(at(2024, 3, 31, 12, 0), -1), Some(at(2024, 2, 29, 12, 0)));
        assert_eq!(shift_months(reference, -4), Some(at(2024, 11, 30, 12, 0)));
        assert_eq!(shift_months(reference, 10), Some(at(2026, 1, 31, 12, 0)));
    }

    #[test]
    fn shifted_months_resolve_to_whole_previous_months() {
        let reference = at(2025, 1, 15, 9, 0);
        let december = month_containing(shift_months(reference, -1).unwrap());
        assert_eq!(december.start, at(2024, 12, 1, 0, 0));
        assert_eq!(december.end, at(2025, 1, 1, 0, 0));
    }

    #[test]
    fn resolution_is_deterministic() {
        let reference = at(2025, 7, 9, 6, 30);
        for period in BudgetPeriod::ALL {
            assert_eq!(resolve(period, reference), resolve(period, reference));
            assert!(resolve(period, reference).contains(reference));
        }
    }
}
