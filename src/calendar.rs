//! Weekday-only business-day calendar.
//!
//! Saturdays and Sundays are the only non-business days. Exchange holidays
//! are not modelled, so counts across a holiday overstate the trading days
//! by one per holiday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of business days in the half-open range `[begin, end)`.
///
/// When `end < begin` the result is negative and counts the business days in
/// `(end, begin]`, so `business_day_count(a, b) == -business_day_count(b, a)`.
pub fn business_day_count(begin: NaiveDate, end: NaiveDate) -> i64 {
    if begin == end {
        return 0;
    }
    if end < begin {
        let first = end + Duration::days(1);
        let last = begin + Duration::days(1);
        return -forward_count(first, last);
    }
    forward_count(begin, end)
}

fn forward_count(begin: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - begin).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;

    let mut d = begin + Duration::days(full_weeks * 7);
    while d < end {
        if is_business_day(d) {
            count += 1;
        }
        d += Duration::days(1);
    }
    count
}
