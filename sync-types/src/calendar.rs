//! Gregorian month helpers.
//!
//! A monthsync calendar has exactly twelve slots, keyed by month number
//! 1..=12. Day ranges follow the Gregorian leap-year rule.

/// Number of month slots in a calendar.
pub const MONTHS: i32 = 12;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name for a month number, or `None` outside 1..=12.
pub fn month_name(month: i32) -> Option<&'static str> {
    if (1..=MONTHS).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

/// Divisible by 4, and either not by 100 or by 400.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` for the given year.
pub fn days_in_month(month: i32, year: i32) -> Option<i32> {
    match month {
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        4 | 6 | 9 | 11 => Some(30),
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        _ => None,
    }
}
