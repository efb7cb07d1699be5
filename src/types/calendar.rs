//! Calendar alignment primitives: the `"MM-DD"` day-of-year key used to join
//! daily observations across calendar years, and the month/day range type
//! whose resolution may cross a year boundary.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Number of days in a month on the leap-length calendar the engine aligns on.
///
/// February is fixed at 29 so that `02-29` samples contributed by leap years
/// share a slot with nothing to collide with in common years; common years
/// simply contribute no sample for that key.
///
/// # Panics
///
/// Panics if `month` is outside `1..=12`.
pub fn days_in_month(month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => 29,
        _ => panic!("month out of range: {month}"),
    }
}

/// A month/day pair, the join key for day-of-year alignment.
///
/// Ordering is chronological within a year, which matches the lexicographic
/// ordering of the canonical zero-padded `"MM-DD"` rendering, so `BTreeMap`
/// keys iterate in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Builds a `MonthDay`, rejecting days outside the leap-length calendar.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(month) {
            return None;
        }
        Some(Self { month, day })
    }

    /// The key for a concrete calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Parses the key out of an ISO `YYYY-MM-DD` string by taking the part
    /// after the year, the way the upstream payload dates are keyed.
    pub fn from_iso(iso_date: &str) -> Option<Self> {
        let mut parts = iso_date.splitn(3, '-');
        let _year = parts.next()?;
        let month = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        Self::new(month, day)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Materializes this key inside a concrete year. A Feb 29 key in a common
    /// year clamps to Feb 28 rather than failing the whole request.
    pub fn in_year(&self, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| NaiveDate::from_ymd_opt(year, self.month, self.day - 1))
            .expect("month/day validated at construction")
    }
}

impl Display for MonthDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl Serialize for MonthDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A month/day range. When the end falls before the start the range wraps the
/// calendar year boundary (e.g. October through January) and resolves into two
/// same-year fetch windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfYearRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl DayOfYearRange {
    pub fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    /// Whether the range crosses the year boundary.
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// Resolves the range against a reference year into chronological fetch
    /// windows.
    ///
    /// A non-wrapping range yields one window inside `year`. A wrapping range
    /// yields two: `year` start through Dec 31, then Jan 1 of `year + 1`
    /// through the end. Results for the two windows are concatenated in this
    /// order, and "year" always denotes the start year of the wrap.
    pub fn fetch_windows(&self, year: i32) -> Vec<(NaiveDate, NaiveDate)> {
        if self.wraps() {
            let december_31 = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid date");
            let january_1 = NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid date");
            vec![
                (self.start.in_year(year), december_31),
                (january_1, self.end.in_year(year + 1)),
            ]
        } else {
            vec![(self.start.in_year(year), self.end.in_year(year))]
        }
    }

    /// Display label for the series sourced from `year`: the plain year for a
    /// same-year range, `"YY/YY+1"` for a wrapping one.
    pub fn year_label(&self, year: i32) -> String {
        if self.wraps() {
            SpanningYearPair::new(year).label()
        } else {
            year.to_string()
        }
    }
}

/// Two consecutive historical years backing one continuous 12-month trace
/// that straddles a calendar-year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpanningYearPair {
    pub year1: i32,
    pub year2: i32,
}

impl SpanningYearPair {
    pub fn new(year1: i32) -> Self {
        Self {
            year1,
            year2: year1 + 1,
        }
    }

    /// The `"YY/YY+1"` display label, e.g. `"23/24"`.
    pub fn label(&self) -> String {
        format!(
            "{:02}/{:02}",
            self.year1.rem_euclid(100),
            self.year2.rem_euclid(100)
        )
    }

    /// All pairs derivable from a sorted list of available years; only years
    /// whose successor is also available form a pair.
    pub fn from_years(years: &[i32]) -> Vec<Self> {
        years
            .iter()
            .filter(|&&year| years.contains(&(year + 1)))
            .map(|&year| Self::new(year))
            .collect()
    }
}

impl Display for SpanningYearPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
