//! February-anchored fiscal quarters.
//!
//! Q1 = Feb-Apr, Q2 = May-Jul, Q3 = Aug-Oct, Q4 = Nov-Jan (wraps into the
//! next calendar year). This is a named business convention, not an
//! ambiguity — January belongs to Q4 of the fiscal year that started the
//! previous November.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        write!(f, "{s}")
    }
}

/// Maps a calendar month (1-12) to its February-anchored fiscal quarter.
pub fn quarter_of_month(month: u32) -> Quarter {
    match month {
        2 | 3 | 4 => Quarter::Q1,
        5 | 6 | 7 => Quarter::Q2,
        8 | 9 | 10 => Quarter::Q3,
        11 | 12 | 1 => Quarter::Q4,
        other => panic!("invalid calendar month: {other}"),
    }
}

/// Maps a date to its fiscal quarter.
pub fn quarter_of_date(date: chrono::NaiveDate) -> Quarter {
    quarter_of_month(date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn february_starts_q1() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(quarter_of_date(d), Quarter::Q1);
    }

    #[test]
    fn january_is_q4() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(quarter_of_date(d), Quarter::Q4);
    }

    #[test]
    fn all_months_map_to_exactly_one_quarter() {
        for month in 1..=12u32 {
            // Must not panic.
            let _ = quarter_of_month(month);
        }
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(quarter_of_month(4), Quarter::Q1);
        assert_eq!(quarter_of_month(5), Quarter::Q2);
        assert_eq!(quarter_of_month(7), Quarter::Q2);
        assert_eq!(quarter_of_month(8), Quarter::Q3);
        assert_eq!(quarter_of_month(10), Quarter::Q3);
        assert_eq!(quarter_of_month(11), Quarter::Q4);
        assert_eq!(quarter_of_month(12), Quarter::Q4);
    }
}
