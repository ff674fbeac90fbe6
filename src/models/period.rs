//! Budget period model.
//!
//! Allocations are made per financial quarter. This module contains the
//! [`Period`] and [`Quarter`] types.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    /// January to March.
    Q1,
    /// April to June.
    Q2,
    /// July to September.
    Q3,
    /// October to December.
    Q4,
}

impl Quarter {
    /// Returns the quarter a calendar month (1-12) falls in.
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Quarter::Q1,
            4..=6 => Quarter::Q2,
            7..=9 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(label)
    }
}

/// The budget period an allocation applies to.
///
/// Periods order by year, then quarter.
///
/// # Example
///
/// ```
/// use budget_allocation::models::{Period, Quarter};
/// use chrono::NaiveDate;
///
/// let period = Period::containing(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
/// assert_eq!(period, Period { year: 2026, quarter: Quarter::Q4 });
/// assert_eq!(period.to_string(), "2026-Q4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// The calendar year.
    pub year: i32,
    /// The quarter within the year.
    pub quarter: Quarter,
}

impl Period {
    /// Returns the period containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: Quarter::from_month(date.month()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.quarter)
    }
}
