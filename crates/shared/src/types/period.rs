//! Tax period (calendar month) value type.
//!
//! The filing formats spell the same month three different ways:
//! `YYYYMM` in the ledger tables, `MM/YYYY` in the trade declaration and
//! `YYYY-MM` in run bookkeeping. `TaxPeriod` keeps one canonical value and
//! renders each of them.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single tax period: one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxPeriod {
    year: i32,
    month: u32,
}

/// Error returned when a tax period cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid tax period: '{0}' (expected YYYYMM, MM/YYYY or YYYY-MM)")]
pub struct TaxPeriodParseError(pub String);

impl TaxPeriod {
    /// Creates a tax period, returning `None` when the month is out of range.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The tax period a date falls into.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// `YYYYMM`, as written into the ledger tables and the declaration.
    #[must_use]
    pub fn yyyymm(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// `MM/YYYY`, as written into the trade declaration header.
    #[must_use]
    pub fn mm_yyyy(&self) -> String {
        format!("{:02}/{:04}", self.month, self.year)
    }

    /// Parses the compact `YYYYMM` form only.
    #[must_use]
    pub fn parse_yyyymm(value: &str) -> Option<Self> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        Self::new(year, month)
    }

    /// Parses the slash-separated `MM/YYYY` form only.
    #[must_use]
    pub fn parse_mm_yyyy(value: &str) -> Option<Self> {
        let (month, year) = value.split_once('/')?;
        if month.len() != 2 || year.len() != 4 {
            return None;
        }
        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    fn parse_iso_month(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }
}

/// Displays as `YYYY-MM`.
impl fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TaxPeriod {
    type Err = TaxPeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::parse_yyyymm(trimmed)
            .or_else(|| Self::parse_mm_yyyy(trimmed))
            .or_else(|| Self::parse_iso_month(trimmed))
            .ok_or_else(|| TaxPeriodParseError(s.to_string()))
    }
}
