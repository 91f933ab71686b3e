use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn of_datetime(ts: NaiveDateTime) -> Self {
        Self::of(ts.date())
    }

    /// Parse the `YYYY-MM` form produced by SQLite's `strftime('%Y-%m', ...)`.
    pub fn parse_ym(s: &str) -> Option<Self> {
        let (y, m) = s.split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Chart label, e.g. `"Jan 2024"`.
    pub fn label(&self) -> String {
        self.first_day()
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", self.month, self.year))
    }

    /// Long label, e.g. `"January 2024"`.
    pub fn long_label(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", self.month, self.year))
    }

    pub fn as_ym(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sum of amounts recorded in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub total: Decimal,
}

/// Sum of amounts recorded by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTotal {
    pub username: String,
    pub total: Decimal,
}
