use chrono::NaiveDate;

use crate::error::{SaccoError, SaccoResult};

/// Predicates shared by the admin ledger views: a case-insensitive username
/// substring and an inclusive range over the calendar date of each record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub username: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// Username-only view of this filter.
    pub fn username_only(&self) -> Self {
        Self {
            username: self.username.clone(),
            start: None,
            end: None,
        }
    }

    pub fn set_username(&mut self, input: &str) {
        let trimmed = input.trim();
        self.username = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_start(&mut self, input: &str) -> SaccoResult<()> {
        self.start = parse_optional_date(input)?;
        Ok(())
    }

    pub fn set_end(&mut self, input: &str) -> SaccoResult<()> {
        self.end = parse_optional_date(input)?;
        Ok(())
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(u) = &self.username {
            parts.push(format!("member~'{u}'"));
        }
        if let Some(s) = self.start {
            parts.push(format!("from {s}"));
        }
        if let Some(e) = self.end {
            parts.push(format!("to {e}"));
        }
        parts.join(", ")
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> SaccoResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        SaccoError::validation(format!("'{}' is not a date (expected YYYY-MM-DD)", input.trim()))
    })
}

fn parse_optional_date(input: &str) -> SaccoResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(input).map(Some)
    }
}
