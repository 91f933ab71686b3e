use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::{SaccoError, SaccoResult};

/// Days between application and repayment due date.
pub const LOAN_TERM_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Parse a status filter where `all` (or nothing) means no filtering.
    pub fn parse_filter(s: &str) -> SaccoResult<Option<Self>> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        Self::parse(trimmed).map(Some).ok_or_else(|| {
            SaccoError::validation(format!(
                "Unknown loan status '{trimmed}' (expected pending, approved, rejected or all)"
            ))
        })
    }

    pub fn all() -> &'static [LoanStatus] {
        &[Self::Pending, Self::Approved, Self::Rejected]
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A staff decision on a pending loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanDecision {
    Approve,
    Reject,
}

impl LoanDecision {
    pub fn outcome(&self) -> LoanStatus {
        match self {
            Self::Approve => LoanStatus::Approved,
            Self::Reject => LoanStatus::Rejected,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loan {
    pub id: Option<i64>,
    pub user_id: i64,
    pub username: String,
    pub amount: Decimal,
    pub purpose: String,
    pub status: LoanStatus,
    pub date_applied: NaiveDateTime,
    pub due_date: NaiveDate,
    pub approved_by: Option<i64>,
    /// Approver's username, filled in on reads.
    pub approver_name: Option<String>,
    pub approval_date: Option<NaiveDateTime>,
}

impl Loan {
    /// A fresh application: pending, due [`LOAN_TERM_DAYS`] after `applied`.
    pub fn new(
        user_id: i64,
        username: String,
        amount: Decimal,
        purpose: String,
        applied: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            user_id,
            username,
            amount,
            purpose,
            status: LoanStatus::Pending,
            date_applied: applied,
            due_date: applied.date() + Duration::days(LOAN_TERM_DAYS),
            approved_by: None,
            approver_name: None,
            approval_date: None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Number and total amount of loans in one status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub status: LoanStatus,
    pub count: i64,
    pub total: Decimal,
}
