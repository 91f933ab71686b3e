//! Loan eligibility and the PENDING -> APPROVED/REJECTED lifecycle.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::{SaccoError, SaccoResult};
use crate::models::{check_positive, Actor, Loan, LoanDecision, LoanStatus, StatusSummary};

/// A member may borrow up to this many times their all-time savings.
pub(crate) const LOAN_LIMIT_MULTIPLIER: u32 = 3;

#[derive(Debug, Clone)]
pub(crate) struct LoanOverview {
    pub(crate) status: Option<LoanStatus>,
    pub(crate) loans: Vec<Loan>,
    pub(crate) summary: Vec<StatusSummary>,
}

pub(crate) fn loan_limit(db: &Database, user_id: i64) -> SaccoResult<Decimal> {
    let saved = db.sum_user_savings(user_id, None)?;
    Ok(saved * Decimal::from(LOAN_LIMIT_MULTIPLIER))
}

/// File a PENDING application for the acting member. Staff cannot apply.
/// Nothing is written when the amount is invalid or above the limit.
pub(crate) fn submit(
    db: &Database,
    actor: &Actor,
    amount: Decimal,
    purpose: &str,
    now: NaiveDateTime,
) -> SaccoResult<Loan> {
    actor.require_member()?;
    let amount = check_positive(amount)?;
    let purpose = purpose.trim();
    if purpose.is_empty() {
        return Err(SaccoError::validation("Loan purpose is required"));
    }

    let limit = loan_limit(db, actor.user_id)?;
    if amount > limit {
        log::warn!(
            "'{}' asked for {} over their limit of {}",
            actor.username,
            amount,
            limit
        );
        return Err(SaccoError::LimitExceeded {
            requested: amount,
            limit,
        });
    }

    let mut loan = Loan::new(
        actor.user_id,
        actor.username.clone(),
        amount,
        purpose.to_string(),
        now,
    );
    let id = db.insert_loan(&loan)?;
    loan.id = Some(id);
    log::info!("'{}' applied for loan #{id} of {amount}", actor.username);
    Ok(loan)
}

/// Approve or reject a pending loan. Only staff may decide, only once, and
/// never on a loan they applied for themselves.
pub(crate) fn decide(
    db: &Database,
    actor: &Actor,
    loan_id: i64,
    decision: LoanDecision,
    now: NaiveDateTime,
) -> SaccoResult<Loan> {
    actor.require_staff()?;

    // A member promoted after applying still holds their own application
    if db
        .get_loan(loan_id)?
        .is_some_and(|loan| loan.user_id == actor.user_id)
    {
        log::warn!(
            "'{}' tried to {} their own loan #{loan_id}",
            actor.username,
            decision.verb()
        );
        return Err(SaccoError::OwnLoan(loan_id));
    }

    if !db.decide_pending_loan(loan_id, decision.outcome(), actor.user_id, now)? {
        return Err(match db.get_loan(loan_id)? {
            None => SaccoError::LoanNotFound(loan_id),
            Some(existing) => {
                log::warn!(
                    "'{}' tried to {} loan #{loan_id}, already {}",
                    actor.username,
                    decision.verb(),
                    existing.status
                );
                SaccoError::AlreadyDecided {
                    id: loan_id,
                    status: existing.status,
                }
            }
        });
    }

    log::info!(
        "'{}' {} loan #{loan_id}",
        actor.username,
        decision.outcome().as_str().to_lowercase()
    );
    db.get_loan(loan_id)?
        .ok_or(SaccoError::LoanNotFound(loan_id))
}

/// A member's loans, newest first. `None` returns every status.
pub(crate) fn user_loans(
    db: &Database,
    user_id: i64,
    status: Option<LoanStatus>,
) -> SaccoResult<Vec<Loan>> {
    Ok(db.get_loans(Some(user_id), status)?)
}

/// Everyone's loans for review, plus count and amount per status.
pub(crate) fn overview(
    db: &Database,
    actor: &Actor,
    status: Option<LoanStatus>,
) -> SaccoResult<LoanOverview> {
    actor.require_staff()?;
    Ok(LoanOverview {
        status,
        loans: db.get_loans(None, status)?,
        summary: db.loan_status_summary()?,
    })
}
