use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::config::PaymentConfig;
use crate::db::Database;
use crate::error::SaccoResult;
use crate::models::{check_positive, Actor, MonthTotal, RecordFilter, WelfareContribution};
use crate::savings::PaymentInstruction;

#[derive(Debug, Clone)]
pub(crate) struct WelfareSummary {
    pub(crate) total: Decimal,
    pub(crate) contributions: Vec<WelfareContribution>,
}

#[derive(Debug, Clone)]
pub(crate) struct WelfareAdminSummary {
    pub(crate) contributions: Vec<WelfareContribution>,
    pub(crate) total: Decimal,
    pub(crate) monthly: Vec<MonthTotal>,
}

/// Record a welfare contribution. There is no eligibility check.
pub(crate) fn contribute(
    db: &Database,
    actor: &Actor,
    amount: Decimal,
    payment: &PaymentConfig,
    now: NaiveDateTime,
) -> SaccoResult<(WelfareContribution, PaymentInstruction)> {
    let amount = check_positive(amount)?;
    let mut contribution =
        WelfareContribution::new(actor.user_id, actor.username.clone(), amount, now);
    contribution.id = Some(db.insert_welfare(&contribution)?);
    log::info!("'{}' contributed {} to welfare", actor.username, amount);
    Ok((
        contribution,
        PaymentInstruction::new(amount, &actor.username, payment),
    ))
}

/// A member's all-time total and history, newest first.
pub(crate) fn summary_for(db: &Database, user_id: i64) -> SaccoResult<WelfareSummary> {
    Ok(WelfareSummary {
        total: db.sum_user_welfare(user_id)?,
        contributions: db.get_user_welfare(user_id)?,
    })
}

/// Staff view: filtered contributions and total, plus the fund's monthly intake.
pub(crate) fn admin_summary(
    db: &Database,
    actor: &Actor,
    filter: &RecordFilter,
) -> SaccoResult<WelfareAdminSummary> {
    actor.require_staff()?;
    Ok(WelfareAdminSummary {
        contributions: db.get_welfare(filter)?,
        total: db.sum_welfare(filter)?,
        monthly: db.monthly_welfare()?,
    })
}
