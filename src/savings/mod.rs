use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::config::PaymentConfig;
use crate::db::Database;
use crate::error::SaccoResult;
use crate::models::{check_positive, Actor, Savings};

/// What the member is told to do after recording a contribution. Payment
/// itself happens outside the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaymentInstruction {
    pub(crate) amount: Decimal,
    pub(crate) currency: String,
    pub(crate) provider: String,
    pub(crate) paybill: String,
    pub(crate) account: String,
}

impl PaymentInstruction {
    pub(crate) fn new(amount: Decimal, account: &str, payment: &PaymentConfig) -> Self {
        Self {
            amount,
            currency: payment.currency.clone(),
            provider: payment.provider.clone(),
            paybill: payment.paybill.clone(),
            account: account.to_string(),
        }
    }
}

impl std::fmt::Display for PaymentInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Please complete payment of {} {} via {} to Paybill {}, Account: {}",
            self.amount, self.currency, self.provider, self.paybill, self.account
        )
    }
}

/// Record a savings contribution for the acting member.
pub(crate) fn contribute(
    db: &Database,
    actor: &Actor,
    amount: Decimal,
    description: &str,
    payment: &PaymentConfig,
    now: NaiveDateTime,
) -> SaccoResult<(Savings, PaymentInstruction)> {
    let amount = check_positive(amount)?;
    let mut savings = Savings::new(
        actor.user_id,
        actor.username.clone(),
        amount,
        description.trim().to_string(),
        now,
    );
    savings.id = Some(db.insert_savings(&savings)?);
    log::info!("'{}' saved {}", actor.username, amount);

    let instruction = PaymentInstruction::new(amount, &actor.username, payment);
    Ok((savings, instruction))
}

/// All-time savings of one member. Zero when they have never saved.
pub(crate) fn total_for(db: &Database, user_id: i64) -> SaccoResult<Decimal> {
    Ok(db.sum_user_savings(user_id, None)?)
}

pub(crate) fn history(db: &Database, user_id: i64) -> SaccoResult<Vec<Savings>> {
    Ok(db.get_user_savings(user_id)?)
}

#[cfg(test)]
mod tests;
