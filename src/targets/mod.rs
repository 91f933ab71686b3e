//! Monthly savings targets and progress against them.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::aggregate::{align_targets, TargetChart};
use crate::db::Database;
use crate::error::{SaccoError, SaccoResult};
use crate::models::{check_amount, Actor, MonthKey, SavingsTarget};

/// From this day of the month on, a member with nothing saved is nudged.
pub(crate) const MID_MONTH_DAY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Progress {
    pub(crate) saved: Decimal,
    pub(crate) target: Decimal,
    /// Share of the target saved, in percent to one decimal place.
    pub(crate) percent: Decimal,
    pub(crate) remaining: Decimal,
}

impl Progress {
    pub(crate) fn compute(saved: Decimal, target: Decimal) -> Self {
        if target <= Decimal::ZERO {
            return Self {
                saved,
                target,
                percent: Decimal::ZERO,
                remaining: Decimal::ZERO,
            };
        }
        Self {
            saved,
            target,
            percent: (saved / target * Decimal::ONE_HUNDRED).round_dp(1),
            remaining: (target - saved).max(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MonthlyProgress {
    pub(crate) month: MonthKey,
    pub(crate) target: Option<SavingsTarget>,
    pub(crate) progress: Progress,
    pub(crate) warning: bool,
}

pub(crate) fn mid_month_warning(today: NaiveDate, saved_this_month: Decimal) -> bool {
    today.day() >= MID_MONTH_DAY && saved_this_month.is_zero()
}

/// The target for the month containing `today`, if one has been set.
pub(crate) fn current_target(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
) -> SaccoResult<Option<SavingsTarget>> {
    Ok(db.get_target(user_id, MonthKey::of(today))?)
}

/// Create or replace the acting member's target for the current month.
pub(crate) fn set_target(
    db: &Database,
    actor: &Actor,
    amount: Decimal,
    now: NaiveDateTime,
) -> SaccoResult<SavingsTarget> {
    let amount = check_amount(amount)?;
    let month = MonthKey::of_datetime(now);
    db.upsert_target(&SavingsTarget::new(actor.user_id, month, amount, now))?;
    log::info!(
        "'{}' set their {} target to {}",
        actor.username,
        month.long_label(),
        amount
    );
    db.get_target(actor.user_id, month)?
        .ok_or_else(|| SaccoError::validation(format!("No target stored for {}", month.long_label())))
}

pub(crate) fn monthly_progress(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
) -> SaccoResult<MonthlyProgress> {
    let month = MonthKey::of(today);
    let target = db.get_target(user_id, month)?;
    let saved = db.sum_user_savings(user_id, Some(month))?;
    let progress = Progress::compute(
        saved,
        target.as_ref().map(|t| t.amount).unwrap_or(Decimal::ZERO),
    );
    Ok(MonthlyProgress {
        month,
        target,
        progress,
        warning: mid_month_warning(today, saved),
    })
}

/// Every target the member has set, newest month first.
pub(crate) fn history(db: &Database, user_id: i64) -> SaccoResult<Vec<SavingsTarget>> {
    let mut targets = db.get_targets(user_id)?;
    targets.reverse();
    Ok(targets)
}

pub(crate) fn chart(db: &Database, user_id: i64) -> SaccoResult<TargetChart> {
    let targets = db.get_targets(user_id)?;
    let series = db.monthly_savings(Some(user_id))?;
    Ok(align_targets(&targets, &series))
}
