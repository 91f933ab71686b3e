//! Read-only sums and monthly series over the record store.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::db::Database;
use crate::error::SaccoResult;
use crate::models::{MonthKey, MonthTotal, RecordFilter, Savings, SavingsTarget, UserTotal};

/// Targets plotted against what was actually saved in the same months.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TargetChart {
    pub(crate) labels: Vec<String>,
    pub(crate) savings: Vec<f64>,
    pub(crate) targets: Vec<f64>,
}

impl TargetChart {
    pub(crate) fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SavingsOverview {
    pub(crate) records: Vec<Savings>,
    pub(crate) total: Decimal,
    pub(crate) per_user: Vec<UserTotal>,
    pub(crate) monthly: Vec<MonthTotal>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberMonthStatus {
    pub(crate) username: String,
    pub(crate) saved: Decimal,
    pub(crate) target: Decimal,
    pub(crate) met_target: bool,
}

pub(crate) fn monthly_savings(db: &Database, user_id: Option<i64>) -> SaccoResult<Vec<MonthTotal>> {
    Ok(db.monthly_savings(user_id)?)
}

pub(crate) fn monthly_welfare(db: &Database) -> SaccoResult<Vec<MonthTotal>> {
    Ok(db.monthly_welfare()?)
}

/// One point per target, oldest month first. A month with no savings in
/// `series` plots as 0.
pub(crate) fn align_targets(targets: &[SavingsTarget], series: &[MonthTotal]) -> TargetChart {
    let saved: HashMap<MonthKey, Decimal> = series.iter().map(|m| (m.month, m.total)).collect();

    let mut ordered: Vec<&SavingsTarget> = targets.iter().collect();
    ordered.sort_by_key(|t| t.month_key());

    let mut chart = TargetChart::default();
    for target in ordered {
        let month = target.month_key();
        chart.labels.push(month.label());
        chart
            .savings
            .push(saved.get(&month).copied().map_or(0.0, to_f64));
        chart.targets.push(to_f64(target.amount));
    }
    chart
}

/// `(label, value)` pairs for a bar chart.
pub(crate) fn chart_points(series: &[MonthTotal]) -> Vec<(String, f64)> {
    series
        .iter()
        .map(|m| (m.month.label(), to_f64(m.total)))
        .collect()
}

/// The admin savings view. Records and the total follow the whole filter,
/// per-member totals only the username part, and the monthly series always
/// covers everyone.
pub(crate) fn savings_overview(db: &Database, filter: &RecordFilter) -> SaccoResult<SavingsOverview> {
    Ok(SavingsOverview {
        records: db.get_savings(filter)?,
        total: db.sum_savings(filter)?,
        per_user: db.savings_per_user(&filter.username_only())?,
        monthly: db.monthly_savings(None)?,
    })
}

/// Each member's savings for the month containing `today` against their target.
pub(crate) fn member_month_status(db: &Database, today: NaiveDate) -> SaccoResult<Vec<MemberMonthStatus>> {
    let month = MonthKey::of(today);
    let mut result = Vec::new();
    for user in db.get_members()? {
        let saved = db.sum_user_savings(user.id, Some(month))?;
        let target = db
            .get_target(user.id, month)?
            .map(|t| t.amount)
            .unwrap_or(Decimal::ZERO);
        result.push(MemberMonthStatus {
            username: user.username,
            saved,
            target,
            met_target: target > Decimal::ZERO && saved >= target,
        });
    }
    Ok(result)
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests;
