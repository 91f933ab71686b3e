//! One payload per screen. Each builder takes the acting user and the clock
//! explicitly; admin pages refuse members.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregate::{self, MemberMonthStatus, SavingsOverview, TargetChart};
use crate::db::Database;
use crate::error::SaccoResult;
use crate::loans::{self, LoanOverview};
use crate::models::{Actor, Loan, LoanStatus, MonthKey, RecordFilter, Savings, SavingsTarget};
use crate::targets::{self, MonthlyProgress};
use crate::welfare::{self, WelfareAdminSummary, WelfareSummary};

/// Loan lists open on pending applications until told otherwise.
pub(crate) const DEFAULT_LOAN_FILTER: Option<LoanStatus> = Some(LoanStatus::Pending);

/// Resolve a status filter as typed by the user. No input means the default.
pub(crate) fn loan_filter(input: Option<&str>) -> SaccoResult<Option<LoanStatus>> {
    match input {
        None => Ok(DEFAULT_LOAN_FILTER),
        Some(s) => LoanStatus::parse_filter(s),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DashboardPage {
    pub(crate) month: MonthlyProgress,
    pub(crate) chart: TargetChart,
}

pub(crate) fn dashboard(db: &Database, actor: &Actor, today: NaiveDate) -> SaccoResult<DashboardPage> {
    Ok(DashboardPage {
        month: targets::monthly_progress(db, actor.user_id, today)?,
        chart: targets::chart(db, actor.user_id)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApplyLoanPage {
    pub(crate) total_savings: Decimal,
    pub(crate) loan_limit: Decimal,
}

pub(crate) fn apply_loan(db: &Database, actor: &Actor) -> SaccoResult<ApplyLoanPage> {
    Ok(ApplyLoanPage {
        total_savings: db.sum_user_savings(actor.user_id, None)?,
        loan_limit: loans::loan_limit(db, actor.user_id)?,
    })
}

pub(crate) type AdminDashboardPage = LoanOverview;

pub(crate) fn admin_dashboard(
    db: &Database,
    actor: &Actor,
    status: Option<LoanStatus>,
) -> SaccoResult<AdminDashboardPage> {
    loans::overview(db, actor, status)
}

#[derive(Debug, Clone)]
pub(crate) struct SavingsPage {
    pub(crate) total_savings: Decimal,
    pub(crate) history: Vec<Savings>,
}

pub(crate) fn savings(db: &Database, actor: &Actor) -> SaccoResult<SavingsPage> {
    Ok(SavingsPage {
        total_savings: crate::savings::total_for(db, actor.user_id)?,
        history: crate::savings::history(db, actor.user_id)?,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct TargetHistoryPage {
    pub(crate) current: Option<SavingsTarget>,
    pub(crate) targets: Vec<SavingsTarget>,
    pub(crate) chart: TargetChart,
}

pub(crate) fn target_history(
    db: &Database,
    actor: &Actor,
    today: NaiveDate,
) -> SaccoResult<TargetHistoryPage> {
    Ok(TargetHistoryPage {
        current: targets::current_target(db, actor.user_id, today)?,
        targets: targets::history(db, actor.user_id)?,
        chart: targets::chart(db, actor.user_id)?,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct UserLoansPage {
    pub(crate) status: Option<LoanStatus>,
    pub(crate) loans: Vec<Loan>,
    pub(crate) loan_limit: Decimal,
}

pub(crate) fn user_loans(
    db: &Database,
    actor: &Actor,
    status: Option<LoanStatus>,
) -> SaccoResult<UserLoansPage> {
    Ok(UserLoansPage {
        status,
        loans: loans::user_loans(db, actor.user_id, status)?,
        loan_limit: loans::loan_limit(db, actor.user_id)?,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct AdminSavingsPage {
    pub(crate) filter: RecordFilter,
    pub(crate) overview: SavingsOverview,
    pub(crate) month: MonthKey,
    pub(crate) members: Vec<MemberMonthStatus>,
}

pub(crate) fn admin_savings(
    db: &Database,
    actor: &Actor,
    filter: &RecordFilter,
    today: NaiveDate,
) -> SaccoResult<AdminSavingsPage> {
    actor.require_staff()?;
    Ok(AdminSavingsPage {
        filter: filter.clone(),
        overview: aggregate::savings_overview(db, filter)?,
        month: MonthKey::of(today),
        members: aggregate::member_month_status(db, today)?,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct WelfarePage {
    pub(crate) month: MonthKey,
    pub(crate) summary: WelfareSummary,
}

pub(crate) fn welfare(db: &Database, actor: &Actor, today: NaiveDate) -> SaccoResult<WelfarePage> {
    Ok(WelfarePage {
        month: MonthKey::of(today),
        summary: welfare::summary_for(db, actor.user_id)?,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct AdminWelfarePage {
    pub(crate) filter: RecordFilter,
    pub(crate) summary: WelfareAdminSummary,
}

pub(crate) fn admin_welfare(
    db: &Database,
    actor: &Actor,
    filter: &RecordFilter,
) -> SaccoResult<AdminWelfarePage> {
    Ok(AdminWelfarePage {
        filter: filter.clone(),
        summary: welfare::admin_summary(db, actor, filter)?,
    })
}
